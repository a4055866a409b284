use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Persisted state of a synthesis session.
///
/// Serialized as `{ "textHash", "completedParts", "tempFiles" }`, plus `"provider"` when known.
/// `artifact_paths[i]` belongs to the i-th smallest completed index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressRecord {
    #[serde(rename = "textHash")]
    pub input_identifier: String,
    #[serde(rename = "completedParts")]
    pub completed_indices: BTreeSet<usize>,
    #[serde(rename = "tempFiles")]
    pub artifact_paths: Vec<String>,
    /// Provider that produced the artifacts. Absent in records written by older versions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl ProgressRecord {
    /// Empty record bound to an input
    pub fn fresh(input_identifier: impl Into<String>) -> Self {
        Self {
            input_identifier: input_identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Artifacts from another provider may differ in codec or sample rate and cannot be
    /// stream-copied together. Records without a provider are accepted.
    pub fn is_from_provider(&self, provider: &str) -> bool {
        self.provider.as_deref().map_or(true, |p| p == provider)
    }

    pub fn is_empty(&self) -> bool {
        self.input_identifier.is_empty()
            && self.completed_indices.is_empty()
            && self.artifact_paths.is_empty()
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed_indices.contains(&index)
    }

    pub fn completed_count(&self) -> usize {
        self.completed_indices.len()
    }

    /// Whether the record can be resumed for `input_identifier` split into `chunk_count` chunks
    pub fn is_valid_for(&self, input_identifier: &str, chunk_count: usize) -> bool {
        self.input_identifier == input_identifier && self.is_consistent(chunk_count)
    }

    /// Indices in range, one artifact per index, and completed chunks forming a prefix.
    /// Chunks are synthesized strictly in order so anything else was not written by us.
    pub fn is_consistent(&self, chunk_count: usize) -> bool {
        self.artifact_paths.len() == self.completed_indices.len()
            && self
                .completed_indices
                .iter()
                .enumerate()
                .all(|(position, &index)| position == index && index < chunk_count)
    }

    /// Record a synthesized chunk. Indices must arrive in ascending order.
    pub fn mark_completed(&mut self, index: usize, artifact_path: impl Into<String>) {
        debug_assert!(
            self.completed_indices.last().map_or(true, |&last| last < index),
            "chunks must complete in ascending order"
        );
        if self.completed_indices.insert(index) {
            self.artifact_paths.push(artifact_path.into());
        }
    }
}
