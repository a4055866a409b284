use crate::domain::tts::ProgressRecord;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum ProgressStoreError {
    #[error("failed to write progress file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize progress record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence for the synthesis progress record
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the persisted record.
    /// A missing or unreadable record yields the empty default, never an error.
    async fn load(&self) -> ProgressRecord;

    /// Replace the persisted record as a whole
    async fn save(&self, record: &ProgressRecord) -> Result<(), ProgressStoreError>;

    /// Forget the persisted record so the next load yields the empty default
    async fn clear(&self) -> Result<(), ProgressStoreError>;
}

/// JSON file in the pipeline's working directory
pub struct FileProgressRepository {
    path: PathBuf,
}

impl FileProgressRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> ProgressStoreError {
        ProgressStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl ProgressRepository for FileProgressRepository {
    async fn load(&self) -> ProgressRecord {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No progress file, starting empty");
                return ProgressRecord::default();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Progress file unreadable, starting empty"
                );
                return ProgressRecord::default();
            }
        };

        match serde_json::from_str(&data) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Progress file corrupt, starting empty"
                );
                ProgressRecord::default()
            }
        }
    }

    async fn save(&self, record: &ProgressRecord) -> Result<(), ProgressStoreError> {
        let json = serde_json::to_string_pretty(record)?;

        // Stage next to the target and rename over it, the old record stays intact on failure
        let staging = self.staging_path();
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| self.io_error(e))?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(self.io_error(e));
        }

        tracing::debug!(
            path = %self.path.display(),
            completed = record.completed_count(),
            "Progress saved"
        );
        Ok(())
    }

    async fn clear(&self) -> Result<(), ProgressStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Progress file cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Process-local store, keeps a history of every saved record
#[derive(Default)]
pub struct InMemoryProgressRepository {
    current: Mutex<ProgressRecord>,
    history: Mutex<Vec<ProgressRecord>>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: ProgressRecord) -> Self {
        Self {
            current: Mutex::new(record),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the current record
    pub fn current(&self) -> ProgressRecord {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Every record passed to `save`, oldest first
    pub fn saved_history(&self) -> Vec<ProgressRecord> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn load(&self) -> ProgressRecord {
        self.current()
    }

    async fn save(&self, record: &ProgressRecord) -> Result<(), ProgressStoreError> {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = record.clone();
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ProgressStoreError> {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = ProgressRecord::default();
        Ok(())
    }
}
