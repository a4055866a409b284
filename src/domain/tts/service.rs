use super::dto::{SessionReport, SynthesizedAudio};
use super::error::TtsServiceError;
use super::progress::ProgressRecord;
use super::segmenter::{chunk_for_speech, TextChunk};
use super::wav::{container_extension, encode_wav};
use crate::infrastructure::audio::{remove_best_effort, Concatenator};
use crate::infrastructure::repositories::{ProgressRepository, TtsRepository};
use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resumable text-to-audio pipeline.
///
/// Chunks are synthesized strictly one after another and the progress record
/// is persisted after every chunk, so an interrupted session loses at most the
/// chunk that was in flight.
pub struct TtsService {
    tts_repo: Arc<dyn TtsRepository>,
    progress_repo: Arc<dyn ProgressRepository>,
    concatenator: Concatenator,
    work_dir: PathBuf,
    max_chunk_length: usize,
}

impl TtsService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        progress_repo: Arc<dyn ProgressRepository>,
        concatenator: Concatenator,
        work_dir: impl Into<PathBuf>,
        max_chunk_length: usize,
    ) -> Self {
        // Chunks larger than a single request would fail on every retry
        let max_chunk_length = match tts_repo.max_input_chars() {
            Some(limit) if limit < max_chunk_length => {
                tracing::warn!(
                    provider = tts_repo.provider_name(),
                    configured = max_chunk_length,
                    provider_limit = limit,
                    "Chunk length lowered to the provider's request limit"
                );
                limit
            }
            _ => max_chunk_length,
        };

        Self {
            tts_repo,
            progress_repo,
            concatenator,
            work_dir: work_dir.into(),
            max_chunk_length,
        }
    }

    pub fn max_chunk_length(&self) -> usize {
        self.max_chunk_length
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize `text` into a single audio file
    ///
    /// This operation:
    /// - Splits the text into provider-sized chunks
    /// - Resumes a previous session for the same `input_identifier`, or discards it
    /// - Synthesizes missing chunks in order, saving progress after each one
    /// - Merges the per-chunk audio and clears the progress record
    ///
    /// On error the persisted progress stays valid and calling again with the
    /// same input continues from the first unfinished chunk.
    async fn run_session(
        &self,
        text: &str,
        input_identifier: &str,
    ) -> Result<SessionReport, TtsServiceError>;

    /// Currently persisted progress record
    async fn status(&self) -> ProgressRecord;

    /// Delete the artifacts of the persisted session and clear the record.
    /// Returns how many artifacts the record referenced.
    async fn reset(&self) -> Result<usize, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn run_session(
        &self,
        text: &str,
        input_identifier: &str,
    ) -> Result<SessionReport, TtsServiceError> {
        // 1. Split into chunks
        let chunks = chunk_for_speech(text, self.max_chunk_length);
        if chunks.is_empty() {
            tracing::info!(
                input_identifier = %input_identifier,
                "Text has no speakable content"
            );
            return Ok(SessionReport::NothingToDo);
        }

        tracing::info!(
            input_identifier = %input_identifier,
            chunk_count = chunks.len(),
            max_chunk_length = self.max_chunk_length,
            text_length = text.chars().count(),
            "Text split into chunks"
        );

        // 2. Load or reset progress for this input
        let mut record = self.load_progress(input_identifier, chunks.len()).await?;
        let resumed = record.completed_count();

        // 3. Synthesize whatever is missing, in order
        let mut synthesized = 0;
        for chunk in &chunks {
            if record.is_completed(chunk.index) {
                tracing::info!(
                    part = chunk.index + 1,
                    total = chunks.len(),
                    "Part already synthesized, skipping"
                );
                continue;
            }

            let artifact = self.synthesize_chunk(chunk, chunks.len()).await?;
            record.mark_completed(chunk.index, artifact.to_string_lossy());
            self.progress_repo.save(&record).await?;
            synthesized += 1;

            tracing::info!(
                part = chunk.index + 1,
                total = chunks.len(),
                artifact = %artifact.display(),
                "Part synthesized and progress saved"
            );
        }

        // 4. Merge and clean up
        let output_name = format!(
            "tts_output_combined_{}",
            Local::now().format("%Y%m%d_%H%M%S_%3f")
        );
        let output = self
            .concatenator
            .finalize(&record.artifact_paths, &output_name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("completed session has no audio parts"))?;
        self.progress_repo.clear().await?;

        tracing::info!(
            output = %output.display(),
            chunk_count = chunks.len(),
            synthesized = synthesized,
            resumed = resumed,
            "TTS session completed"
        );

        Ok(SessionReport::Completed {
            output,
            chunk_count: chunks.len(),
            synthesized,
            resumed,
        })
    }

    async fn status(&self) -> ProgressRecord {
        self.progress_repo.load().await
    }

    async fn reset(&self) -> Result<usize, TtsServiceError> {
        let record = self.progress_repo.load().await;
        let count = record.artifact_paths.len();
        discard_artifacts(&record).await;
        self.progress_repo.clear().await?;

        tracing::info!(
            input_identifier = %record.input_identifier,
            artifacts = count,
            "TTS progress reset"
        );
        Ok(count)
    }
}

impl TtsService {
    /// Load the persisted record if it belongs to this input, otherwise start over
    async fn load_progress(
        &self,
        input_identifier: &str,
        chunk_count: usize,
    ) -> Result<ProgressRecord, TtsServiceError> {
        let record = self.progress_repo.load().await;
        let provider = self.tts_repo.provider_name();

        if record.is_valid_for(input_identifier, chunk_count)
            && record.is_from_provider(provider)
            && artifacts_present(&record).await
        {
            if record.completed_count() > 0 {
                tracing::info!(
                    input_identifier = %input_identifier,
                    completed = record.completed_count(),
                    chunk_count = chunk_count,
                    "Resuming TTS session from part {}",
                    record.completed_count() + 1
                );
            }
            return Ok(record);
        }

        if !record.is_empty() {
            tracing::info!(
                previous_identifier = %record.input_identifier,
                input_identifier = %input_identifier,
                stale_artifacts = record.artifact_paths.len(),
                previous_provider = ?record.provider,
                provider = provider,
                "Previous TTS session does not match this run, discarding it"
            );
            discard_artifacts(&record).await;
        }

        let fresh = ProgressRecord::fresh(input_identifier).with_provider(provider);
        self.progress_repo.save(&fresh).await?;
        Ok(fresh)
    }

    /// Call the provider for one chunk and write its artifact
    async fn synthesize_chunk(
        &self,
        chunk: &TextChunk,
        total: usize,
    ) -> Result<PathBuf, TtsServiceError> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            provider = self.tts_repo.provider_name(),
            part = chunk.index + 1,
            total = total,
            chunk_length = chunk.content.chars().count(),
            "Synthesizing part"
        );

        let audio = self
            .tts_repo
            .synthesize(&chunk.content)
            .await
            .map_err(|message| {
                tracing::error!(
                    provider = self.tts_repo.provider_name(),
                    part = chunk.index + 1,
                    error = %message,
                    "TTS provider failed, session can be resumed"
                );
                TtsServiceError::Provider {
                    index: chunk.index,
                    message,
                }
            })?;

        let (bytes, extension) = into_container(audio)?;
        let path = self.artifact_path(chunk.index, extension);

        if let Err(source) = tokio::fs::write(&path, &bytes).await {
            remove_best_effort(&path).await;
            return Err(TtsServiceError::Artifact { path, source });
        }

        tracing::debug!(
            part = chunk.index + 1,
            audio_size_bytes = bytes.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Audio part written"
        );

        Ok(path)
    }

    fn artifact_path(&self, index: usize, extension: &str) -> PathBuf {
        self.work_dir
            .join(format!(".temp_tts_part_{}.{}", index, extension))
    }
}

/// Keep container formats as they are, wrap bare PCM in a WAV header
fn into_container(audio: SynthesizedAudio) -> Result<(Vec<u8>, &'static str), TtsServiceError> {
    match container_extension(&audio.mime_type) {
        Some(extension) => Ok((audio.bytes, extension)),
        None => {
            tracing::debug!(mime_type = %audio.mime_type, "Wrapping raw PCM in WAV container");
            Ok((encode_wav(&audio.bytes, &audio.mime_type)?, "wav"))
        }
    }
}

async fn artifacts_present(record: &ProgressRecord) -> bool {
    for artifact in &record.artifact_paths {
        if !tokio::fs::try_exists(artifact).await.unwrap_or(false) {
            tracing::warn!(artifact = %artifact, "Audio part from previous session is missing");
            return false;
        }
    }
    true
}

async fn discard_artifacts(record: &ProgressRecord) {
    for artifact in &record.artifact_paths {
        remove_best_effort(Path::new(artifact)).await;
    }
}
