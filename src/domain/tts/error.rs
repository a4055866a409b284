use crate::domain::tts::wav::AudioError;
use crate::error::AppError;
use crate::infrastructure::audio::ConcatError;
use crate::infrastructure::repositories::ProgressStoreError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    /// The provider rejected or failed chunk `index`; earlier progress is kept
    #[error("synthesis of part {index} failed: {message}")]
    Provider { index: usize, message: String },
    #[error("failed to write audio part {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] ProgressStoreError),
    #[error(transparent)]
    Concat(#[from] ConcatError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TtsServiceError {
    /// Whether running the same session again can pick up where this one stopped
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. } | Self::Artifact { .. } | Self::Concat(_)
        )
    }
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Provider { .. } | TtsServiceError::Concat(_) => {
                AppError::ExternalService(err.to_string())
            }
            TtsServiceError::Artifact { .. } | TtsServiceError::Store(_) => {
                AppError::Storage(err.to_string())
            }
            TtsServiceError::Audio(_) | TtsServiceError::Other(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}
