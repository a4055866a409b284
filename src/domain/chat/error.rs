use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ChatServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("text generation failed: {0}")]
    Provider(String),
}

impl From<ChatServiceError> for AppError {
    fn from(err: ChatServiceError) -> Self {
        match err {
            ChatServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ChatServiceError::Provider(msg) => AppError::ExternalService(msg),
        }
    }
}
