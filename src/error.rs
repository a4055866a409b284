/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Process exit code for this error, loosely following sysexits.h
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BadRequest(_) => 65,      // EX_DATAERR
            Self::Config(_) => 78,          // EX_CONFIG
            Self::ExternalService(_) => 69, // EX_UNAVAILABLE
            Self::Storage(_) | Self::Io(_) => 74, // EX_IOERR
            Self::Internal(_) => 70,        // EX_SOFTWARE
        }
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
