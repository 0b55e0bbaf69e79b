use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Invalid Riot ID format. Use format: Name#TAG")]
    InvalidRiotId,

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AppError {
    /// Whether a failed profile fetch is worth a second attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AppError::PlayerNotFound(_) | AppError::InvalidRiotId)
    }
}
