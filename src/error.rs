use thiserror::Error;

/// Main error type for the notifier
#[derive(Error, Debug)]
pub enum MatchdayError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Fixture data errors
    #[error("Fixture API error: {0}")]
    Api(String),

    #[error("Invalid fixture payload: {0}")]
    InvalidPayload(String),

    // Notification sink errors
    #[error("Message not found: {0}")]
    MessageNotFound(u64),

    #[error("Channel error: {0}")]
    Channel(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl MatchdayError {
    /// True when the error means the referenced message no longer exists,
    /// so a stale controlled-message id should be discarded rather than retried.
    pub fn is_message_not_found(&self) -> bool {
        matches!(self, MatchdayError::MessageNotFound(_))
    }
}

/// Result type alias for MatchdayError
pub type Result<T> = std::result::Result<T, MatchdayError>;
