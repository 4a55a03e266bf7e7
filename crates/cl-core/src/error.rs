//! Error types for comment-lottery

use thiserror::Error;

/// Main error type for comment-lottery
#[derive(Debug, Error)]
pub enum LotteryError {
    /// Network or HTTP-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("Unexpected response from {endpoint}: {message}")]
    Schema { endpoint: String, message: String },

    /// The remote API answered with a non-zero status code or no payload
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Caller handed malformed input to an operation
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// No usable login cookie
    #[error("Not logged in: {0}")]
    NotLoggedIn(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Draw record not found
    #[error("Draw not found: {0}")]
    DrawNotFound(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<LotteryError>,
    },
}

impl LotteryError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        LotteryError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a schema error for an endpoint
    pub fn schema(endpoint: impl Into<String>, message: impl ToString) -> Self {
        LotteryError::Schema {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Whether this is a programmer error rather than a runtime condition
    pub fn is_precondition(&self) -> bool {
        match self {
            LotteryError::Precondition(_) => true,
            LotteryError::WithContext { source, .. } => source.is_precondition(),
            _ => false,
        }
    }
}

/// Result type alias for comment-lottery
pub type Result<T> = std::result::Result<T, LotteryError>;
