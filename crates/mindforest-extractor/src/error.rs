//! Error types for wisdom extraction.

/// Errors that can occur while extracting wisdom from a conversation.
///
/// Extraction never creates anything on failure, so every variant is safe
/// to retry from the caller's side; [`ExtractError::is_retryable`] says
/// whether retrying is likely to help.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("extractor transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("extractor request timed out")]
    Timeout,

    /// The backend is rate limiting this client.
    #[error("too many requests, try again in a minute")]
    RateLimited,

    /// The backend answered with a non-success status.
    #[error("extractor returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error text from the response body.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("extractor response error: {0}")]
    Response(String),

    /// Failed to render a prompt template.
    #[error("template render error: {0}")]
    Template(String),

    /// The conversation has no messages to summarize.
    #[error("conversation is empty")]
    EmptyConversation,

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ExtractError {
    /// Whether the same request might succeed later.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Response(_)
            | Self::Template(_)
            | Self::EmptyConversation
            | Self::Config(_)
            | Self::Serde(_) => false,
        }
    }
}

impl From<reqwest::Error> for ExtractError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e.to_string())
        }
    }
}
