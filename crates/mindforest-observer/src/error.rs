//! Error types for the garden API.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{ "error": <message>, "status": <code> }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use mindforest_extractor::ExtractError;
use mindforest_ledger::{LedgerError, TradeError};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request is valid but the garden is not in a state to accept it.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A path or body value could not be parsed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// A trade was refused.
    #[error(transparent)]
    Trade(#[from] TradeError),

    /// The fruit ledger rejected a movement.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Wisdom extraction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// No extraction backend is configured.
    #[error("reflection is unavailable: no extractor is configured")]
    ExtractorUnavailable,
}

impl ObserverError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::BadRequest(msg) | Self::InvalidUuid(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Trade(e) => {
                let status = match e {
                    TradeError::InsufficientFunds { .. } => StatusCode::CONFLICT,
                    TradeError::FruitUnavailable(_) => StatusCode::NOT_FOUND,
                    TradeError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.user_message().to_owned())
            }
            Self::Ledger(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::Extract(e) => {
                let status = match e {
                    ExtractError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    ExtractError::EmptyConversation => StatusCode::BAD_REQUEST,
                    ExtractError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    ExtractError::Transport(_)
                    | ExtractError::Status { .. }
                    | ExtractError::Response(_) => StatusCode::BAD_GATEWAY,
                    ExtractError::Template(_)
                    | ExtractError::Config(_)
                    | ExtractError::Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            Self::ExtractorUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
