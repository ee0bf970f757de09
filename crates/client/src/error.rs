use thiserror::Error;

/// Errors that can occur when talking to the pixel API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was malformed; retrying it unchanged will fail again.
    #[error("rejected as invalid: {0}")]
    Validation(String),
    /// Somebody else created the pixel first.
    #[error("coordinate already taken: {0}")]
    Conflict(String),
    /// The pixel id is unknown, local state is stale.
    #[error("pixel not found: {0}")]
    NotFound(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
