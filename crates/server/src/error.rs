use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pixelwall_store::prelude::{PixelId, PixelLoc, StoreError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("cannot put a pixel where it already exists, try post, x: {}, y: {}", .0.x, .0.y)]
    Conflict(PixelLoc),
    #[error("pixel does not exist, id: {0}")]
    NotFound(PixelId),
    #[error("error while accessing the pixel store: {0}")]
    Store(StoreError),
    #[error("store task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(loc) => ServiceError::Conflict(loc),
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Store(_) | ServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable category, sent next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Store(_) => "store",
            ServiceError::Task(_) => "internal",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match &self {
            ServiceError::Store(source) => error!("{}: {:?}", message, source),
            ServiceError::Task(source) => error!("{}: {:?}", message, source),
            _ => warn!("Rejected request: {}", message),
        }
        let body = ErrorBody {
            error: message,
            kind: self.kind(),
        };
        (self.status(), Json(body)).into_response()
    }
}
