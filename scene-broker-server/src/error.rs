//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use scene_broker_core::{QueueStoreError, SchemaError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Queue(#[from] QueueStoreError),
}

/// Constraint violation body: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct DetailBody {
    pub detail: String,
}

/// Store failure body: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
}

impl FailureBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Schema(e) => {
                tracing::debug!(field = ?e.field(), "Rejected command: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    Json(DetailBody {
                        detail: e.to_string(),
                    }),
                )
                    .into_response()
            }
            ApiError::Queue(e) => {
                tracing::warn!("Queue store failure: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(FailureBody::new(e.to_string())),
                )
                    .into_response()
            }
        }
    }
}
