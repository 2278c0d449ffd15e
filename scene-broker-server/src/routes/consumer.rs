//! Consumer-facing routes: queue drain and the response mailbox.

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use scene_broker_core::ExecutionReport;

use crate::error::{ApiError, FailureBody};
use crate::state::AppState;

pub const EMPTY_QUEUE_MESSAGE: &str = "instruction queue is empty";

#[derive(Debug, Serialize, Deserialize)]
pub struct MailboxEnvelope {
    pub response: Option<ExecutionReport>,
}

/// GET /instruction
///
/// Pops the oldest instruction. An empty queue is a normal answer, not an
/// error status.
pub async fn get_instruction(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.queue.dequeue().await? {
        Some(instruction) => {
            tracing::debug!(kind = %instruction.kind(), "Instruction handed to consumer");
            Ok(Json(instruction).into_response())
        }
        None => Ok(Json(FailureBody::new(EMPTY_QUEUE_MESSAGE)).into_response()),
    }
}

/// POST /set/response
pub async fn set_response(
    State(state): State<AppState>,
    Json(report): Json<ExecutionReport>,
) -> Json<MailboxEnvelope> {
    let revision = state.mailbox.post(report.clone()).await;
    tracing::info!(revision, message = %report.message, "Consumer reported");
    Json(MailboxEnvelope {
        response: Some(report),
    })
}

/// GET /response
pub async fn get_response(State(state): State<AppState>) -> Json<MailboxEnvelope> {
    Json(MailboxEnvelope {
        response: state.mailbox.read().await,
    })
}
