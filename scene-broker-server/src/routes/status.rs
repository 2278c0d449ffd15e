use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdated {
    pub message: &'static str,
    pub status: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusReply {
    #[serde(rename = "llmStatus")]
    pub llm_status: bool,
}

/// POST /set/llm_status
pub async fn set_llm_status(
    State(state): State<AppState>,
    Json(update): Json<StatusUpdate>,
) -> Json<StatusUpdated> {
    state.readiness.set(update.status);
    Json(StatusUpdated {
        message: "Status updated",
        status: update.status,
    })
}

/// GET /llm_status
pub async fn get_llm_status(State(state): State<AppState>) -> Json<StatusReply> {
    Json(StatusReply {
        llm_status: state.readiness.is_ready(),
    })
}
