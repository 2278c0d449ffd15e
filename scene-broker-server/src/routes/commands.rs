//! Explicit command routes
//!
//! Each route validates its body against the command schema and appends the
//! result to the dispatch queue. Nothing is queued when validation fails.

use axum::{extract::State, response::Json};
use serde::Serialize;

use scene_broker_core::schema::{
    MoveParams, MoveRequest, RemoveParams, RemoveRequest, ReplaceParams, ReplaceRequest,
    RotateParams, RotateRequest, ScaleParams, ScaleRequest, SnapParams, SnapRequest, SpawnParams,
    SpawnRequest,
};
use scene_broker_core::{Instruction, SchemaError};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub success: bool,
    pub message: String,
    pub payload: Instruction,
}

async fn dispatch(
    state: &AppState,
    instruction: Result<Instruction, SchemaError>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    let instruction = instruction?;
    let ack = state.queue.enqueue(&instruction).await?;
    tracing::info!(
        kind = %instruction.kind(),
        prefab = instruction.prefab(),
        depth = ack.depth,
        "Instruction queued"
    );
    Ok(Json(EnqueueResponse {
        success: true,
        message: format!("{} instruction queued", instruction.kind()),
        payload: instruction,
    }))
}

/// POST /set/spawn
pub async fn set_spawn(
    State(state): State<AppState>,
    Json(req): Json<SpawnRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    dispatch(&state, SpawnParams::try_from(req).map(Instruction::Spawn)).await
}

/// POST /set/move
pub async fn set_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    dispatch(&state, MoveParams::try_from(req).map(Instruction::Move)).await
}

/// POST /set/replace
pub async fn set_replace(
    State(state): State<AppState>,
    Json(req): Json<ReplaceRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    dispatch(&state, ReplaceParams::try_from(req).map(Instruction::Replace)).await
}

/// POST /set/rotate
pub async fn set_rotate(
    State(state): State<AppState>,
    Json(req): Json<RotateRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    dispatch(&state, RotateParams::try_from(req).map(Instruction::Rotate)).await
}

/// POST /set/remove
pub async fn set_remove(
    State(state): State<AppState>,
    Json(req): Json<RemoveRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    dispatch(&state, RemoveParams::try_from(req).map(Instruction::Remove)).await
}

/// POST /set/snap
pub async fn set_snap(
    State(state): State<AppState>,
    Json(req): Json<SnapRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    dispatch(&state, SnapParams::try_from(req).map(Instruction::Snap)).await
}

/// POST /set/scale
pub async fn set_scale(
    State(state): State<AppState>,
    Json(req): Json<ScaleRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    dispatch(&state, ScaleParams::try_from(req).map(Instruction::Scale)).await
}
