//! HTTP routes

pub mod commands;
pub mod consumer;
pub mod prompt;
pub mod status;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Assemble the full API. CORS is permissive: any origin, method and header.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/set/spawn", post(commands::set_spawn))
        .route("/set/move", post(commands::set_move))
        .route("/set/replace", post(commands::set_replace))
        .route("/set/rotate", post(commands::set_rotate))
        .route("/set/remove", post(commands::set_remove))
        .route("/set/snap", post(commands::set_snap))
        .route("/set/scale", post(commands::set_scale))
        .route("/set/prompt", post(prompt::set_prompt))
        .route("/instruction", get(consumer::get_instruction))
        .route("/set/response", post(consumer::set_response))
        .route("/response", get(consumer::get_response))
        .route("/set/llm_status", post(status::set_llm_status))
        .route("/llm_status", get(status::get_llm_status))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "ready": state.readiness.is_ready(),
    }))
}
