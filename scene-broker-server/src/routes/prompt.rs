//! Natural-language entry point
//!
//! A dispatched prompt waits out the settle window and then answers with
//! whatever the mailbox holds. The mailbox is last-writer-wins, so under
//! concurrent prompts the answer may belong to a different instruction.

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use scene_broker_core::broker::UNRECOGNIZED_MESSAGE;
use scene_broker_core::classifier::has_action_keyword;

use super::consumer::MailboxEnvelope;
use crate::state::AppState;

pub const NOT_READY_MESSAGE: &str =
    "The instruction interpreter is not ready yet. Please try again shortly.";

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// `{"response": {"message": "..."}}`
#[derive(Debug, Serialize)]
pub struct PromptReply {
    pub response: MessageBody,
}

impl PromptReply {
    fn message(text: impl Into<String>) -> Json<Self> {
        Json(Self {
            response: MessageBody {
                message: text.into(),
            },
        })
    }
}

/// POST /set/prompt
///
/// A prompt without any action keyword is answered before the readiness
/// check, so it never waits on the interpreter.
pub async fn set_prompt(
    State(state): State<AppState>,
    Json(req): Json<PromptRequest>,
) -> Response {
    if !has_action_keyword(&req.prompt) {
        return PromptReply::message(UNRECOGNIZED_MESSAGE).into_response();
    }

    let broker = match &state.broker {
        Some(broker) if state.readiness.is_ready() => broker.clone(),
        _ => {
            tracing::info!("Prompt received before the interpreter was ready");
            return PromptReply::message(NOT_READY_MESSAGE).into_response();
        }
    };

    let revision_before = state.mailbox.revision().await;
    let outcome = broker.submit(&req.prompt).await;
    if let Some(text) = outcome.message() {
        return PromptReply::message(text).into_response();
    }

    tokio::time::sleep(state.settle_delay).await;

    let (revision, report) = state.mailbox.snapshot().await;
    if revision == revision_before {
        tracing::warn!(
            revision,
            "No consumer report within the settle window; answering with the previous report"
        );
    }

    Json(MailboxEnvelope { response: report }).into_response()
}
