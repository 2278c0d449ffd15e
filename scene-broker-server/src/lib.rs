//! Scene Broker HTTP server
//!
//! Exposes the explicit command routes, the natural-language prompt route and
//! the consumer side (queue drain, response mailbox, readiness flag).

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use anyhow::{Context, Result};

use scene_broker_core::{
    HttpSceneProbe, InstructionQueue, LlmSlotFiller, MailboxSceneProbe, MemoryInstructionQueue,
    OpenAiClient, PreconditionValidator, PromptBroker, RedisInstructionQueue, ResponseMailbox,
    SceneProbe,
};

pub use config::ServerConfig;
pub use routes::build_router;
pub use state::AppState;

/// Wire queue, probe and slot filler from configuration.
///
/// The readiness flag is raised only when a slot filler could be built.
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let queue: Arc<dyn InstructionQueue> = match &config.redis_url {
        Some(url) => {
            let redis = RedisInstructionQueue::new(url, config.instruction_key.clone())
                .context("Failed to configure Redis instruction queue")?;
            tracing::info!(key = redis.key(), "Using Redis instruction queue");
            Arc::new(redis)
        }
        None => {
            tracing::warn!("REDIS_URL not set, using in-memory instruction queue");
            Arc::new(MemoryInstructionQueue::new())
        }
    };

    let mailbox = Arc::new(ResponseMailbox::new());

    let probe: Arc<dyn SceneProbe> = match &config.scene_api_url {
        Some(url) => {
            tracing::info!(url = %url, "Probing scene state over HTTP");
            Arc::new(
                HttpSceneProbe::new(url, config.probe_timeout())
                    .context("Failed to configure scene probe")?,
            )
        }
        None => Arc::new(MailboxSceneProbe::new(mailbox.clone())),
    };

    let mut state =
        AppState::new(queue.clone(), mailbox).with_settle_delay(config.settle_delay());

    match OpenAiClient::from_env() {
        Ok(client) => {
            let client = client.with_timeout(config.llm_timeout())?;
            let filler = LlmSlotFiller::new(Arc::new(client));
            tracing::info!(model = filler.model_name(), "Slot filler ready");
            let validator = PreconditionValidator::new(probe);
            state = state.with_broker(Arc::new(PromptBroker::new(
                validator,
                Arc::new(filler),
                queue,
            )));
            state.readiness.set(true);
        }
        Err(e) => {
            tracing::warn!("Prompt route disabled: {}", e);
        }
    }

    Ok(state)
}
