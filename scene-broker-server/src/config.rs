//! Server configuration
//!
//! Every setting is a CLI flag with an environment fallback, so a `.env` file
//! loaded by `dotenvy` before parsing is enough for container deployments.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use scene_broker_core::DEFAULT_INSTRUCTION_KEY;

#[derive(Debug, Clone, Parser)]
#[command(name = "scene-broker")]
#[command(about = "Validate scene instructions and dispatch them to the scene consumer")]
pub struct ServerConfig {
    /// Address the HTTP API binds to
    #[arg(long, env = "BROKER_BIND", default_value = "0.0.0.0:8008")]
    pub bind: SocketAddr,

    /// Redis connection URL for the instruction queue (in-memory queue when unset)
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Redis list key shared with the consumer
    #[arg(long, env = "INSTRUCTION_KEY", default_value = DEFAULT_INSTRUCTION_KEY)]
    pub instruction_key: String,

    /// How long a prompt waits before reading the response mailbox
    #[arg(long, env = "SETTLE_DELAY_MS", default_value_t = 5000)]
    pub settle_delay_ms: u64,

    /// Broker whose `/response` holds scene state (local mailbox when unset)
    #[arg(long, env = "SCENE_API_URL")]
    pub scene_api_url: Option<String>,

    #[arg(long, env = "PROBE_TIMEOUT_MS", default_value_t = 2000)]
    pub probe_timeout_ms: u64,

    #[arg(long, env = "LLM_TIMEOUT_MS", default_value_t = 30000)]
    pub llm_timeout_ms: u64,
}

impl ServerConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm_timeout_ms)
    }
}
