//! Shared application state
//!
//! Everything handlers share is injected here; there are no process-wide
//! globals. The mailbox and readiness flag carry their own locking.

use std::sync::Arc;
use std::time::Duration;

use scene_broker_core::{InstructionQueue, PromptBroker, ReadinessFlag, ResponseMailbox};

#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<dyn InstructionQueue>,
    pub mailbox: Arc<ResponseMailbox>,
    pub readiness: Arc<ReadinessFlag>,
    /// Absent when no slot filler is configured.
    pub broker: Option<Arc<PromptBroker>>,
    pub settle_delay: Duration,
}

impl AppState {
    pub fn new(queue: Arc<dyn InstructionQueue>, mailbox: Arc<ResponseMailbox>) -> Self {
        Self {
            queue,
            mailbox,
            readiness: Arc::new(ReadinessFlag::default()),
            broker: None,
            settle_delay: Duration::from_secs(5),
        }
    }

    pub fn with_broker(mut self, broker: Arc<PromptBroker>) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}
