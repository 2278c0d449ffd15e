//! Response Mailbox and Readiness Flag
//!
//! The mailbox is a single slot holding the most recent execution report
//! posted by the consumer. Posts overwrite unconditionally and reads return
//! whatever is held; there is no link between a submitted instruction and
//! the report a caller eventually reads. Concurrent prompt callers can read
//! each other's results. That is the accepted last-writer-wins policy.
//!
//! The revision counter lets a caller tell whether anything was posted while
//! it waited, without changing what it reads.

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

/// Result the consumer posts after executing an instruction.
///
/// The object lists are comma-delimited, exactly as the consumer reports
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub message: String,
    pub current_objects: String,
    pub available_prefabs: String,
}

#[derive(Debug, Default)]
struct Slot {
    revision: u64,
    report: Option<ExecutionReport>,
}

/// Single-slot, overwrite-on-write holder.
#[derive(Debug, Default)]
pub struct ResponseMailbox {
    slot: RwLock<Slot>,
}

impl ResponseMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot. Returns the new revision.
    pub async fn post(&self, report: ExecutionReport) -> u64 {
        let mut slot = self.slot.write().await;
        slot.revision += 1;
        slot.report = Some(report);
        tracing::debug!(revision = slot.revision, "Mailbox overwritten");
        slot.revision
    }

    /// Current content, verbatim. Never blocks on the consumer.
    pub async fn read(&self) -> Option<ExecutionReport> {
        self.slot.read().await.report.clone()
    }

    /// Revision and content together, read under one lock.
    pub async fn snapshot(&self) -> (u64, Option<ExecutionReport>) {
        let slot = self.slot.read().await;
        (slot.revision, slot.report.clone())
    }

    pub async fn revision(&self) -> u64 {
        self.slot.read().await.revision
    }
}

/// Whether the downstream interpreter pipeline has finished initializing.
///
/// Readers may observe a stale value; the flag is advisory.
#[derive(Debug)]
pub struct ReadinessFlag {
    sender: watch::Sender<bool>,
}

impl ReadinessFlag {
    pub fn new(initial: bool) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn set(&self, ready: bool) {
        let changed = self.sender.send_replace(ready) != ready;
        if changed {
            tracing::info!(ready, "Readiness flag changed");
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Default for ReadinessFlag {
    fn default() -> Self {
        Self::new(false)
    }
}
