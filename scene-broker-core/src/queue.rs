//! Dispatch Queue
//!
//! Ordered hand-off from producers to the single polling consumer. FIFO, no
//! priority, no dedup: identical instructions are queued and delivered
//! independently. Delivery is at-most-once; a popped instruction is never
//! re-queued, whatever happens to it afterwards.
//!
//! The store is the only serialization point on the data path, so every
//! backend must provide atomic append and atomic pop-from-head.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::error::QueueStoreError;
use crate::schema::Instruction;

/// Default list key shared with the consumer.
pub const DEFAULT_INSTRUCTION_KEY: &str = "instruction";

/// Acknowledgement of a successful append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnqueueAck {
    /// Queue length right after the append.
    pub depth: usize,
}

#[async_trait]
pub trait InstructionQueue: Send + Sync {
    /// Append to the tail.
    async fn enqueue(&self, instruction: &Instruction) -> Result<EnqueueAck, QueueStoreError>;

    /// Pop the head, or `None` when the queue is empty.
    async fn dequeue(&self) -> Result<Option<Instruction>, QueueStoreError>;

    async fn len(&self) -> Result<usize, QueueStoreError>;

    async fn is_empty(&self) -> Result<bool, QueueStoreError> {
        Ok(self.len().await? == 0)
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Process-local queue. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryInstructionQueue {
    items: Mutex<VecDeque<Instruction>>,
}

impl MemoryInstructionQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InstructionQueue for MemoryInstructionQueue {
    async fn enqueue(&self, instruction: &Instruction) -> Result<EnqueueAck, QueueStoreError> {
        let mut items = self.items.lock().await;
        items.push_back(instruction.clone());
        Ok(EnqueueAck { depth: items.len() })
    }

    async fn dequeue(&self) -> Result<Option<Instruction>, QueueStoreError> {
        Ok(self.items.lock().await.pop_front())
    }

    async fn len(&self) -> Result<usize, QueueStoreError> {
        Ok(self.items.lock().await.len())
    }
}

// ============================================================================
// Redis backend
// ============================================================================

/// Redis list addressed by a single key. `RPUSH` appends, `LPOP` pops; both
/// are atomic on the server.
pub struct RedisInstructionQueue {
    client: redis::Client,
    key: String,
}

impl RedisInstructionQueue {
    pub fn new(connection_url: &str, key: impl Into<String>) -> Result<Self, QueueStoreError> {
        let client = redis::Client::open(connection_url)
            .map_err(|e| QueueStoreError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            key: key.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, QueueStoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| QueueStoreError::Connection(e.to_string()))
    }
}

#[async_trait]
impl InstructionQueue for RedisInstructionQueue {
    async fn enqueue(&self, instruction: &Instruction) -> Result<EnqueueAck, QueueStoreError> {
        let payload = serde_json::to_string(instruction)
            .map_err(|e| QueueStoreError::Serialization(e.to_string()))?;
        let mut conn = self.connection().await?;
        let depth: usize = conn
            .rpush(&self.key, payload)
            .await
            .map_err(|e| QueueStoreError::Connection(e.to_string()))?;
        Ok(EnqueueAck { depth })
    }

    async fn dequeue(&self) -> Result<Option<Instruction>, QueueStoreError> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn
            .lpop(&self.key, None)
            .await
            .map_err(|e| QueueStoreError::Connection(e.to_string()))?;

        // Already removed from the list; a bad payload is dropped, not re-queued.
        payload
            .map(|raw| {
                serde_json::from_str(&raw)
                    .map_err(|e| QueueStoreError::Serialization(e.to_string()))
            })
            .transpose()
    }

    async fn len(&self) -> Result<usize, QueueStoreError> {
        let mut conn = self.connection().await?;
        conn.llen(&self.key)
            .await
            .map_err(|e| QueueStoreError::Connection(e.to_string()))
    }
}
