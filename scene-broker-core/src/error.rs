//! Error types for the broker core
//!
//! One enum per concern. Every error is handled at the boundary of the
//! request that raised it; nothing here is retried.

use thiserror::Error;

use crate::schema::CommandKind;

/// A field failed its schema constraint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("{field} is invalid: '{value}'. Allowed values: {}", .allowed.join(", "))]
    InvalidChoice {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("{field} should be a number, got '{value}'")]
    NotNumeric { field: &'static str, value: String },

    #[error("{field} is out of range: '{value}'")]
    OutOfRange { field: &'static str, value: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("Malformed {kind} parameters: {reason}")]
    Malformed { kind: CommandKind, reason: String },
}

impl SchemaError {
    /// Name of the offending field, when there is a single one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SchemaError::InvalidChoice { field, .. }
            | SchemaError::NotNumeric { field, .. }
            | SchemaError::OutOfRange { field, .. }
            | SchemaError::Empty { field } => Some(*field),
            SchemaError::Malformed { .. } => None,
        }
    }
}

/// The scene snapshot could not be read. Callers treat this as
/// "cannot confirm", never as "confirmed absent".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("Scene state transport error: {0}")]
    Transport(String),

    #[error("Malformed scene state: {0}")]
    Malformed(String),

    #[error("No scene state has been reported yet")]
    Absent,
}

/// The queue store rejected an append or pop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueueStoreError {
    #[error("Queue store connection error: {0}")]
    Connection(String),

    #[error("Queue payload serialization error: {0}")]
    Serialization(String),
}

/// The external slot-filling step failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FillError {
    #[error("Slot filling call failed: {0}")]
    Upstream(String),

    #[error("Slot filling output could not be parsed: {0}")]
    Unparsable(String),
}

/// Anything that stops a validated prompt from reaching the queue.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Fill(#[from] FillError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Queue(#[from] QueueStoreError),
}
