//! Prompt Broker
//!
//! Runs one free-text prompt through the pipeline:
//!
//! ```text
//! prompt → classify → validate (scene probe) → fill (LLM) → schema → enqueue
//! ```
//!
//! Every stage that can stop the prompt maps to a `PromptOutcome`. A
//! deficient prompt never reaches the slot filler or the queue.

use std::sync::Arc;

use crate::classifier::{classify, Action};
use crate::error::{DispatchError, FillError, SchemaError};
use crate::fill::SlotFiller;
use crate::queue::{EnqueueAck, InstructionQueue};
use crate::schema::Instruction;
use crate::validator::{DeficiencyReport, PreconditionValidator, ValidationResult};

pub const UNRECOGNIZED_MESSAGE: &str = "Invalid action. Please specify an action.";

/// Result of submitting one prompt.
#[derive(Debug)]
pub enum PromptOutcome {
    /// No action keyword in the prompt.
    Unrecognized,
    /// Preconditions unmet; nothing was filled or queued.
    Deficient(DeficiencyReport),
    /// Filled output violated the command schema.
    Rejected { action: Action, error: SchemaError },
    /// The fill step failed or produced unparsable output.
    FillFailed { action: Action, reason: FillError },
    /// The queue store refused the append.
    QueueUnavailable { reason: String },
    /// Appended to the dispatch queue.
    Dispatched {
        instruction: Instruction,
        ack: EnqueueAck,
    },
}

impl PromptOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, PromptOutcome::Dispatched { .. })
    }

    /// User-facing text for every outcome except `Dispatched`, whose answer
    /// comes from the consumer.
    pub fn message(&self) -> Option<String> {
        match self {
            PromptOutcome::Unrecognized => Some(UNRECOGNIZED_MESSAGE.to_string()),
            PromptOutcome::Deficient(report) => Some(report.message()),
            PromptOutcome::Rejected { action, error } => {
                Some(format!("{} Action: {}.", action.label(), error))
            }
            PromptOutcome::FillFailed { action, .. } => Some(format!(
                "{} Action: Could not interpret the instruction. Please rephrase it.",
                action.label()
            )),
            PromptOutcome::QueueUnavailable { .. } => {
                Some("The instruction could not be queued. Please try again later.".to_string())
            }
            PromptOutcome::Dispatched { .. } => None,
        }
    }
}

pub struct PromptBroker {
    validator: PreconditionValidator,
    filler: Arc<dyn SlotFiller>,
    queue: Arc<dyn InstructionQueue>,
}

impl PromptBroker {
    pub fn new(
        validator: PreconditionValidator,
        filler: Arc<dyn SlotFiller>,
        queue: Arc<dyn InstructionQueue>,
    ) -> Self {
        Self {
            validator,
            filler,
            queue,
        }
    }

    pub async fn submit(&self, prompt: &str) -> PromptOutcome {
        let classification = classify(prompt);
        let Some(action) = classification.action else {
            tracing::info!("Prompt matched no action keyword");
            return PromptOutcome::Unrecognized;
        };

        if let ValidationResult::Deficient(report) =
            self.validator.validate(action, &classification.tokens).await
        {
            tracing::info!(%action, missing = ?report.missing, "Prompt preconditions unmet");
            return PromptOutcome::Deficient(report);
        }

        match self.fill_and_enqueue(action, prompt).await {
            Ok((instruction, ack)) => {
                tracing::info!(
                    kind = %instruction.kind(),
                    prefab = instruction.prefab(),
                    depth = ack.depth,
                    "Instruction queued from prompt"
                );
                PromptOutcome::Dispatched { instruction, ack }
            }
            Err(DispatchError::Fill(reason)) => {
                tracing::warn!(%action, "Slot filling failed: {}", reason);
                PromptOutcome::FillFailed { action, reason }
            }
            Err(DispatchError::Schema(error)) => {
                tracing::warn!(%action, "Filled parameters rejected: {}", error);
                PromptOutcome::Rejected { action, error }
            }
            Err(DispatchError::Queue(e)) => {
                tracing::warn!(%action, "Queue store unavailable: {}", e);
                PromptOutcome::QueueUnavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fill_and_enqueue(
        &self,
        action: Action,
        prompt: &str,
    ) -> Result<(Instruction, EnqueueAck), DispatchError> {
        let parameters = self.filler.fill(action, prompt).await?;
        let instruction = Instruction::from_parameters(action.into(), parameters)?;
        let ack = self.queue.enqueue(&instruction).await?;
        Ok((instruction, ack))
    }
}
