//! Scene Broker Core
//!
//! Turns natural-language scene instructions into validated commands and
//! hands them, in order, to a single external consumer.
//!
//! ## Pipeline
//!
//! ```text
//! prompt → classifier → validator (scene probe) → fill → schema → queue
//!                                                                   │
//!                      consumer pops, executes, posts report ◄──────┘
//!                                      │
//!                                      ▼
//!                               response mailbox
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_broker_core::classifier::{classify, Action};
//!
//! let c = classify("Spawn a turbine_blade next to the engine_stand");
//! assert_eq!(c.action, Some(Action::Spawn));
//! ```

pub mod broker;
pub mod classifier;
pub mod error;
pub mod fill;
pub mod llm;
pub mod mailbox;
pub mod probe;
pub mod queue;
pub mod schema;
pub mod validator;

pub use broker::{PromptBroker, PromptOutcome};
pub use classifier::{classify, Action, Classification};
pub use error::{DispatchError, FillError, ProbeError, QueueStoreError, SchemaError};
pub use fill::{LlmSlotFiller, SlotFiller};
pub use llm::{LlmClient, OpenAiClient};
pub use mailbox::{ExecutionReport, ReadinessFlag, ResponseMailbox};
pub use probe::{HttpSceneProbe, MailboxSceneProbe, SceneProbe, SceneState, StaticSceneProbe};
pub use queue::{
    EnqueueAck, InstructionQueue, MemoryInstructionQueue, RedisInstructionQueue,
    DEFAULT_INSTRUCTION_KEY,
};
pub use schema::{CommandKind, Instruction, ParameterMap};
pub use validator::{DeficiencyReport, PreconditionValidator, ValidationResult};
