//! Multi-step dialogue engine.
//!
//! # Responsibility
//! - Hold per-conversation transient state for guided flows.
//! - Validate each step and decide: advance, re-prompt or commit.
//! - Issue exactly one catalog write at a flow's commit transition.
//!
//! # Invariants
//! - A conversation has at most one live flow; starting a flow replaces it.
//! - Cancelling or abandoning a flow never writes to storage.
//! - Prompt wording belongs to the presentation layer, not this module.

pub mod engine;
pub mod input;
pub mod state;
pub mod store;

pub use engine::{DialogueEngine, DialogueError, FlowChoice, Prompt, Rejection, StepOutcome};
pub use state::{AddBookStep, BookDraft, ConversationId, DialogueState, StateTag};
pub use store::DialogueStore;
