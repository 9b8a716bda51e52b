pub mod action;
pub mod config;
pub mod error;
pub mod gate;
pub mod selection;
pub mod sequencer;

pub use action::{Action, ActionRegistry, DEFAULT_COMMENT};
pub use error::{FlowError, Result};
pub use gate::{ConfirmPrompt, ConfirmationGate, Decision, PromptReply};
pub use selection::{ListSelection, SelectionDisplay};
pub use sequencer::Sequencer;
