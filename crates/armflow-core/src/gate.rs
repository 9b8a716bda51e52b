use crate::action::Action;

/// Title shown on every confirmation prompt.
pub const PROMPT_TITLE: &str = "Next Action";

// ---------------------------------------------------------------------------
// PromptReply / ConfirmPrompt
// ---------------------------------------------------------------------------

/// What the operator answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptReply {
    Ok,
    No,
    Cancel,
}

/// Something that can put a yes/no/cancel question to an operator and wait
/// for the answer. Blocks the calling thread while the question is open.
pub trait ConfirmPrompt {
    fn ask(&mut self, title: &str, text: &str) -> PromptReply;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str, &str) -> PromptReply,
{
    fn ask(&mut self, title: &str, text: &str) -> PromptReply {
        self(title, text)
    }
}

// ---------------------------------------------------------------------------
// Decision / ConfirmationGate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Decides, before each action, whether the run continues.
///
/// Only `PromptReply::Cancel` aborts. `No` is treated the same as `Ok`.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationGate {
    pub enabled: bool,
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ConfirmationGate {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn confirm<P: ConfirmPrompt + ?Sized>(
        &self,
        index: usize,
        action: &Action,
        prompt: &mut P,
    ) -> Decision {
        if !self.enabled {
            return Decision::Proceed;
        }
        match prompt.ask(PROMPT_TITLE, &describe(index, action)) {
            PromptReply::Cancel => Decision::Abort,
            PromptReply::Ok | PromptReply::No => Decision::Proceed,
        }
    }
}

/// Prompt body: index, name and comment, one per line.
pub fn describe(index: usize, action: &Action) -> String {
    format!(
        "•Index: {index}\n•Name: {}\n•Comment: {}",
        action.name(),
        action.comment()
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
