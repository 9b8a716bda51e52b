//! Runs registered actions one at a time behind the confirmation gate.
//!
//! Every `run_*` method takes `&mut self`, so a sequencer can only ever have
//! one run in flight. The only blocking point inside a run is the
//! confirmation prompt; a hung action blocks the run indefinitely.
//!
//! Runs return the last successfully executed index (`None` until anything
//! has run). An aborted run leaves that index where the aborting step found
//! it, which is the only signal distinguishing "aborted" from "completed".

use crate::action::{Action, ActionRegistry};
use crate::error::Result;
use crate::gate::{ConfirmPrompt, ConfirmationGate, Decision};
use crate::selection::SelectionDisplay;

/// Outcome of a single gated step inside a run.
enum Step {
    Ran,
    Aborted,
}

pub struct Sequencer<P, S> {
    registry: ActionRegistry,
    gate: ConfirmationGate,
    prompt: P,
    selection: S,
    auto_next_action: bool,
    last_action_index: Option<usize>,
}

impl<P: ConfirmPrompt, S: SelectionDisplay> Sequencer<P, S> {
    /// New sequencer with auto-advance and confirmation both on.
    pub fn new(prompt: P, selection: S) -> Self {
        Self {
            registry: ActionRegistry::new(),
            gate: ConfirmationGate::default(),
            prompt,
            selection,
            auto_next_action: true,
            last_action_index: None,
        }
    }

    // ---------------------------------------------------------------------------
    // Accessors and toggles
    // ---------------------------------------------------------------------------

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Mutable registry access. Clearing while a caller still holds indices
    /// makes those indices (and `last_action_index`) stale.
    pub fn registry_mut(&mut self) -> &mut ActionRegistry {
        &mut self.registry
    }

    pub fn selection(&self) -> &S {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut S {
        &mut self.selection
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn last_action_index(&self) -> Option<usize> {
        self.last_action_index
    }

    pub fn auto_next_action(&self) -> bool {
        self.auto_next_action
    }

    pub fn set_auto_next_action(&mut self, on: bool) {
        self.auto_next_action = on;
    }

    pub fn confirm_before_action(&self) -> bool {
        self.gate.enabled
    }

    pub fn set_confirm_before_action(&mut self, on: bool) {
        self.gate.enabled = on;
    }

    /// Register an action; shorthand for `registry_mut().add(..)`.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        invoke: impl Fn() + Send + Sync + 'static,
        comment: impl Into<String>,
    ) -> usize {
        self.registry.add(name, invoke, comment)
    }

    /// Select the first action, or nothing when the registry is empty.
    pub fn reset_selection(&mut self) {
        if self.registry.is_empty() {
            self.selection.set_selection(&[]);
        } else {
            self.selection.set_selection(&[0]);
        }
    }

    // ---------------------------------------------------------------------------
    // Execution modes
    // ---------------------------------------------------------------------------

    pub fn run_one(&mut self, index: usize) -> Result<Option<usize>> {
        if let Step::Ran = self.step(index)? {
            self.auto_advance();
        }
        Ok(self.last_action_index)
    }

    /// Run `start..=end`. An empty range (`end < start`) runs nothing but
    /// still auto-advances.
    pub fn run_range(&mut self, start: usize, end: usize) -> Result<Option<usize>> {
        if end >= start {
            for index in start..=end {
                if let Step::Aborted = self.step(index)? {
                    return Ok(self.last_action_index);
                }
            }
        }
        self.auto_advance();
        Ok(self.last_action_index)
    }

    /// Run the first action named `name`. Unknown names are a no-op.
    pub fn run_by_name(&mut self, name: &str) -> Result<Option<usize>> {
        match self.registry.find_first_by_name(name) {
            Some(index) => self.run_one(index),
            None => {
                tracing::debug!(name, "no action with that name");
                Ok(self.last_action_index)
            }
        }
    }

    /// Run every action in order. Never auto-advances.
    pub fn run_all(&mut self) -> Result<Option<usize>> {
        for index in 0..self.registry.len() {
            if let Step::Aborted = self.step(index)? {
                break;
            }
        }
        Ok(self.last_action_index)
    }

    /// Run the currently selected actions in selection order.
    pub fn run_selected(&mut self) -> Result<Option<usize>> {
        let indices = self.selection.selected_indices();
        self.run_indices(&indices)
    }

    /// Run exactly `indices`, in the order given, repeats included. Stops at
    /// the first abort or out-of-range index; auto-advances only when every
    /// step ran.
    pub fn run_indices(&mut self, indices: &[usize]) -> Result<Option<usize>> {
        for &index in indices {
            if let Step::Aborted = self.step(index)? {
                return Ok(self.last_action_index);
            }
        }
        self.auto_advance();
        Ok(self.last_action_index)
    }

    // ---------------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------------

    /// Look up, gate and invoke one action.
    fn step(&mut self, index: usize) -> Result<Step> {
        let action: &Action = self.registry.get(index)?;
        match self.gate.confirm(index, action, &mut self.prompt) {
            Decision::Abort => {
                tracing::info!(index, name = action.name(), "run aborted at confirmation");
                Ok(Step::Aborted)
            }
            Decision::Proceed => {
                tracing::info!(index, name = action.name(), "running action");
                action.invoke();
                self.last_action_index = Some(index);
                Ok(Step::Ran)
            }
        }
    }

    /// Move the selection to the row after the highest selected one. Never
    /// wraps and never moves past the last action.
    fn auto_advance(&mut self) {
        if !self.auto_next_action {
            return;
        }
        let Some(last_selected) = self.selection.selected_indices().into_iter().max() else {
            return;
        };

        let len = self.registry.len();
        if self.selection.item_count() != len {
            tracing::warn!(
                display = self.selection.item_count(),
                registry = len,
                "selection display is out of sync with the registry"
            );
        }

        if last_selected + 1 < len {
            self.selection.set_selection(&[last_selected + 1]);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
