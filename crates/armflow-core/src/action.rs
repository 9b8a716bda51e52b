use crate::error::{FlowError, Result};
use std::fmt;

/// Comment used when an action is registered without one.
pub const DEFAULT_COMMENT: &str = "--";

/// Callback run when an action executes. Takes nothing, returns nothing.
pub type Invoke = Box<dyn Fn() + Send + Sync>;

/// A named, invokable unit of work.
///
/// Immutable once registered. The registry owns every `Action` it holds and
/// drops them on [`ActionRegistry::clear`].
pub struct Action {
    name: String,
    comment: String,
    invoke: Invoke,
}

impl Action {
    pub fn new(
        name: impl Into<String>,
        invoke: impl Fn() + Send + Sync + 'static,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            invoke: Box::new(invoke),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn invoke(&self) {
        (self.invoke)()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("comment", &self.comment)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ActionRegistry
// ---------------------------------------------------------------------------

/// Ordered collection of actions. An index is the insertion position and
/// keeps referring to the same action until [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: Vec<Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action and return its index.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        invoke: impl Fn() + Send + Sync + 'static,
        comment: impl Into<String>,
    ) -> usize {
        self.push(Action::new(name, invoke, comment))
    }

    /// Append an action carrying the default `"--"` comment.
    pub fn add_uncommented(
        &mut self,
        name: impl Into<String>,
        invoke: impl Fn() + Send + Sync + 'static,
    ) -> usize {
        self.add(name, invoke, DEFAULT_COMMENT)
    }

    pub fn push(&mut self, action: Action) -> usize {
        self.actions.push(action);
        self.actions.len() - 1
    }

    /// Remove every action. Indices handed out before this call go stale.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn get(&self, index: usize) -> Result<&Action> {
        self.actions.get(index).ok_or(FlowError::IndexOutOfRange {
            index,
            len: self.actions.len(),
        })
    }

    /// Index of the first action called `name`.
    pub fn find_first_by_name(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Action)> {
        self.actions.iter().enumerate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn noop() {}

    #[test]
    fn add_returns_insertion_index() {
        let mut reg = ActionRegistry::new();
        assert_eq!(reg.add("home", noop, "go home"), 0);
        assert_eq!(reg.add("pick", noop, "grab part"), 1);
        assert_eq!(reg.add_uncommented("place", noop), 2);
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.get(1).unwrap().name(), "pick");
        assert_eq!(reg.get(2).unwrap().comment(), DEFAULT_COMMENT);
    }

    #[test]
    fn get_out_of_range_reports_index_and_len() {
        let mut reg = ActionRegistry::new();
        reg.add_uncommented("only", noop);
        let err = reg.get(1).unwrap_err();
        assert!(matches!(
            err,
            FlowError::IndexOutOfRange { index: 1, len: 1 }
        ));
    }

    #[test]
    fn clear_invalidates_previous_indices() {
        let mut reg = ActionRegistry::new();
        reg.add_uncommented("a", noop);
        reg.add_uncommented("b", noop);
        reg.clear();
        assert!(reg.is_empty());
        assert!(reg.get(0).is_err());
        assert!(reg.get(1).is_err());
    }

    #[test]
    fn find_first_by_name_prefers_lowest_index() {
        let mut reg = ActionRegistry::new();
        reg.add_uncommented("grip", noop);
        reg.add_uncommented("move", noop);
        reg.add_uncommented("move", noop);
        assert_eq!(reg.find_first_by_name("move"), Some(1));
        assert_eq!(reg.find_first_by_name("release"), None);
    }

    #[test]
    fn invoke_calls_the_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let action = Action::new(
            "count",
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            DEFAULT_COMMENT,
        );
        action.invoke();
        action.invoke();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn appending_keeps_existing_indices_stable() {
        let mut reg = ActionRegistry::new();
        reg.add_uncommented("first", noop);
        for i in 0..10 {
            reg.add_uncommented(format!("n{i}"), noop);
        }
        assert_eq!(reg.get(0).unwrap().name(), "first");
    }
}
