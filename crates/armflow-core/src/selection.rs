/// The narrow view the sequencer has of whatever lists the actions for the
/// operator. Indices are registry indices.
pub trait SelectionDisplay {
    /// Currently selected indices, ascending. Empty when nothing is selected.
    fn selected_indices(&self) -> Vec<usize>;

    /// Replace the selection with exactly `indices`.
    fn set_selection(&mut self, indices: &[usize]);

    /// Number of rows the display shows. Kept equal to the registry length by
    /// whoever populates the display.
    fn item_count(&self) -> usize;
}

/// In-memory selection over `len` rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSelection {
    len: usize,
    selected: Vec<usize>,
}

impl ListSelection {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            selected: Vec::new(),
        }
    }

    pub fn with_selected(len: usize, indices: &[usize]) -> Self {
        let mut sel = Self::new(len);
        sel.set_selection(indices);
        sel
    }

    /// Resize to `len` rows, dropping selected indices that no longer exist.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.selected.retain(|&i| i < len);
    }
}

impl SelectionDisplay for ListSelection {
    fn selected_indices(&self) -> Vec<usize> {
        self.selected.clone()
    }

    fn set_selection(&mut self, indices: &[usize]) {
        let mut next: Vec<usize> = indices.iter().copied().filter(|&i| i < self.len).collect();
        next.sort_unstable();
        next.dedup();
        self.selected = next;
    }

    fn item_count(&self) -> usize {
        self.len
    }
}
