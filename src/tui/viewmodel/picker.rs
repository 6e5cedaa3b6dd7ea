//! Cursor state of the namespace picker overlay.

use crate::tui::state::ListNavigation;

/// Cursor over the namespace choices; the choices themselves live in the
/// matrix view and may change while the picker is open.
#[derive(Debug, Clone, Default)]
pub struct NamespacePicker {
    selected: usize,
    total: usize,
}

impl NamespacePicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the item count, keeping the cursor in range.
    pub fn sync(&mut self, total: usize) {
        self.total = total;
        self.clamp_selection();
    }

    /// Choice under the cursor.
    #[must_use]
    pub fn current<'a>(&self, choices: &'a [String]) -> Option<&'a str> {
        choices.get(self.selected).map(String::as_str)
    }
}

impl ListNavigation for NamespacePicker {
    fn selected(&self) -> usize {
        self.selected
    }

    fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
    }

    fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_clamps_cursor() {
        let choices: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let mut picker = NamespacePicker::new();
        picker.sync(choices.len());
        picker.go_last();
        assert_eq!(picker.current(&choices), Some("c"));

        picker.sync(1);
        assert_eq!(picker.current(&choices), Some("a"));
    }
}
