//! Search bar state for the matrix filter.
//!
//! Typing edits the query live; Esc restores the query that was active
//! when editing started, Enter keeps the edit.

/// Line editor for the search filter.
#[derive(Debug, Clone, Default)]
pub struct SearchBar {
    /// Whether the bar has keyboard focus
    pub active: bool,
    /// Text being edited (applied live)
    pub query: String,
    /// Query to restore on cancel
    saved: String,
}

impl SearchBar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus the bar, keeping the current query for editing.
    pub fn start(&mut self) {
        self.active = true;
        self.saved.clone_from(&self.query);
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    /// Clear the whole line (Ctrl-U).
    pub fn clear_line(&mut self) {
        self.query.clear();
    }

    /// Keep the edited query and leave the bar.
    pub fn commit(&mut self) {
        self.active = false;
        self.saved.clear();
    }

    /// Restore the query from before editing and leave the bar.
    pub fn cancel(&mut self) {
        self.active = false;
        self.query = std::mem::take(&mut self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_keeps_edit() {
        let mut bar = SearchBar::new();
        bar.start();
        bar.push_char('w');
        bar.push_char('e');
        bar.push_char('x');
        bar.pop_char();
        bar.commit();
        assert!(!bar.active);
        assert_eq!(bar.query, "we");
    }

    #[test]
    fn test_cancel_restores_previous_query() {
        let mut bar = SearchBar::new();
        bar.query = "api".into();
        bar.start();
        bar.clear_line();
        bar.push_char('d');
        bar.cancel();
        assert_eq!(bar.query, "api");
    }
}
