//! Shared list navigation for pickers and overlays.

/// Trait for list-based navigation state.
///
/// Provides common selection and navigation methods for any view
/// that displays a selectable list of items.
pub trait ListNavigation {
    /// Get the current selection index.
    fn selected(&self) -> usize;

    /// Set the selection index.
    fn set_selected(&mut self, idx: usize);

    /// Get the total number of items.
    fn total(&self) -> usize;

    /// Move selection to the next item.
    fn select_next(&mut self) {
        let total = self.total();
        let selected = self.selected();
        if total > 0 && selected < total - 1 {
            self.set_selected(selected + 1);
        }
    }

    /// Move selection to the previous item.
    fn select_prev(&mut self) {
        let selected = self.selected();
        if selected > 0 {
            self.set_selected(selected - 1);
        }
    }

    /// Ensure selection is within valid bounds.
    fn clamp_selection(&mut self) {
        let total = self.total();
        if self.selected() >= total {
            self.set_selected(total.saturating_sub(1));
        }
    }

    fn go_first(&mut self) {
        self.set_selected(0);
    }

    fn go_last(&mut self) {
        self.set_selected(self.total().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        selected: usize,
        total: usize,
    }

    impl ListNavigation for Fixed {
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

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut list = Fixed {
            selected: 0,
            total: 3,
        };
        list.select_prev();
        assert_eq!(list.selected, 0);
        list.go_last();
        list.select_next();
        assert_eq!(list.selected, 2);

        list.total = 1;
        list.clamp_selection();
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn test_empty_list() {
        let mut list = Fixed {
            selected: 0,
            total: 0,
        };
        list.select_next();
        list.go_last();
        assert_eq!(list.selected, 0);
    }
}
