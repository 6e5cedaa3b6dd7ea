//! Virtual scrolling: which rows exist, and how the mounted set changes.
//!
//! Offsets and heights are in terminal lines. A row `i` sits at
//! `i * row_height` inside content of `len * row_height` lines; only the
//! rows intersecting the viewport (plus one for partial overlap) are
//! mounted.

use std::collections::BTreeSet;
use std::ops::Range;

/// Half-open range of visible-list indices that must be rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderWindow {
    pub start: usize,
    pub end: usize,
}

impl RenderWindow {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Difference between the previous mounted set and the new window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub to_mount: Vec<usize>,
    pub to_unmount: Vec<usize>,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.to_mount.is_empty() && self.to_unmount.is_empty()
    }
}

/// Window for `len` items of `item_size` seen through `viewport` lines
/// starting at `offset`. Used for both rows and columns.
pub fn compute_window(len: usize, offset: usize, viewport: usize, item_size: usize) -> RenderWindow {
    let item_size = item_size.max(1);
    let start = (offset / item_size).min(len);
    let end = len.min(start + viewport.div_ceil(item_size) + 1);
    RenderWindow { start, end }
}

/// Row virtualization state owned by the matrix view.
#[derive(Debug, Clone)]
pub struct VirtualScroller {
    row_height: usize,
    viewport_height: usize,
    scroll_offset: usize,
    mounted: BTreeSet<usize>,
    window: RenderWindow,
}

impl VirtualScroller {
    pub fn new(row_height: usize) -> Self {
        Self {
            row_height: row_height.max(1),
            viewport_height: 0,
            scroll_offset: 0,
            mounted: BTreeSet::new(),
            window: RenderWindow::default(),
        }
    }

    pub fn row_height(&self) -> usize {
        self.row_height
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn window(&self) -> RenderWindow {
        self.window
    }

    /// Currently mounted row indices.
    pub fn mounted(&self) -> &BTreeSet<usize> {
        &self.mounted
    }

    pub fn is_mounted(&self, row: usize) -> bool {
        self.mounted.contains(&row)
    }

    pub fn content_height(&self, len: usize) -> usize {
        len * self.row_height
    }

    /// Line offset of a row inside the content.
    pub fn row_position(&self, row: usize) -> usize {
        row * self.row_height
    }

    fn max_offset(&self, len: usize) -> usize {
        self.content_height(len)
            .saturating_sub(self.viewport_height)
    }

    /// Set the viewport height (terminal resize). Offset is re-clamped.
    pub fn set_viewport_height(&mut self, height: usize, len: usize) {
        self.viewport_height = height;
        self.clamp_offset(len);
    }

    /// Clamp the offset into `[0, content_height - viewport_height]`.
    pub fn clamp_offset(&mut self, len: usize) {
        self.scroll_offset = self.scroll_offset.min(self.max_offset(len));
    }

    pub fn scroll_to(&mut self, offset: usize, len: usize) {
        self.scroll_offset = offset;
        self.clamp_offset(len);
    }

    /// Scroll by whole rows; negative scrolls up.
    pub fn scroll_rows(&mut self, rows: isize, len: usize) {
        let delta = rows.unsigned_abs() * self.row_height;
        let offset = if rows < 0 {
            self.scroll_offset.saturating_sub(delta)
        } else {
            self.scroll_offset.saturating_add(delta)
        };
        self.scroll_to(offset, len);
    }

    /// Scroll the minimum amount that keeps `row` fully inside the viewport.
    pub fn ensure_visible(&mut self, row: usize, len: usize) {
        let top = self.row_position(row);
        let bottom = top + self.row_height;
        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if bottom > self.scroll_offset + self.viewport_height {
            self.scroll_offset = bottom.saturating_sub(self.viewport_height);
        }
        self.clamp_offset(len);
    }

    /// Rows that are fully on screen, for page-sized keyboard moves.
    pub fn rows_per_page(&self) -> usize {
        (self.viewport_height / self.row_height).max(1)
    }

    /// Bring the mounted set in line with the current window.
    ///
    /// Running it twice with the same inputs returns an empty diff.
    pub fn reconcile(&mut self, len: usize) -> Reconciliation {
        self.clamp_offset(len);
        let window = compute_window(len, self.scroll_offset, self.viewport_height, self.row_height);

        let to_unmount: Vec<usize> = self
            .mounted
            .iter()
            .copied()
            .filter(|i| !window.contains(*i))
            .collect();
        let to_mount: Vec<usize> = window
            .range()
            .filter(|i| !self.mounted.contains(i))
            .collect();

        for i in &to_unmount {
            self.mounted.remove(i);
        }
        self.mounted.extend(to_mount.iter().copied());

        if window != self.window {
            tracing::debug!(
                start = window.start,
                end = window.end,
                mounted = to_mount.len(),
                unmounted = to_unmount.len(),
                "render window changed"
            );
        }
        self.window = window;

        Reconciliation {
            to_mount,
            to_unmount,
        }
    }

    /// Unmount everything and scroll to the top, then mount from row 0.
    pub fn reset(&mut self, len: usize) -> Reconciliation {
        let mut unmounted: Vec<usize> = std::mem::take(&mut self.mounted).into_iter().collect();
        self.scroll_offset = 0;
        self.window = RenderWindow::default();
        let mut diff = self.reconcile(len);
        unmounted.append(&mut diff.to_unmount);
        diff.to_unmount = unmounted;
        diff
    }
}
