//! Overlay visibility; at most one overlay is shown at a time.

/// Available overlay types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Key bindings
    Help,
    /// Namespace multi-select
    Namespaces,
    /// Resource or policy details fetched from the backend
    Details,
}

/// Manages overlay visibility with mutual exclusion.
#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    current: Option<OverlayKind>,
}

impl OverlayState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_overlay(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn is_showing(&self, kind: OverlayKind) -> bool {
        self.current == Some(kind)
    }

    #[must_use]
    pub fn current(&self) -> Option<OverlayKind> {
        self.current
    }

    /// Show a specific overlay, closing any other.
    pub fn show(&mut self, kind: OverlayKind) {
        self.current = Some(kind);
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn toggle(&mut self, kind: OverlayKind) {
        if self.current == Some(kind) {
            self.current = None;
        } else {
            self.current = Some(kind);
        }
    }
}
