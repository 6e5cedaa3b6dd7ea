//! Per-cell presentation state machine.

use crate::error::ClientErrorKind;
use crate::model::{AnalysisResult, Verdict};

/// Display state of one matrix cell.
///
/// `Unknown -> Pending -> Resolved | Error`; `Error -> Pending` on retry.
/// A cache hit goes `Unknown -> Resolved` directly. Self-pairs are
/// always `NotApplicable`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Unknown,
    Pending,
    Resolved(Verdict),
    Error(ClientErrorKind),
    NotApplicable,
}

/// Semantic colour role of a glyph, mapped to the theme by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTone {
    Muted,
    Accent,
    Success,
    Warning,
    Error,
}

/// What an activation should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAction {
    /// Issue a request; the cell is now `Pending`.
    Fetch,
    /// Already resolved; show it.
    Show,
    /// Nothing to do (pending or self-pair).
    Ignore,
}

impl CellState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether moving the cursor onto this cell should refresh the detail pane.
    pub fn has_detail(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Error(_))
    }

    /// Transition for a user activation.
    pub fn activate(&mut self) -> CellAction {
        match self {
            Self::Unknown | Self::Error(_) => {
                *self = Self::Pending;
                CellAction::Fetch
            }
            Self::Resolved(_) => CellAction::Show,
            Self::Pending | Self::NotApplicable => CellAction::Ignore,
        }
    }

    /// Apply a successful result. Returns false if the cell wasn't waiting.
    pub fn resolve(&mut self, result: &AnalysisResult) -> bool {
        match self {
            Self::Pending | Self::Unknown => {
                *self = Self::Resolved(result.verdict());
                true
            }
            _ => false,
        }
    }

    /// Apply a failure. Returns false if the cell wasn't waiting.
    pub fn fail(&mut self, error: ClientErrorKind) -> bool {
        match self {
            Self::Pending => {
                *self = Self::Error(error);
                true
            }
            _ => false,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Unknown => "-",
            Self::Pending => "…",
            Self::Resolved(Verdict::Allowed) => "✓",
            Self::Resolved(Verdict::Blocked | Verdict::NoPolicy) => "✗",
            Self::Error(_) => "!",
            Self::NotApplicable => "·",
        }
    }

    pub fn tone(&self) -> CellTone {
        match self {
            Self::Unknown | Self::NotApplicable => CellTone::Muted,
            Self::Pending => CellTone::Accent,
            Self::Resolved(Verdict::Allowed) => CellTone::Success,
            Self::Resolved(Verdict::NoPolicy) => CellTone::Warning,
            Self::Resolved(Verdict::Blocked) | Self::Error(_) => CellTone::Error,
        }
    }

    /// Error cells are drawn bold.
    pub fn is_emphasized(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PolicyRef, PolicyType};

    #[test]
    fn test_fetch_lifecycle() {
        let mut cell = CellState::default();
        assert_eq!(cell.glyph(), "-");

        assert_eq!(cell.activate(), CellAction::Fetch);
        assert!(cell.is_pending());
        assert_eq!(cell.glyph(), "…");

        // a pending cell ignores further activations
        assert_eq!(cell.activate(), CellAction::Ignore);

        assert!(cell.resolve(&AnalysisResult::allowed(vec!["80".into()], vec![])));
        assert_eq!(cell, CellState::Resolved(Verdict::Allowed));
        assert_eq!(cell.glyph(), "✓");
        assert_eq!(cell.activate(), CellAction::Show);
    }

    #[test]
    fn test_error_then_retry() {
        let mut cell = CellState::Pending;
        assert!(cell.fail(ClientErrorKind::NetworkFailure("refused".into())));
        assert_eq!(cell.glyph(), "!");
        assert!(cell.is_emphasized());
        assert!(cell.has_detail());

        assert_eq!(cell.activate(), CellAction::Fetch);
        assert!(cell.is_pending());
    }

    #[test]
    fn test_unknown_and_no_policy_render_differently() {
        let unknown = CellState::Unknown;
        let no_policy = CellState::Resolved(AnalysisResult::blocked("none", vec![]).verdict());
        let blocked = CellState::Resolved(
            AnalysisResult::blocked("deny", vec![PolicyRef::new("deny", PolicyType::Block)])
                .verdict(),
        );

        assert_ne!(unknown.glyph(), no_policy.glyph());
        assert_eq!(no_policy.glyph(), blocked.glyph());
        assert_eq!(no_policy.tone(), CellTone::Warning);
        assert_eq!(blocked.tone(), CellTone::Error);
        assert!(!unknown.has_detail());
    }

    #[test]
    fn test_self_pair_is_inert() {
        let mut cell = CellState::NotApplicable;
        assert_eq!(cell.activate(), CellAction::Ignore);
        assert!(!cell.resolve(&AnalysisResult::allowed(vec![], vec![])));
        assert_eq!(cell.glyph(), "·");
    }

    #[test]
    fn test_late_failure_does_not_clobber_result() {
        let mut cell = CellState::Resolved(Verdict::Allowed);
        assert!(!cell.fail(ClientErrorKind::NetworkFailure("late".into())));
        assert_eq!(cell, CellState::Resolved(Verdict::Allowed));
    }
}
