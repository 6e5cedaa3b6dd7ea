//! UI state that is not part of the matrix itself: search bar, overlays,
//! pickers and the status line.

mod details;
mod overlay;
mod picker;
mod search;
mod status;

pub use details::{DetailsPanel, DetailsSubject};
pub use overlay::{OverlayKind, OverlayState};
pub use picker::NamespacePicker;
pub use search::SearchBar;
pub use status::{StatusLevel, StatusMessage};
