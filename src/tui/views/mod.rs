//! Render functions for the matrix screen and its overlays.

mod detail;
mod grid;
mod header;
mod overlays;

pub use detail::render_detail;
pub use grid::{body_layout, render_grid, GridGeometry};
pub use header::{render_filter_bar, render_footer, render_header, render_status_line};
pub use overlays::{render_details, render_help, render_namespace_picker};
