//! Interactive terminal UI for the reachability matrix, built on ratatui.
//!
//! [`App`] owns the [`crate::matrix::MatrixView`] plus UI-only state
//! (search bar, overlays, theme). [`run_tui`] sets up the terminal, then
//! alternates between drawing a frame, handling one input event and
//! applying background results.

mod app;
mod events;
pub mod state;
pub mod theme;
mod ui;
pub mod viewmodel;
mod views;
mod widgets;

pub use app::App;
pub use state::ListNavigation;
pub use theme::{ColorScheme, Theme};
pub use ui::run_tui;
