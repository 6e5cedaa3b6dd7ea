//! Client-side matrix engine.
//!
//! Control flow for one interaction: user input updates the
//! [`FilterState`], [`compute_visible`] produces the [`VisibleList`], the
//! [`VirtualScroller`] reconciles which rows are mounted, and activating
//! a cell consults the [`PairCache`] before a fetch is issued. The
//! [`MatrixView`] owns all of it.

mod cache;
mod cell;
mod chunked;
pub mod detail;
mod filter;
mod scroller;
mod view;

pub use cache::{CacheStats, PairCache};
pub use cell::{CellAction, CellState, CellTone};
pub use chunked::{BuildStep, CatalogBuild, ChunkedTask, TaskProgress};
pub use detail::{DetailLine, DetailPane, DetailView};
pub use filter::{compute_visible, FilterState, SystemPrefixes, VisibleList, DEFAULT_SYSTEM_PREFIXES};
pub use scroller::{compute_window, Reconciliation, RenderWindow, VirtualScroller};
pub use view::{
    Activation, Completion, FetchTicket, LoadReason, LoadState, LoadTicket, MatrixSettings,
    MatrixSummary, MatrixView,
};
