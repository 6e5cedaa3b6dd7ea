//! **Interactive reachability matrix for Kubernetes network policies.**
//!
//! `netpol-matrix` shows which workloads of a cluster may talk to each other.
//! Rows are sources and columns are targets; each cell is analyzed on demand
//! by a backend service that evaluates the cluster's network policies, and
//! the verdict is cached for the rest of the session.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: [`ResourceCatalog`], [`PairKey`] and [`AnalysisResult`],
//!   plus the backend's JSON envelopes in `model::wire`.
//! - **[`matrix`]**: the headless matrix. Filtering, virtual scrolling, the
//!   pair cache, the cell state machine and the detail pane, all owned by
//!   [`MatrixView`] and testable without a terminal.
//! - **[`client`]**: the [`AnalysisSource`] trait, its blocking HTTP
//!   implementation, the background [`Dispatcher`] and the server-sent
//!   events [`PushListener`].
//! - **[`config`]**: YAML configuration with discovery, validation and CLI
//!   overrides.
//! - **[`tui`]**: the ratatui front end.
//! - **[`cli`]**: command handlers used by the binary.
//!
//! ## Driving the matrix without a terminal
//!
//! ```no_run
//! use netpol_matrix::client::{AnalysisSource, HttpAnalysisClient, HttpClientConfig};
//! use netpol_matrix::matrix::{CatalogBuild, MatrixSettings, MatrixView, LoadReason};
//! use netpol_matrix::model::ResourceType;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpAnalysisClient::new(HttpClientConfig::default())?;
//!     let mut view = MatrixView::new(ResourceType::Deployment, MatrixSettings::default());
//!
//!     let ticket = view.begin_load(ResourceType::Deployment, LoadReason::Initial);
//!     let graph = client.fetch_graph(ResourceType::Deployment)?;
//!     view.load_succeeded(ticket, graph);
//!     view.finish_build();
//!
//!     println!("{} workloads visible", view.summary().visible);
//!     Ok(())
//! }
//! ```

#![warn(clippy::unwrap_used)]
#![allow(
    // Layout math casts between usize and u16 throughout the TUI
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::struct_excessive_bools,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod matrix;
pub mod model;
pub mod tui;

pub use client::{AnalysisSource, Dispatcher, HttpAnalysisClient, PushListener};
pub use config::{AppConfig, ConfigError, ConfigOverrides, Validatable};
pub use error::{ClientErrorKind, ErrorContext, MatrixError, OptionContext, Result};
pub use matrix::{CellState, MatrixSettings, MatrixView, PairCache, VirtualScroller};
pub use model::{AnalysisResult, PairKey, ResourceCatalog, ResourceType};
