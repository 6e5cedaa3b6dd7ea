//! CLI command handlers.
//!
//! Each handler takes the merged [`AppConfig`] and returns the process exit
//! code, so `main.rs` only parses flags and dispatches.

mod check;
mod describe;
mod matrix;
mod namespaces;

pub use check::{run_check, CheckReport};
pub use describe::{run_describe_policy, run_describe_resource};
pub use matrix::run_matrix;
pub use namespaces::run_namespaces;

use crate::client::HttpAnalysisClient;
use crate::config::AppConfig;
use anyhow::{Context, Result};
use clap::ValueEnum;

/// Exit code: success (and "allowed" for `check`).
pub const EXIT_OK: i32 = 0;
/// Exit code: `check` found the pair blocked.
pub const EXIT_BLOCKED: i32 = 1;
/// Exit code: any error.
pub const EXIT_ERROR: i32 = 3;

/// Output format of the one-shot commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// HTTP client for the configured backend.
pub fn build_client(config: &AppConfig) -> Result<HttpAnalysisClient> {
    HttpAnalysisClient::new(config.server.client_config())
        .with_context(|| format!("invalid server URL '{}'", config.server.url))
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
