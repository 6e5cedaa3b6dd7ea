//! `namespaces` command.

use super::{build_client, print_json, OutputFormat, EXIT_OK};
use crate::client::AnalysisSource;
use crate::config::AppConfig;
use anyhow::{Context, Result};

pub fn run_namespaces(config: &AppConfig, format: OutputFormat) -> Result<i32> {
    let client = build_client(config)?;
    let namespaces = client.namespaces().context("failed to list namespaces")?;
    match format {
        OutputFormat::Json => print_json(&namespaces)?,
        OutputFormat::Text => {
            for ns in &namespaces {
                println!("{ns}");
            }
        }
    }
    Ok(EXIT_OK)
}
