//! `check` command: analyze one pair without the TUI.

use super::{build_client, print_json, OutputFormat, EXIT_BLOCKED, EXIT_OK};
use crate::client::AnalysisSource;
use crate::config::AppConfig;
use crate::matrix::{detail, CatalogBuild};
use crate::model::{AnalysisResult, PairKey, ResourceCatalog, ResourceType, Verdict};
use anyhow::{Context, Result};
use serde::Serialize;

/// JSON shape of a `check` result.
#[derive(Debug, Serialize)]
pub struct CheckReport<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub resource_type: ResourceType,
    pub verdict: &'static str,
    #[serde(flatten)]
    pub result: &'a AnalysisResult,
}

impl<'a> CheckReport<'a> {
    pub fn new(key: &'a PairKey, result: &'a AnalysisResult) -> Self {
        Self {
            source: &key.source,
            target: &key.target,
            resource_type: key.resource_type,
            verdict: verdict_name(result.verdict()),
            result,
        }
    }
}

const fn verdict_name(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Allowed => "allowed",
        Verdict::Blocked => "blocked",
        Verdict::NoPolicy => "no-policy",
    }
}

/// Exit code for a verdict: 0 allowed, 1 blocked.
pub const fn exit_code(result: &AnalysisResult) -> i32 {
    if result.allowed {
        EXIT_OK
    } else {
        EXIT_BLOCKED
    }
}

/// Catalog for display names; an unreachable graph only costs the labels.
fn display_catalog(source: &dyn AnalysisSource, resource_type: ResourceType) -> ResourceCatalog {
    match source.fetch_graph(resource_type) {
        Ok(payload) => CatalogBuild::new(resource_type, payload, usize::MAX).finish(),
        Err(e) => {
            tracing::debug!("graph unavailable, showing raw ids: {e}");
            ResourceCatalog::empty(resource_type)
        }
    }
}

pub fn run_check(
    config: &AppConfig,
    source: &str,
    target: &str,
    resource_type: ResourceType,
    format: OutputFormat,
) -> Result<i32> {
    let client = build_client(config)?;
    let key = PairKey::new(source, target, resource_type);
    if key.is_self_pair() {
        anyhow::bail!("source and target are the same resource: {source}");
    }

    tracing::debug!(pair = %key, "checking communication");
    let result = client
        .check_communication(&key)
        .with_context(|| format!("failed to analyze {key}"))?;

    match format {
        OutputFormat::Json => print_json(&CheckReport::new(&key, &result))?,
        OutputFormat::Text => {
            let catalog = display_catalog(&client, resource_type);
            print!("{}", detail::render(&catalog, &key, Ok(&result)).to_plain_text());
        }
    }
    Ok(exit_code(&result))
}
