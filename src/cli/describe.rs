//! `describe` command: one policy or one workload.

use super::{build_client, print_json, OutputFormat, EXIT_OK};
use crate::client::AnalysisSource;
use crate::config::AppConfig;
use crate::model::wire::{pretty_rule, PolicyDetails, ResourceDetails};
use crate::model::ResourceType;
use anyhow::{Context, Result};
use std::fmt::Write as _;

pub fn run_describe_policy(config: &AppConfig, name: &str, format: OutputFormat) -> Result<i32> {
    let client = build_client(config)?;
    let policy = client
        .policy(name)
        .with_context(|| format!("failed to fetch policy '{name}'"))?;
    match format {
        OutputFormat::Json => print_json(&policy)?,
        OutputFormat::Text => print!("{}", policy_text(&policy)),
    }
    Ok(EXIT_OK)
}

pub fn run_describe_resource(
    config: &AppConfig,
    resource_type: ResourceType,
    id: &str,
    format: OutputFormat,
) -> Result<i32> {
    if !id.contains('/') {
        anyhow::bail!("resource id must be namespace/name, got '{id}'");
    }
    let client = build_client(config)?;
    let details = client
        .resource(resource_type, id)
        .with_context(|| format!("failed to fetch {resource_type} '{id}'"))?;
    match format {
        OutputFormat::Json => print_json(&details)?,
        OutputFormat::Text => print!("{}", resource_text(&details)),
    }
    Ok(EXIT_OK)
}

fn policy_text(policy: &PolicyDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name: {}", policy.name);
    let _ = writeln!(out, "Namespace: {}", policy.namespace);
    for (title, rules) in policy.rule_sections() {
        let _ = writeln!(out, "{title}: {}", rules.len());
        for rule in rules {
            for line in pretty_rule(rule) {
                let _ = writeln!(out, "  {line}");
            }
        }
    }
    out
}

fn resource_text(details: &ResourceDetails) -> String {
    let mut out = String::new();
    for (label, value) in details.summary_lines() {
        let _ = writeln!(out, "{label}: {value}");
    }
    out
}
