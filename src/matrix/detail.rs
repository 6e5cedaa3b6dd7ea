//! Detail pane: structured text for the last selected pair.

use super::cell::CellTone;
use crate::error::ClientErrorKind;
use crate::model::{AnalysisResult, PairKey, PolicyType, ResourceCatalog, Verdict};
use std::fmt::Write as _;

/// One `label: value` line of the detail pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub label: Option<&'static str>,
    pub value: String,
    pub tone: Option<CellTone>,
}

impl DetailLine {
    fn field(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label: Some(label),
            value: value.into(),
            tone: None,
        }
    }

    fn toned(label: &'static str, value: impl Into<String>, tone: CellTone) -> Self {
        Self {
            label: Some(label),
            value: value.into(),
            tone: Some(tone),
        }
    }

    fn item(value: impl Into<String>) -> Self {
        Self {
            label: None,
            value: value.into(),
            tone: None,
        }
    }
}

/// Rendered detail pane content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub key: PairKey,
    pub title: String,
    pub lines: Vec<DetailLine>,
}

impl DetailView {
    /// Plain text, one line per entry, for the CLI.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        for line in &self.lines {
            match line.label {
                Some(label) => {
                    let _ = writeln!(out, "{label}: {}", line.value);
                }
                None => {
                    let _ = writeln!(out, "  - {}", line.value);
                }
            }
        }
        out
    }
}

/// Project a pair's outcome into detail text. Pure.
pub fn render(
    catalog: &ResourceCatalog,
    key: &PairKey,
    outcome: Result<&AnalysisResult, &ClientErrorKind>,
) -> DetailView {
    let mut lines = vec![
        DetailLine::field("Source", catalog.display_name(&key.source)),
        DetailLine::field("Target", catalog.display_name(&key.target)),
        DetailLine::field("Type", key.resource_type.as_str()),
    ];

    let title = match outcome {
        Ok(result) => {
            render_result(result, &mut lines);
            match result.verdict() {
                Verdict::Allowed => "Communication allowed",
                Verdict::Blocked => "Communication blocked",
                Verdict::NoPolicy => "Communication blocked (no policy)",
            }
        }
        Err(error) => {
            lines.push(DetailLine::toned("Error", error.to_string(), CellTone::Error));
            "Analysis failed"
        }
    };

    DetailView {
        key: key.clone(),
        title: title.to_string(),
        lines,
    }
}

fn render_result(result: &AnalysisResult, lines: &mut Vec<DetailLine>) {
    match result.verdict() {
        Verdict::Allowed => {
            lines.push(DetailLine::toned("Status", "Allowed", CellTone::Success));
            lines.push(DetailLine::field(
                "Ports",
                result.port_summary().unwrap_or_else(|| "All ports".to_string()),
            ));
            push_policies(lines, "Allowing policies", result, PolicyType::Allow);
        }
        Verdict::Blocked | Verdict::NoPolicy => {
            let tone = if result.verdict() == Verdict::NoPolicy {
                CellTone::Warning
            } else {
                CellTone::Error
            };
            lines.push(DetailLine::toned("Status", "Blocked", tone));
            if let Some(reason) = &result.reason {
                lines.push(DetailLine::field("Reason", reason.clone()));
            }
            push_policies(lines, "Blocking policies", result, PolicyType::Block);
        }
    }
}

fn push_policies(
    lines: &mut Vec<DetailLine>,
    heading: &'static str,
    result: &AnalysisResult,
    policy_type: PolicyType,
) {
    let names: Vec<&str> = result
        .policies_of(policy_type)
        .map(|p| p.name.as_str())
        .collect();
    if names.is_empty() {
        lines.push(DetailLine::field(heading, "none"));
    } else {
        lines.push(DetailLine::field(heading, names.len().to_string()));
        lines.extend(names.into_iter().map(DetailLine::item));
    }
}

/// Holds the detail of the most recently selected pair.
#[derive(Debug, Clone, Default)]
pub struct DetailPane {
    view: Option<DetailView>,
}

impl DetailPane {
    pub fn show(&mut self, view: DetailView) {
        self.view = Some(view);
    }

    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn view(&self) -> Option<&DetailView> {
        self.view.as_ref()
    }

    /// Pair currently shown, if any.
    pub fn shown_pair(&self) -> Option<&PairKey> {
        self.view.as_ref().map(|v| &v.key)
    }
}
