//! JSON envelopes exchanged with the reachability backend.

use super::analysis::PolicyRef;
use super::resource::{Resource, ResourceGroup};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /data` body and the payload of `update_{type}` push events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    /// Required: a body without `nodes` is not a graph.
    pub nodes: Vec<NodeEnvelope>,
    #[serde(default)]
    pub edges: Vec<EdgeEnvelope>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEnvelope {
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

impl NodeData {
    pub fn group(&self) -> ResourceGroup {
        ResourceGroup::from_wire(self.group.as_deref().unwrap_or_default())
    }

    /// Convert to a catalog resource; the label falls back to the id.
    pub fn to_resource(&self) -> Resource {
        let label = self
            .label
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.id.clone());
        Resource::new(self.id.clone(), label, self.group())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEnvelope {
    pub data: EdgeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Raw `GET /check-communication` body before normalization.
///
/// Accepts both the structured `policies` list and the older
/// `ingress_policies` / `egress_policies` name lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisPayload {
    pub allowed: bool,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub policies: Option<Vec<PolicyRef>>,
    #[serde(default)]
    pub ingress_policies: Vec<String>,
    #[serde(default)]
    pub egress_policies: Vec<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `GET /namespaces` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacesResponse {
    #[serde(default)]
    pub namespaces: Vec<String>,
}

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `GET /policy/{name}` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDetails {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub ingress: Vec<Value>,
    #[serde(default)]
    pub egress: Vec<Value>,
}

impl PolicyDetails {
    /// Ingress and egress rule lists with their headings.
    pub fn rule_sections(&self) -> [(&'static str, &[Value]); 2] {
        [("Ingress rules", &self.ingress), ("Egress rules", &self.egress)]
    }
}

/// A rule as indented JSON, one output line per entry.
pub fn pretty_rule(rule: &Value) -> Vec<String> {
    serde_json::to_string_pretty(rule)
        .unwrap_or_else(|_| rule.to_string())
        .lines()
        .map(str::to_string)
        .collect()
}

/// `GET /resource/{group}/{namespace}/{name}` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceDetails {
    Pod(PodDetails),
    Deployment(DeploymentDetails),
}

impl ResourceDetails {
    pub fn name(&self) -> &str {
        match self {
            Self::Pod(p) => &p.name,
            Self::Deployment(d) => &d.name,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Pod(p) => &p.namespace,
            Self::Deployment(d) => &d.namespace,
        }
    }

    pub fn labels(&self) -> &IndexMap<String, String> {
        match self {
            Self::Pod(p) => &p.labels,
            Self::Deployment(d) => &d.labels,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = match self {
            Self::Pod(p) => p.created_at.as_deref(),
            Self::Deployment(d) => d.created_at.as_deref(),
        };
        raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// `key: value` lines for a details popup, most relevant first.
    pub fn summary_lines(&self) -> Vec<(String, String)> {
        let mut lines = vec![
            ("Name".to_string(), self.name().to_string()),
            ("Namespace".to_string(), self.namespace().to_string()),
        ];
        match self {
            Self::Pod(p) => {
                lines.push(("Status".into(), p.status.clone()));
                lines.push(("Node".into(), p.node.clone()));
                lines.push(("IP".into(), p.ip.clone()));
                for c in &p.containers {
                    let ready = if c.ready { "ready" } else { "not ready" };
                    lines.push((
                        format!("Container {}", c.name),
                        format!("{} ({ready})", c.image),
                    ));
                }
            }
            Self::Deployment(d) => {
                lines.push(("Available".into(), scalar_text(&d.status)));
                lines.push(("Replicas".into(), d.replicas.to_string()));
                if let Some(kind) = d.strategy.get("type").and_then(Value::as_str) {
                    lines.push(("Strategy".into(), kind.to_string()));
                }
            }
        }
        for (key, value) in self.labels() {
            lines.push((format!("Label {key}"), value.clone()));
        }
        if let Some(created) = self.created_at() {
            lines.push((
                "Created".into(),
                created.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ));
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodDetails {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub labels: IndexMap<String, String>,
    #[serde(default)]
    pub status: String,
    pub node: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentDetails {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub labels: IndexMap<String, String>,
    /// Available replicas, or the string "Unknown".
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub replicas: u32,
    #[serde(default)]
    pub strategy: Value,
    #[serde(default)]
    pub selector: Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "Unknown".to_string(),
        other => other.to_string(),
    }
}
