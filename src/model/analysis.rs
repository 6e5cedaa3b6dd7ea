//! Pairwise analysis results and the key they are cached under.

use super::resource::ResourceType;
use super::wire::AnalysisPayload;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port entry the backend uses for "no port restriction".
pub const ALL_PORTS: &str = "all ports";

/// Composite cache key for one directed pair in one resource-type context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub source: String,
    pub target: String,
    pub resource_type: ResourceType,
}

impl PairKey {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        resource_type: ResourceType,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            resource_type,
        }
    }

    /// A resource paired with itself.
    pub fn is_self_pair(&self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}]", self.source, self.target, self.resource_type)
    }
}

/// Whether a policy admits or denies the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    Allow,
    Block,
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::Block => f.write_str("block"),
        }
    }
}

/// A policy named in an analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRef {
    pub name: String,
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
}

impl PolicyRef {
    pub fn new(name: impl Into<String>, policy_type: PolicyType) -> Self {
        Self {
            name: name.into(),
            policy_type,
        }
    }
}

/// Three-way verdict derived from a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Blocked,
    /// Not allowed and no policy names the pair.
    NoPolicy,
}

/// The backend's answer for one pair.
///
/// `ports` never contains the "all ports" marker: an empty list means
/// the pair is not restricted to particular ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AnalysisPayload")]
pub struct AnalysisResult {
    pub allowed: bool,
    pub ports: Vec<String>,
    pub policies: Vec<PolicyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AnalysisResult {
    pub fn allowed(ports: Vec<String>, policies: Vec<PolicyRef>) -> Self {
        Self {
            allowed: true,
            ports,
            policies,
            reason: None,
        }
    }

    pub fn blocked(reason: impl Into<String>, policies: Vec<PolicyRef>) -> Self {
        Self {
            allowed: false,
            ports: Vec::new(),
            policies,
            reason: Some(reason.into()),
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.allowed {
            Verdict::Allowed
        } else if self.policies.is_empty() {
            Verdict::NoPolicy
        } else {
            Verdict::Blocked
        }
    }

    /// Policies of one type, in backend order.
    pub fn policies_of(&self, policy_type: PolicyType) -> impl Iterator<Item = &PolicyRef> {
        self.policies
            .iter()
            .filter(move |p| p.policy_type == policy_type)
    }

    /// `80, 443`, or `None` when unrestricted.
    pub fn port_summary(&self) -> Option<String> {
        if self.ports.is_empty() {
            None
        } else {
            Some(self.ports.join(", "))
        }
    }
}

impl From<AnalysisPayload> for AnalysisResult {
    fn from(raw: AnalysisPayload) -> Self {
        let ports = raw
            .ports
            .into_iter()
            .filter(|p| !p.trim().eq_ignore_ascii_case(ALL_PORTS))
            .collect();

        let policies = match raw.policies {
            Some(policies) => policies,
            None => {
                let folded = if raw.allowed {
                    PolicyType::Allow
                } else {
                    PolicyType::Block
                };
                let mut names: Vec<String> = Vec::new();
                for name in raw.ingress_policies.into_iter().chain(raw.egress_policies) {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                names
                    .into_iter()
                    .map(|name| PolicyRef::new(name, folded))
                    .collect()
            }
        };

        Self {
            allowed: raw.allowed,
            ports,
            policies,
            reason: raw.reason.filter(|r| !r.is_empty()),
        }
    }
}
