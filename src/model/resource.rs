//! Resources, resource groups and the per-type catalog.

use clap::ValueEnum;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The resource-type context a catalog and its analyses are built for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Deployments (default)
    #[default]
    Deployment,
    /// Individual pods
    Pod,
}

impl ResourceType {
    /// Wire name used in query strings and push event names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::Pod => "pod",
        }
    }

    /// The other resource type, for the TUI toggle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Deployment => Self::Pod,
            Self::Pod => Self::Deployment,
        }
    }

    /// All resource types in display order.
    pub const fn all() -> [Self; 2] {
        [Self::Deployment, Self::Pod]
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deployment" | "deployments" => Ok(Self::Deployment),
            "pod" | "pods" => Ok(Self::Pod),
            other => Err(format!(
                "invalid resource type '{other}' (expected 'deployment' or 'pod')"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Kind of node the backend reports in its graph payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceGroup {
    Deployment,
    Pod,
    Policy,
    IpBlock,
    Other(String),
}

impl ResourceGroup {
    /// Map a wire group name; unknown names are kept verbatim.
    pub fn from_wire(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "deployment" => Self::Deployment,
            "pod" => Self::Pod,
            "policy" => Self::Policy,
            "ipblock" => Self::IpBlock,
            _ => Self::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Deployment => "deployment",
            Self::Pod => "pod",
            Self::Policy => "policy",
            Self::IpBlock => "ipblock",
            Self::Other(name) => name,
        }
    }

    /// Whether nodes of this group become matrix rows and columns.
    pub const fn is_workload(&self) -> bool {
        matches!(self, Self::Deployment | Self::Pod)
    }
}

impl From<ResourceType> for ResourceGroup {
    fn from(rt: ResourceType) -> Self {
        match rt {
            ResourceType::Deployment => Self::Deployment,
            ResourceType::Pod => Self::Pod,
        }
    }
}

impl fmt::Display for ResourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An addressable workload. Identity is `id`; `label` is display-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub label: String,
    pub group: ResourceGroup,
}

impl Resource {
    pub fn new(id: impl Into<String>, label: impl Into<String>, group: ResourceGroup) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            group,
        }
    }

    /// Namespace segment of the id.
    pub fn namespace(&self) -> &str {
        namespace_of(&self.id)
    }

    /// Name segment of the id (everything after the first `/`).
    pub fn name(&self) -> &str {
        self.id.split_once('/').map_or(self.id.as_str(), |(_, n)| n)
    }
}

/// Segment before the first `/`; an id without one is its own namespace.
pub fn namespace_of(id: &str) -> &str {
    id.split_once('/').map_or(id, |(ns, _)| ns)
}

/// The current set of addressable resources for one resource type.
///
/// Keeps backend order; lookups by id are O(1).
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    resource_type: ResourceType,
    resources: IndexMap<String, Resource>,
    namespaces: BTreeSet<String>,
}

impl ResourceCatalog {
    /// An empty catalog for a resource type.
    pub fn empty(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            ..Self::default()
        }
    }

    /// Build from resources in display order. A duplicate id keeps its
    /// first position and takes the later label.
    pub fn from_resources(
        resource_type: ResourceType,
        resources: impl IntoIterator<Item = Resource>,
    ) -> Self {
        let mut catalog = Self::empty(resource_type);
        for resource in resources {
            catalog.insert(resource);
        }
        catalog
    }

    pub(crate) fn insert(&mut self, resource: Resource) {
        self.namespaces.insert(resource.namespace().to_string());
        self.resources.insert(resource.id.clone(), resource);
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn get_index(&self, index: usize) -> Option<&Resource> {
        self.resources.get_index(index).map(|(_, r)| r)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resources.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Sorted, de-duplicated namespaces present in the catalog.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(String::as_str)
    }

    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    /// `label (id)` for known resources, the raw id otherwise.
    pub fn display_name(&self, id: &str) -> String {
        match self.get(id) {
            Some(r) if r.label != r.id => format!("{} ({})", r.label, r.id),
            _ => id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployment(id: &str) -> Resource {
        let label = id.rsplit('/').next().unwrap_or(id);
        Resource::new(id, label, ResourceGroup::Deployment)
    }

    #[test]
    fn test_resource_type_parse() {
        assert_eq!("Pod".parse::<ResourceType>(), Ok(ResourceType::Pod));
        assert_eq!(
            " DEPLOYMENT ".parse::<ResourceType>(),
            Ok(ResourceType::Deployment)
        );
        assert!("service".parse::<ResourceType>().is_err());
        assert_eq!(ResourceType::Pod.toggled(), ResourceType::Deployment);
    }

    #[test]
    fn test_resource_type_serde() {
        let rt: ResourceType = serde_json::from_str("\"POD\"").expect("parse");
        assert_eq!(rt, ResourceType::Pod);
        assert_eq!(
            serde_json::to_string(&ResourceType::Deployment).expect("ser"),
            "\"deployment\""
        );
        assert!(serde_json::from_str::<ResourceType>("\"job\"").is_err());
    }

    #[test]
    fn test_group_from_wire() {
        assert_eq!(ResourceGroup::from_wire("ipBlock"), ResourceGroup::IpBlock);
        assert!(ResourceGroup::from_wire("pod").is_workload());
        assert!(!ResourceGroup::from_wire("policy").is_workload());
        assert_eq!(
            ResourceGroup::from_wire("service"),
            ResourceGroup::Other("service".into())
        );
    }

    #[test]
    fn test_namespace_and_name() {
        let r = deployment("team-a/web");
        assert_eq!(r.namespace(), "team-a");
        assert_eq!(r.name(), "web");
        assert_eq!(namespace_of("loose"), "loose");
        assert_eq!(namespace_of("ns/policy/ipBlock"), "ns");
    }

    #[test]
    fn test_catalog_keeps_order_and_namespaces() {
        let catalog = ResourceCatalog::from_resources(
            ResourceType::Deployment,
            vec![
                deployment("b/web"),
                deployment("a/db"),
                deployment("b/cache"),
            ],
        );
        let ids: Vec<_> = catalog.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b/web", "a/db", "b/cache"]);
        assert_eq!(catalog.namespaces().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(catalog.get_index(1).map(|r| r.id.as_str()), Some("a/db"));
    }

    #[test]
    fn test_display_name() {
        let catalog =
            ResourceCatalog::from_resources(ResourceType::Pod, vec![deployment("default/web")]);
        assert_eq!(catalog.display_name("default/web"), "web (default/web)");
        assert_eq!(catalog.display_name("default/gone"), "default/gone");
    }
}
