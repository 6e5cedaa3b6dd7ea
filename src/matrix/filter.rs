//! Filter pipeline: catalog + filter state -> ordered visible list.

use crate::model::{Resource, ResourceCatalog};
use std::collections::BTreeSet;

/// Label prefixes treated as cluster-system workloads.
pub const DEFAULT_SYSTEM_PREFIXES: &[&str] = &[
    "kube-",
    "calico-",
    "coredns",
    "etcd-",
    "tigera-",
    "cilium",
    "metrics-server",
    "local-path-provisioner",
    "ingress-nginx-",
    "cert-manager",
    "gatekeeper-",
    "istio-",
    "linkerd-",
];

/// Case-insensitive label prefix matcher for system resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrefixes {
    prefixes: Vec<String>,
}

impl Default for SystemPrefixes {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PREFIXES.iter().copied())
    }
}

impl SystemPrefixes {
    pub fn new<S: AsRef<str>>(prefixes: impl IntoIterator<Item = S>) -> Self {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_system(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.prefixes.iter().any(|p| label.starts_with(p.as_str()))
    }
}

/// User-controlled filters. Mutated only by user actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_text: String,
    /// Empty means every namespace.
    pub selected_namespaces: BTreeSet<String>,
    pub show_system_resources: bool,
}

impl FilterState {
    /// Drop selected namespaces the catalog no longer has.
    ///
    /// Returns true when the selection changed.
    pub fn clamp_to(&mut self, catalog: &ResourceCatalog) -> bool {
        let before = self.selected_namespaces.len();
        self.selected_namespaces
            .retain(|ns| catalog.has_namespace(ns));
        before != self.selected_namespaces.len()
    }

    /// Add or remove one namespace. Namespaces the catalog doesn't know
    /// are refused.
    pub fn toggle_namespace(&mut self, catalog: &ResourceCatalog, namespace: &str) -> bool {
        if !catalog.has_namespace(namespace) {
            return false;
        }
        if !self.selected_namespaces.remove(namespace) {
            self.selected_namespaces.insert(namespace.to_string());
        }
        true
    }

    pub fn is_active(&self) -> bool {
        !self.search_text.is_empty()
            || !self.selected_namespaces.is_empty()
            || !self.show_system_resources
    }

    fn admits(&self, resource: &Resource, search_lower: &str, prefixes: &SystemPrefixes) -> bool {
        if !self.show_system_resources && prefixes.is_system(&resource.label) {
            return false;
        }
        if !search_lower.is_empty() && !resource.label.to_lowercase().contains(search_lower) {
            return false;
        }
        if !self.selected_namespaces.is_empty()
            && !self.selected_namespaces.contains(resource.namespace())
        {
            return false;
        }
        true
    }
}

/// Visible resources as catalog positions, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleList {
    indices: Vec<usize>,
}

impl VisibleList {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Catalog position of the visible row.
    pub fn catalog_index(&self, row: usize) -> Option<usize> {
        self.indices.get(row).copied()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn resource<'a>(&self, catalog: &'a ResourceCatalog, row: usize) -> Option<&'a Resource> {
        self.catalog_index(row).and_then(|i| catalog.get_index(i))
    }

    pub fn resources<'a>(
        &'a self,
        catalog: &'a ResourceCatalog,
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        self.indices.iter().filter_map(|&i| catalog.get_index(i))
    }

    /// Row position of a resource id, if visible.
    pub fn position_of(&self, catalog: &ResourceCatalog, id: &str) -> Option<usize> {
        self.resources(catalog).position(|r| r.id == id)
    }
}

/// Apply every filter to the catalog. Pure and deterministic.
pub fn compute_visible(
    catalog: &ResourceCatalog,
    filters: &FilterState,
    prefixes: &SystemPrefixes,
) -> VisibleList {
    let search_lower = filters.search_text.to_lowercase();
    let indices = catalog
        .iter()
        .enumerate()
        .filter(|(_, r)| filters.admits(r, &search_lower, prefixes))
        .map(|(i, _)| i)
        .collect();
    VisibleList { indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResourceGroup, ResourceType};

    fn catalog() -> ResourceCatalog {
        let rows = [
            ("default/web", "web"),
            ("kube-system/kube-proxy", "kube-proxy"),
            ("default/api", "api"),
            ("team-b/Web-Admin", "Web-Admin"),
            ("kube-system/coredns", "coredns"),
        ];
        ResourceCatalog::from_resources(
            ResourceType::Deployment,
            rows.iter()
                .map(|(id, label)| Resource::new(*id, *label, ResourceGroup::Deployment)),
        )
    }

    fn labels(catalog: &ResourceCatalog, visible: &VisibleList) -> Vec<String> {
        visible
            .resources(catalog)
            .map(|r| r.label.clone())
            .collect()
    }

    #[test]
    fn test_system_resources_hidden_by_default() {
        let catalog = catalog();
        let visible = compute_visible(&catalog, &FilterState::default(), &SystemPrefixes::default());
        assert_eq!(labels(&catalog, &visible), vec!["web", "api", "Web-Admin"]);
    }

    #[test]
    fn test_show_system_resources() {
        let catalog = catalog();
        let filters = FilterState {
            show_system_resources: true,
            ..FilterState::default()
        };
        let visible = compute_visible(&catalog, &filters, &SystemPrefixes::default());
        assert_eq!(visible.len(), 5);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let catalog = catalog();
        let filters = FilterState {
            search_text: "WEB".into(),
            ..FilterState::default()
        };
        let visible = compute_visible(&catalog, &filters, &SystemPrefixes::default());
        assert_eq!(labels(&catalog, &visible), vec!["web", "Web-Admin"]);
    }

    #[test]
    fn test_empty_namespace_selection_means_all() {
        let catalog = catalog();
        let all = compute_visible(&catalog, &FilterState::default(), &SystemPrefixes::default());
        let filters = FilterState {
            selected_namespaces: ["default".to_string()].into_iter().collect(),
            ..FilterState::default()
        };
        let only_default = compute_visible(&catalog, &filters, &SystemPrefixes::default());
        assert_eq!(all.len(), 3);
        assert_eq!(labels(&catalog, &only_default), vec!["web", "api"]);
    }

    #[test]
    fn test_filters_compose_as_conjunction() {
        let catalog = catalog();
        let filters = FilterState {
            search_text: "web".into(),
            selected_namespaces: ["team-b".to_string()].into_iter().collect(),
            show_system_resources: false,
        };
        let visible = compute_visible(&catalog, &filters, &SystemPrefixes::default());
        assert_eq!(labels(&catalog, &visible), vec!["Web-Admin"]);
        assert_eq!(visible.position_of(&catalog, "team-b/Web-Admin"), Some(0));
    }

    #[test]
    fn test_custom_prefixes() {
        let catalog = catalog();
        let prefixes = SystemPrefixes::new(["WEB"]);
        let visible = compute_visible(&catalog, &FilterState::default(), &prefixes);
        assert_eq!(
            labels(&catalog, &visible),
            vec!["kube-proxy", "api", "coredns"]
        );
    }

    #[test]
    fn test_clamp_and_toggle_namespaces() {
        let catalog = catalog();
        let mut filters = FilterState::default();
        assert!(filters.toggle_namespace(&catalog, "team-b"));
        assert!(!filters.toggle_namespace(&catalog, "nowhere"));
        filters.selected_namespaces.insert("gone".into());

        assert!(filters.clamp_to(&catalog));
        assert_eq!(
            filters.selected_namespaces.iter().collect::<Vec<_>>(),
            vec!["team-b"]
        );
        assert!(!filters.clamp_to(&catalog));

        assert!(filters.toggle_namespace(&catalog, "team-b"));
        assert!(filters.selected_namespaces.is_empty());
    }
}
