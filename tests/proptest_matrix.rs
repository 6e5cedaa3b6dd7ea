//! Property-based tests for the filter pipeline and the virtual scroller.

use netpol_matrix::matrix::{compute_visible, FilterState, SystemPrefixes, VirtualScroller};
use netpol_matrix::model::{Resource, ResourceCatalog, ResourceGroup, ResourceType};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn catalog(labels: &[(u8, String)]) -> ResourceCatalog {
    ResourceCatalog::from_resources(
        ResourceType::Deployment,
        labels.iter().enumerate().map(|(i, (ns, label))| {
            Resource::new(
                format!("ns-{ns}/{label}-{i}"),
                label.clone(),
                ResourceGroup::Deployment,
            )
        }),
    )
}

fn resources() -> impl Strategy<Value = Vec<(u8, String)>> {
    prop::collection::vec((0u8..4, "(kube-)?[a-z]{1,8}"), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn filter_output_is_subsequence_of_catalog(
        rows in resources(),
        search in "[a-z]{0,2}",
        namespaces in prop::collection::btree_set(0u8..4, 0..4),
        show_system in any::<bool>(),
    ) {
        let catalog = catalog(&rows);
        let filters = FilterState {
            search_text: search.clone(),
            selected_namespaces: namespaces.iter().map(|n| format!("ns-{n}")).collect::<BTreeSet<_>>(),
            show_system_resources: show_system,
        };
        let visible = compute_visible(&catalog, &filters, &SystemPrefixes::default());

        prop_assert!(visible.indices().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(visible.len() <= catalog.len());
        for resource in visible.resources(&catalog) {
            prop_assert!(resource.label.contains(search.as_str()));
            if !show_system {
                prop_assert!(!resource.label.starts_with("kube-"));
            }
        }

        // Pure: same inputs, same output.
        prop_assert_eq!(visible, compute_visible(&catalog, &filters, &SystemPrefixes::default()));
    }

    #[test]
    fn reconcile_is_idempotent(
        len in 0usize..500,
        row_height in 1usize..4,
        viewport in 0usize..80,
        scroll in -600isize..600,
    ) {
        let mut scroller = VirtualScroller::new(row_height);
        scroller.set_viewport_height(viewport, len);
        scroller.scroll_rows(scroll, len);
        scroller.reconcile(len);

        let mounted = scroller.mounted().clone();
        prop_assert!(scroller.reconcile(len).is_noop());
        prop_assert_eq!(scroller.mounted(), &mounted);
        prop_assert!(mounted.iter().all(|row| *row < len.max(1)));
        prop_assert_eq!(mounted.len(), scroller.window().len());
    }

    #[test]
    fn empty_namespace_selection_equals_all_selected(
        rows in resources(),
        search in "[a-z]{0,2}",
        show_system in any::<bool>(),
    ) {
        let catalog = catalog(&rows);
        let none = FilterState {
            search_text: search.clone(),
            selected_namespaces: BTreeSet::new(),
            show_system_resources: show_system,
        };
        let all = FilterState {
            selected_namespaces: catalog.namespaces().map(str::to_string).collect(),
            ..none.clone()
        };
        let prefixes = SystemPrefixes::default();
        prop_assert_eq!(
            compute_visible(&catalog, &none, &prefixes),
            compute_visible(&catalog, &all, &prefixes)
        );
    }

    #[test]
    fn mounted_rows_stay_bounded_across_scrolls_and_reloads(
        row_height in 1usize..4,
        viewport in 0usize..60,
        steps in prop::collection::vec((0usize..2000, -300isize..300, any::<bool>()), 1..20),
    ) {
        let bound = viewport.div_ceil(row_height) + 1;
        let mut scroller = VirtualScroller::new(row_height);
        let mut len = 0;
        scroller.set_viewport_height(viewport, len);
        for (next_len, scroll, reload) in steps {
            len = next_len;
            if reload {
                scroller.reset(len);
            } else {
                scroller.scroll_rows(scroll, len);
                scroller.reconcile(len);
            }
            prop_assert!(scroller.mounted().len() <= bound);
            prop_assert!(scroller.mounted().len() <= len);
        }
    }
}
