//! Benchmarks for filtering, window reconciliation and catalog builds.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use netpol_matrix::matrix::{
    compute_visible, CatalogBuild, FilterState, LoadReason, MatrixSettings, MatrixView,
    SystemPrefixes, VirtualScroller,
};
use netpol_matrix::model::wire::{GraphPayload, NodeData, NodeEnvelope};
use netpol_matrix::model::{Resource, ResourceCatalog, ResourceGroup, ResourceType};
use std::hint::black_box;

const NAMESPACES: &[&str] = &["default", "payments", "kube-system", "monitoring"];

fn label(i: usize) -> String {
    if i % 10 == 0 {
        format!("kube-proxy-{i}")
    } else {
        format!("service-{i:04}")
    }
}

fn catalog(n: usize) -> ResourceCatalog {
    ResourceCatalog::from_resources(
        ResourceType::Deployment,
        (0..n).map(|i| {
            let ns = NAMESPACES[i % NAMESPACES.len()];
            Resource::new(format!("{ns}/{}", label(i)), label(i), ResourceGroup::Deployment)
        }),
    )
}

fn payload(n: usize) -> GraphPayload {
    GraphPayload {
        nodes: (0..n)
            .map(|i| NodeEnvelope {
                data: NodeData {
                    id: format!("{}/{}", NAMESPACES[i % NAMESPACES.len()], label(i)),
                    label: Some(label(i)),
                    group: Some("deployment".into()),
                },
            })
            .collect(),
        edges: Vec::new(),
    }
}

fn bench_filter(c: &mut Criterion) {
    let catalog = catalog(1000);
    let prefixes = SystemPrefixes::default();
    let mut group = c.benchmark_group("filter");

    let cases = [
        ("default", FilterState::default()),
        (
            "search",
            FilterState {
                search_text: "service-01".into(),
                ..FilterState::default()
            },
        ),
        (
            "namespaces",
            FilterState {
                selected_namespaces: ["default".to_string(), "payments".to_string()]
                    .into_iter()
                    .collect(),
                ..FilterState::default()
            },
        ),
    ];
    for (name, filters) in &cases {
        group.bench_with_input(BenchmarkId::new("compute_visible", name), filters, |b, f| {
            b.iter(|| compute_visible(black_box(&catalog), black_box(f), &prefixes));
        });
    }
    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    c.bench_function("reconcile_scroll_1000", |b| {
        let mut scroller = VirtualScroller::new(1);
        scroller.set_viewport_height(40, 1000);
        let mut step: isize = 7;
        b.iter(|| {
            scroller.scroll_rows(step, 1000);
            if scroller.scroll_offset() == 0 || scroller.scroll_offset() >= 960 {
                step = -step;
            }
            black_box(scroller.reconcile(1000));
        });
    });
}

fn bench_catalog_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_build");
    for chunk in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, &chunk| {
            b.iter(|| CatalogBuild::new(ResourceType::Deployment, payload(1000), chunk).finish());
        });
    }
    group.finish();
}

fn bench_filter_and_reconcile(c: &mut Criterion) {
    c.bench_function("search_keystrokes_1000", |b| {
        let mut view = MatrixView::new(ResourceType::Deployment, MatrixSettings::default());
        view.set_viewport(40, 30);
        let ticket = view.begin_load(ResourceType::Deployment, LoadReason::Initial);
        view.load_succeeded(ticket, payload(1000));
        view.finish_build();

        b.iter(|| {
            for text in ["s", "se", "ser", "service-00", ""] {
                view.set_search(black_box(text));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_filter,
    bench_reconcile,
    bench_catalog_build,
    bench_filter_and_reconcile
);
criterion_main!(benches);
