//! End-to-end matrix flows: catalog load, cell activation and caching,
//! driven through the background dispatcher with an in-memory backend.

use netpol_matrix::client::{AnalysisSource, BackgroundEvent, Dispatcher, PushUpdate, SseDecoder};
use netpol_matrix::error::{ClientErrorKind, MatrixError, Result};
use netpol_matrix::matrix::{
    Activation, CellState, Completion, FetchTicket, LoadReason, LoadState, MatrixSettings,
    MatrixView,
};
use netpol_matrix::model::wire::{GraphPayload, PolicyDetails, ResourceDetails};
use netpol_matrix::model::{AnalysisResult, PairKey, ResourceType, Verdict};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> String {
    std::fs::read_to_string(Path::new(FIXTURES_DIR).join(name)).expect("read fixture")
}

fn analysis(name: &str) -> AnalysisResult {
    serde_json::from_str(&fixture(name)).expect("decode analysis")
}

/// In-memory backend keyed by `source -> target`. The graph is kept as a
/// raw body and decoded per request.
struct FakeBackend {
    graph_body: Mutex<String>,
    answers: HashMap<(String, String), std::result::Result<AnalysisResult, ClientErrorKind>>,
    calls: AtomicUsize,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            graph_body: Mutex::new(fixture("graph_deployments.json")),
            answers: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn answer(
        mut self,
        source: &str,
        target: &str,
        outcome: std::result::Result<AnalysisResult, ClientErrorKind>,
    ) -> Self {
        self.answers
            .insert((source.to_string(), target.to_string()), outcome);
        self
    }

    fn serve_graph(&self, body: &str) {
        *self.graph_body.lock().expect("graph lock") = body.to_string();
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AnalysisSource for FakeBackend {
    fn fetch_graph(&self, _resource_type: ResourceType) -> Result<GraphPayload> {
        let body = self.graph_body.lock().expect("graph lock").clone();
        Ok(serde_json::from_str(&body)?)
    }

    fn check_communication(&self, key: &PairKey) -> Result<AnalysisResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(&(key.source.clone(), key.target.clone()))
            .cloned()
            .unwrap_or_else(|| Err(ClientErrorKind::ResourceNotFound(key.to_string())))
            .map_err(|kind| MatrixError::client("fake", kind))
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        Ok(vec!["default".into(), "kube-system".into(), "team-b".into()])
    }

    fn policy(&self, name: &str) -> Result<PolicyDetails> {
        Err(MatrixError::client(
            "fake",
            ClientErrorKind::ResourceNotFound(name.into()),
        ))
    }

    fn resource(&self, _resource_type: ResourceType, id: &str) -> Result<ResourceDetails> {
        Err(MatrixError::client(
            "fake",
            ClientErrorKind::ResourceNotFound(id.into()),
        ))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

fn next_event(dispatcher: &Dispatcher) -> BackgroundEvent {
    dispatcher
        .recv_timeout(Duration::from_secs(5))
        .expect("background event")
}

/// Load the fixture graph through the dispatcher.
fn loaded_view(dispatcher: &Dispatcher) -> MatrixView {
    let mut view = MatrixView::new(ResourceType::Deployment, MatrixSettings::default());
    view.set_viewport(10, 8);
    let ticket = view.begin_load(ResourceType::Deployment, LoadReason::Initial);
    dispatcher.load_catalog(ticket);
    match next_event(dispatcher) {
        BackgroundEvent::CatalogLoaded { ticket, outcome } => {
            let payload = outcome.expect("graph");
            assert!(view.load_succeeded(ticket, payload));
        }
        other => panic!("unexpected event {other:?}"),
    }
    view.finish_build();
    view
}

/// Run one fetch through the dispatcher and feed the result back.
fn resolve(view: &mut MatrixView, dispatcher: &Dispatcher, ticket: FetchTicket) -> Completion {
    dispatcher.analyze(ticket);
    match next_event(dispatcher) {
        BackgroundEvent::PairAnalyzed { ticket, outcome } => view.complete(ticket, outcome),
        other => panic!("unexpected event {other:?}"),
    }
}

fn expect_fetch(activation: Activation) -> FetchTicket {
    match activation {
        Activation::Fetch(ticket) => ticket,
        other => panic!("expected fetch, got {other:?}"),
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[test]
fn test_fixture_catalog_skips_non_workloads_and_hides_system() {
    let dispatcher = Dispatcher::new(Arc::new(FakeBackend::new()));
    let view = loaded_view(&dispatcher);

    assert_eq!(view.load_state(), &LoadState::Ready);
    let summary = view.summary();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.visible, 4);
    assert_eq!(summary.edges, 2);

    let labels: Vec<&str> = view.window_rows().map(|(_, r)| r.label.as_str()).collect();
    assert_eq!(labels, vec!["frontend", "backend", "db", "worker"]);
}

#[test]
fn test_namespace_filter_narrows_rows() {
    let dispatcher = Dispatcher::new(Arc::new(FakeBackend::new()));
    let mut view = loaded_view(&dispatcher);
    view.set_namespace_options(vec!["default".into(), "team-b".into()]);

    view.toggle_namespace("default");
    let labels: Vec<&str> = view.window_rows().map(|(_, r)| r.label.as_str()).collect();
    assert_eq!(labels, vec!["worker"]);

    view.select_all_namespaces();
    assert_eq!(view.summary().visible, 4);
}

#[test]
fn test_reload_without_nodes_keeps_previous_catalog() {
    let backend = Arc::new(FakeBackend::new());
    let dispatcher = Dispatcher::new(backend.clone());
    let mut view = loaded_view(&dispatcher);

    backend.serve_graph(r#"{"error": "cluster unreachable"}"#);
    let ticket = view.begin_load(ResourceType::Deployment, LoadReason::Reload);
    dispatcher.load_catalog(ticket);
    match next_event(&dispatcher) {
        BackgroundEvent::CatalogLoaded { ticket, outcome } => {
            let kind = outcome.expect_err("graph without nodes");
            assert!(matches!(kind, ClientErrorKind::MalformedResponse(_)));
            assert!(view.load_failed(ticket, &kind));
        }
        other => panic!("unexpected event {other:?}"),
    }
    view.finish_build();

    assert!(matches!(view.load_state(), LoadState::Stopped(_)));
    assert_eq!(view.summary().total, 5);
    assert_eq!(view.summary().visible, 4);
}

// ============================================================================
// Cells
// ============================================================================

#[test]
fn test_activation_fetches_once_then_hits_cache() {
    let backend = Arc::new(FakeBackend::new().answer(
        "default/frontend",
        "default/backend",
        Ok(analysis("analysis_allowed.json")),
    ));
    let dispatcher = Dispatcher::new(backend.clone());
    let mut view = loaded_view(&dispatcher);

    view.select_cell(0, 1);
    let ticket = expect_fetch(view.activate_selected());
    assert!(view.cell_state(0, 1).is_pending());
    assert_eq!(view.activate_selected(), Activation::Ignored);

    assert_eq!(resolve(&mut view, &dispatcher, ticket), Completion::Applied);
    assert_eq!(view.cell_state(0, 1), CellState::Resolved(Verdict::Allowed));
    assert_eq!(view.tooltip().as_deref(), Some("Ports: 80, 443"));

    let detail = view.detail().view().expect("detail shown");
    assert_eq!(detail.title, "Communication allowed");
    assert!(detail
        .to_plain_text()
        .contains("frontend (default/frontend)"));

    assert_eq!(view.activate_selected(), Activation::Cached);
    assert_eq!(backend.calls(), 1);
    assert_eq!(view.summary().cache.hits, 1);
}

#[test]
fn test_failure_marks_cell_and_allows_retry() {
    let backend = Arc::new(FakeBackend::new().answer(
        "default/backend",
        "default/db",
        Err(ClientErrorKind::HttpError {
            status: 500,
            body: "analysis crashed".into(),
        }),
    ));
    let dispatcher = Dispatcher::new(backend.clone());
    let mut view = loaded_view(&dispatcher);

    view.select_cell(1, 2);
    let ticket = expect_fetch(view.activate_selected());
    assert_eq!(resolve(&mut view, &dispatcher, ticket), Completion::Applied);
    assert!(matches!(view.cell_state(1, 2), CellState::Error(_)));
    assert!(view.cache().is_empty());

    let detail = view.detail().view().expect("detail shown");
    assert_eq!(detail.title, "Analysis failed");

    let _retry = expect_fetch(view.activate_selected());
    assert_eq!(backend.calls(), 1);
}

#[test]
fn test_blocked_pair_shows_blocking_policy() {
    let backend = Arc::new(FakeBackend::new().answer(
        "team-b/worker",
        "default/db",
        Ok(analysis("analysis_blocked.json")),
    ));
    let dispatcher = Dispatcher::new(backend);
    let mut view = loaded_view(&dispatcher);

    view.select_cell(3, 2);
    let ticket = expect_fetch(view.activate_selected());
    resolve(&mut view, &dispatcher, ticket);

    assert_eq!(view.cell_state(3, 2), CellState::Resolved(Verdict::Blocked));
    assert_eq!(view.tooltip(), None);
    let text = view.detail().view().expect("detail").to_plain_text();
    assert!(text.contains("deny-all"));
    assert!(text.contains("Communication blocked by network policies"));
}

#[test]
fn test_diagonal_is_not_applicable() {
    let dispatcher = Dispatcher::new(Arc::new(FakeBackend::new()));
    let mut view = loaded_view(&dispatcher);
    view.select_cell(2, 2);
    assert_eq!(view.cell_state(2, 2), CellState::NotApplicable);
    assert_eq!(view.activate_selected(), Activation::Ignored);
}

// ============================================================================
// Push updates
// ============================================================================

#[test]
fn test_push_update_rebuilds_and_invalidates_current_context() {
    let backend = Arc::new(FakeBackend::new().answer(
        "default/frontend",
        "default/backend",
        Ok(analysis("analysis_allowed.json")),
    ));
    let dispatcher = Dispatcher::new(backend);
    let mut view = loaded_view(&dispatcher);
    view.select_cell(0, 1);
    let ticket = expect_fetch(view.activate_selected());
    resolve(&mut view, &dispatcher, ticket);
    assert_eq!(view.cache().len(), 1);

    let payload = r#"{"nodes":[{"data":{"id":"default/frontend","label":"frontend","group":"deployment"}},{"data":{"id":"default/cache","label":"cache","group":"deployment"}}],"edges":[]}"#;
    let mut decoder = SseDecoder::new();
    assert!(decoder.push_line("event: update_deployment").is_none());
    assert!(decoder.push_line(&format!("data: {payload}")).is_none());
    let event = decoder.push_line("").expect("dispatched event");
    let update = PushUpdate::from_event(&event)
        .expect("decode")
        .expect("update event");

    assert!(view.push_update(update).is_some());
    view.finish_build();

    assert_eq!(view.summary().total, 2);
    assert!(view.cache().is_empty());
    assert_eq!(view.cell_state(0, 1), CellState::Unknown);
}
