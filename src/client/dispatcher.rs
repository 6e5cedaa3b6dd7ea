//! Runs backend calls on short-lived worker threads and reports back over
//! a channel the UI drains once per tick.

use super::push::PushUpdate;
use super::AnalysisSource;
use crate::error::ClientErrorKind;
use crate::matrix::{FetchTicket, LoadTicket};
use crate::model::wire::{GraphPayload, PolicyDetails, ResourceDetails};
use crate::model::{AnalysisResult, ResourceType};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

type Outcome<T> = Result<T, ClientErrorKind>;

/// Push channel connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushStatus {
    Connected,
    Reconnecting(Duration),
}

/// Everything a worker can report to the UI thread.
#[derive(Debug)]
pub enum BackgroundEvent {
    CatalogLoaded {
        ticket: LoadTicket,
        outcome: Outcome<GraphPayload>,
    },
    PairAnalyzed {
        ticket: FetchTicket,
        outcome: Outcome<AnalysisResult>,
    },
    Namespaces(Outcome<Vec<String>>),
    ResourceDetails {
        id: String,
        outcome: Outcome<ResourceDetails>,
    },
    PolicyDetails {
        name: String,
        outcome: Outcome<PolicyDetails>,
    },
    Update(PushUpdate),
    Push(PushStatus),
}

/// Spawns one thread per request; results come back through [`Dispatcher::drain`].
pub struct Dispatcher {
    source: Arc<dyn AnalysisSource>,
    tx: Sender<BackgroundEvent>,
    rx: Receiver<BackgroundEvent>,
}

impl Dispatcher {
    pub fn new(source: Arc<dyn AnalysisSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { source, tx, rx }
    }

    /// Sender for other producers (the push listener).
    pub fn sender(&self) -> Sender<BackgroundEvent> {
        self.tx.clone()
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Everything reported since the last call, without blocking.
    pub fn drain(&self) -> Vec<BackgroundEvent> {
        self.rx.try_iter().collect()
    }

    /// Block until one event arrives or the timeout passes.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<BackgroundEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn load_catalog(&self, ticket: LoadTicket) {
        self.spawn("catalog", move |source| BackgroundEvent::CatalogLoaded {
            ticket,
            outcome: source
                .fetch_graph(ticket.resource_type)
                .map_err(|e| e.into_client_kind()),
        });
    }

    pub fn analyze(&self, ticket: FetchTicket) {
        self.spawn("analyze", move |source| {
            let outcome = source
                .check_communication(&ticket.key)
                .map_err(|e| e.into_client_kind());
            BackgroundEvent::PairAnalyzed { ticket, outcome }
        });
    }

    pub fn namespaces(&self) {
        self.spawn("namespaces", |source| {
            BackgroundEvent::Namespaces(source.namespaces().map_err(|e| e.into_client_kind()))
        });
    }

    pub fn resource_details(&self, resource_type: ResourceType, id: String) {
        self.spawn("resource", move |source| {
            let outcome = source
                .resource(resource_type, &id)
                .map_err(|e| e.into_client_kind());
            BackgroundEvent::ResourceDetails { id, outcome }
        });
    }

    pub fn policy_details(&self, name: String) {
        self.spawn("policy", move |source| {
            let outcome = source.policy(&name).map_err(|e| e.into_client_kind());
            BackgroundEvent::PolicyDetails { name, outcome }
        });
    }

    fn spawn<F>(&self, what: &str, job: F)
    where
        F: FnOnce(&dyn AnalysisSource) -> BackgroundEvent + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("netpol-{what}"))
            .spawn(move || {
                let event = job(source.as_ref());
                // receiver gone means the UI has exited
                let _ = tx.send(event);
            });
        if let Err(e) = spawned {
            tracing::warn!("failed to spawn {what} worker: {e}");
        }
    }
}
