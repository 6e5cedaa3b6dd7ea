//! Backend access: the [`AnalysisSource`] seam, its HTTP implementation,
//! the push-update listener and the worker-thread dispatcher.
//!
//! # Example
//!
//! ```ignore
//! use netpol_matrix::client::{AnalysisSource, HttpAnalysisClient, HttpClientConfig};
//!
//! let client = HttpAnalysisClient::new(HttpClientConfig::default())?;
//! let namespaces = client.namespaces()?;
//! ```

mod dispatcher;
mod http;
mod push;

pub use dispatcher::{BackgroundEvent, Dispatcher, PushStatus};
pub use http::{HttpAnalysisClient, HttpClientConfig};
pub use push::{Backoff, PushListener, PushUpdate, SseDecoder, SseEvent};

use crate::error::Result;
use crate::model::wire::{GraphPayload, PolicyDetails, ResourceDetails};
use crate::model::{AnalysisResult, PairKey, ResourceType};

/// Everything the matrix needs from the reachability backend.
///
/// Implementations must be callable from worker threads.
pub trait AnalysisSource: Send + Sync {
    /// Nodes and edges for one resource type.
    fn fetch_graph(&self, resource_type: ResourceType) -> Result<GraphPayload>;

    /// Reachability verdict for one directed pair.
    fn check_communication(&self, key: &PairKey) -> Result<AnalysisResult>;

    /// Namespaces known to the cluster.
    fn namespaces(&self) -> Result<Vec<String>>;

    /// Rules of one network policy.
    fn policy(&self, name: &str) -> Result<PolicyDetails>;

    /// Details of one workload, by `namespace/name` id.
    fn resource(&self, resource_type: ResourceType, id: &str) -> Result<ResourceDetails>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory source with scripted answers.

    use super::*;
    use crate::error::{ClientErrorKind, MatrixError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type Scripted<T> = std::result::Result<T, ClientErrorKind>;

    #[derive(Default)]
    pub struct ScriptedSource {
        pairs: Mutex<HashMap<PairKey, Scripted<AnalysisResult>>>,
        graphs: Mutex<HashMap<ResourceType, Scripted<GraphPayload>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, key: &PairKey, outcome: Scripted<AnalysisResult>) {
            if let Ok(mut pairs) = self.pairs.lock() {
                pairs.insert(key.clone(), outcome);
            }
        }

        pub fn graph(&self, resource_type: ResourceType, outcome: Scripted<GraphPayload>) {
            if let Ok(mut graphs) = self.graphs.lock() {
                graphs.insert(resource_type, outcome);
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn lift<T>(outcome: Scripted<T>) -> Result<T> {
            outcome.map_err(|kind| MatrixError::client("scripted", kind))
        }
    }

    impl AnalysisSource for ScriptedSource {
        fn fetch_graph(&self, resource_type: ResourceType) -> Result<GraphPayload> {
            let outcome = self
                .graphs
                .lock()
                .ok()
                .and_then(|g| g.get(&resource_type).cloned())
                .unwrap_or_else(|| Ok(GraphPayload::default()));
            Self::lift(outcome)
        }

        fn check_communication(&self, key: &PairKey) -> Result<AnalysisResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self
                .pairs
                .lock()
                .ok()
                .and_then(|p| p.get(key).cloned())
                .unwrap_or_else(|| Err(ClientErrorKind::ResourceNotFound(key.to_string())));
            Self::lift(outcome)
        }

        fn namespaces(&self) -> Result<Vec<String>> {
            Ok(vec!["default".into()])
        }

        fn policy(&self, name: &str) -> Result<PolicyDetails> {
            Self::lift(Err(ClientErrorKind::ResourceNotFound(name.into())))
        }

        fn resource(&self, _resource_type: ResourceType, id: &str) -> Result<ResourceDetails> {
            Self::lift(Err(ClientErrorKind::ResourceNotFound(id.into())))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }
}
