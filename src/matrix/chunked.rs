//! Resumable, cancellable work split across UI ticks.

use crate::model::wire::{GraphPayload, NodeEnvelope};
use crate::model::{ResourceCatalog, ResourceType};

/// Progress reported after each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskProgress {
    Running { processed: usize, total: usize },
    Finished,
    Cancelled,
}

/// Processes at most `chunk_size` items per [`step`](Self::step).
#[derive(Debug)]
pub struct ChunkedTask<T> {
    items: std::vec::IntoIter<T>,
    total: usize,
    processed: usize,
    chunk_size: usize,
    cancelled: bool,
}

impl<T> ChunkedTask<T> {
    pub fn new(items: Vec<T>, chunk_size: usize) -> Self {
        Self {
            total: items.len(),
            items: items.into_iter(),
            processed: 0,
            chunk_size: chunk_size.max(1),
            cancelled: false,
        }
    }

    /// Run one chunk through `f`.
    pub fn step(&mut self, mut f: impl FnMut(T)) -> TaskProgress {
        if self.cancelled {
            return TaskProgress::Cancelled;
        }
        for item in self.items.by_ref().take(self.chunk_size) {
            f(item);
            self.processed += 1;
        }
        if self.processed >= self.total {
            TaskProgress::Finished
        } else {
            TaskProgress::Running {
                processed: self.processed,
                total: self.total,
            }
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Outcome of one catalog build step.
#[derive(Debug)]
pub enum BuildStep {
    Running { processed: usize, total: usize },
    Done(ResourceCatalog),
    Cancelled,
}

/// Builds a [`ResourceCatalog`] from a graph payload a chunk at a time.
///
/// The partial catalog is private; callers only ever see the finished one.
#[derive(Debug)]
pub struct CatalogBuild {
    task: ChunkedTask<NodeEnvelope>,
    catalog: ResourceCatalog,
    skipped: usize,
    edges: usize,
}

impl CatalogBuild {
    pub fn new(resource_type: ResourceType, payload: GraphPayload, chunk_size: usize) -> Self {
        Self {
            edges: payload.edges.len(),
            task: ChunkedTask::new(payload.nodes, chunk_size),
            catalog: ResourceCatalog::empty(resource_type),
            skipped: 0,
        }
    }

    pub fn step(&mut self) -> BuildStep {
        let catalog = &mut self.catalog;
        let skipped = &mut self.skipped;
        match self.task.step(|node| {
            let resource = node.data.to_resource();
            if resource.group.is_workload() {
                catalog.insert(resource);
            } else {
                *skipped += 1;
            }
        }) {
            TaskProgress::Running { processed, total } => BuildStep::Running { processed, total },
            TaskProgress::Cancelled => BuildStep::Cancelled,
            TaskProgress::Finished => {
                tracing::debug!(
                    skipped = self.skipped,
                    edges = self.edges,
                    "non-workload graph nodes skipped"
                );
                let resource_type = self.catalog.resource_type();
                BuildStep::Done(std::mem::replace(
                    &mut self.catalog,
                    ResourceCatalog::empty(resource_type),
                ))
            }
        }
    }

    pub fn cancel(&mut self) {
        self.task.cancel();
    }

    /// Build the whole catalog in one go, for one-shot commands.
    pub fn finish(mut self) -> ResourceCatalog {
        loop {
            match self.step() {
                BuildStep::Running { .. } => {}
                BuildStep::Done(catalog) => return catalog,
                BuildStep::Cancelled => return ResourceCatalog::empty(self.catalog.resource_type()),
            }
        }
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.task.processed(), self.task.total())
    }

    /// Edge count of the payload, for the header.
    pub fn edge_count(&self) -> usize {
        self.edges
    }
}
