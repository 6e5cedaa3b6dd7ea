//! Session cache of pairwise analysis results.

use crate::client::AnalysisSource;
use crate::error::Result;
use crate::model::{AnalysisResult, PairKey, ResourceType};
use std::collections::HashMap;
use std::fmt;

/// Hit/miss counters shown in the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "Pair cache: {} entries, {} hits, {} misses ({:.0}% hit rate)",
            self.entries,
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        );
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cache {} ({} hit / {} miss)",
            self.entries, self.hits, self.misses
        )
    }
}

/// `PairKey -> AnalysisResult`, unbounded for the session.
///
/// Failures are never stored.
#[derive(Debug, Default)]
pub struct PairCache {
    entries: HashMap<PairKey, AnalysisResult>,
    hits: u64,
    misses: u64,
}

impl PairCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counted lookup, used when a cell is activated.
    pub fn get(&mut self, key: &PairKey) -> Option<&AnalysisResult> {
        match self.entries.get(key) {
            Some(result) => {
                self.hits += 1;
                tracing::debug!(pair = %key, "pair cache hit");
                Some(result)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Uncounted lookup, used while rendering.
    pub fn peek(&self, key: &PairKey) -> Option<&AnalysisResult> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn put(&mut self, key: PairKey, result: AnalysisResult) {
        self.entries.insert(key, result);
    }

    /// Return the cached result or fetch it synchronously from `source`.
    ///
    /// Only a successful fetch is stored, under exactly `key`.
    pub fn get_or_fetch(
        &mut self,
        key: &PairKey,
        source: &dyn AnalysisSource,
    ) -> Result<AnalysisResult> {
        if let Some(hit) = self.get(key) {
            return Ok(hit.clone());
        }
        let result = source.check_communication(key)?;
        self.put(key.clone(), result.clone());
        Ok(result)
    }

    /// Drop every entry of one resource-type context.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_context(&mut self, resource_type: ResourceType) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| k.resource_type != resource_type);
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(%resource_type, removed, "invalidated pair cache context");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
