//! Data model for the reachability matrix.
//!
//! [`ResourceCatalog`] is the set of addressable workloads for one
//! [`ResourceType`]; [`AnalysisResult`] is the backend's verdict for a
//! single [`PairKey`]. The `wire` submodule holds the JSON envelopes the
//! backend speaks, kept separate so the rest of the crate never sees them.

mod analysis;
mod resource;
pub mod wire;

pub use analysis::*;
pub use resource::*;
