//! Meridian controller core.
//!
//! Given a cluster's best possible assignment and the observed current
//! assignment, computes the intermediate assignment the controller drives
//! the cluster toward in the next step, bounded by state-transition
//! throttling. Also hosts the controller/participant version compatibility
//! gate that runs before any state computation.
//!
//! The computation is synchronous and CPU-bound; all inputs are materialized
//! by the embedding service before entry and are never mutated here.

mod cluster_cache;
pub use cluster_cache::{ClusterDataCache, ControllerContext};

mod controller_metrics;
pub use controller_metrics::register_metrics;

mod throttle;
#[cfg(test)]
mod throttle_test;

pub mod stages;
pub use stages::{check_compatibility, compute_intermediate_state, StageInput};
