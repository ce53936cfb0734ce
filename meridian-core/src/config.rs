use serde::{Deserialize, Serialize};

/// Classification of the movement a partition needs to reach its best
/// possible state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RebalanceType {
    /// Current placement already matches the best possible placement.
    None,
    /// A replica count of some priority state is below target; replicas must
    /// be recovered before placement optimization is allowed.
    RecoveryBalance,
    /// Counts match but placements differ; movement is pure optimization.
    LoadBalance,
}

/// Per-scope transition quotas for one rebalance type.
/// An absent limit means unbounded (never throttled at that scope).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleLimits {
    /// Max concurrent transitions across the whole cluster
    #[serde(default)]
    pub cluster: Option<u64>,
    /// Max concurrent transitions per resource
    #[serde(default)]
    pub resource: Option<u64>,
    /// Max concurrent transitions per instance
    #[serde(default)]
    pub instance: Option<u64>,
}

/// State-transition throttling configuration.
///
/// Quotas express the maximum number of concurrent transitions admitted per
/// scope per rebalance type. The `enabled` flag gates the whole mechanism;
/// when false the intermediate state equals the best possible state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransitionThrottleConfig {
    /// Enable/disable state-transition throttling
    #[serde(default)]
    pub enabled: bool,
    /// Quotas charged by recovery-balance transitions
    #[serde(default)]
    pub recovery_balance: ThrottleLimits,
    /// Quotas charged by load-balance transitions
    #[serde(default)]
    pub load_balance: ThrottleLimits,
}

impl StateTransitionThrottleConfig {
    /// Quotas for one rebalance type. `RebalanceType::None` carries no
    /// quotas; charges against it are recorded but never throttle.
    pub fn limits(&self, rebalance_type: RebalanceType) -> Option<&ThrottleLimits> {
        match rebalance_type {
            RebalanceType::None => None,
            RebalanceType::RecoveryBalance => Some(&self.recovery_balance),
            RebalanceType::LoadBalance => Some(&self.load_balance),
        }
    }
}

/// Cluster-wide configuration the controller pipeline reads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Meridian cluster name
    pub cluster_name: String,
    /// State-transition throttling configuration
    #[serde(default)]
    pub state_transition_throttle: StateTransitionThrottleConfig,
}

impl ClusterConfig {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        ClusterConfig {
            cluster_name: cluster_name.into(),
            state_transition_throttle: StateTransitionThrottleConfig::default(),
        }
    }
}
