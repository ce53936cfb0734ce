use serde::{Deserialize, Serialize};

/// How the controller is allowed to move replicas of a resource around.
/// State-transition throttling applies only in `FullAuto`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RebalanceMode {
    /// The controller may freely reassign replicas.
    FullAuto,
    /// Placement is fixed by the ideal state; the controller only drives
    /// state transitions.
    SemiAuto,
    /// Placement and states are both dictated externally.
    Customized,
}

/// Per-resource rebalancing contract: mode and state model reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdealState {
    resource_name: String,
    rebalance_mode: RebalanceMode,
    state_model_def_ref: String,
}

impl IdealState {
    pub fn new(
        resource_name: impl Into<String>,
        rebalance_mode: RebalanceMode,
        state_model_def_ref: impl Into<String>,
    ) -> Self {
        IdealState {
            resource_name: resource_name.into(),
            rebalance_mode,
            state_model_def_ref: state_model_def_ref.into(),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn rebalance_mode(&self) -> RebalanceMode {
        self.rebalance_mode
    }

    pub fn state_model_def_ref(&self) -> &str {
        &self.state_model_def_ref
    }
}
