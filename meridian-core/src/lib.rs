mod errors;
pub use errors::{Result, StageError};

mod partition;
pub use partition::{Partition, Resource};

mod state_model;
pub use state_model::{StateModelDefinition, DROPPED_STATE, ERROR_STATE};

mod assignment;
pub use assignment::{
    BestPossibleStateOutput, CurrentStateOutput, InstanceStateMap, IntermediateStateOutput,
    PartitionStateMap,
};

mod ideal_state;
pub use ideal_state::{IdealState, RebalanceMode};

mod live_instance;
pub use live_instance::LiveInstance;

mod config;
pub use config::{ClusterConfig, RebalanceType, StateTransitionThrottleConfig, ThrottleLimits};
