use std::collections::BTreeMap;

use meridian_core::{ClusterConfig, IdealState, LiveInstance, StateModelDefinition};

/// Read-only snapshot of cluster metadata one pipeline run works from.
///
/// The embedding service materializes this from the metadata store before
/// invoking the stages; the stages never refresh or mutate it.
#[derive(Clone, Debug, Default)]
pub struct ClusterDataCache {
    cluster_config: ClusterConfig,
    ideal_states: BTreeMap<String, IdealState>,
    state_model_defs: BTreeMap<String, StateModelDefinition>,
    live_instances: BTreeMap<String, LiveInstance>,
}

impl ClusterDataCache {
    pub fn new(cluster_config: ClusterConfig) -> Self {
        ClusterDataCache {
            cluster_config,
            ideal_states: BTreeMap::new(),
            state_model_defs: BTreeMap::new(),
            live_instances: BTreeMap::new(),
        }
    }

    pub fn add_ideal_state(&mut self, ideal_state: IdealState) {
        self.ideal_states
            .insert(ideal_state.resource_name().to_string(), ideal_state);
    }

    pub fn add_state_model_def(&mut self, state_model_def: StateModelDefinition) {
        self.state_model_defs
            .insert(state_model_def.name().to_string(), state_model_def);
    }

    pub fn add_live_instance(&mut self, live_instance: LiveInstance) {
        self.live_instances
            .insert(live_instance.instance_name().to_string(), live_instance);
    }

    pub fn get_ideal_state(&self, resource: &str) -> Option<&IdealState> {
        self.ideal_states.get(resource)
    }

    pub fn get_state_model_def(&self, name: &str) -> Option<&StateModelDefinition> {
        self.state_model_defs.get(name)
    }

    /// Live instances keyed by instance name, in sorted order.
    pub fn get_live_instances(&self) -> &BTreeMap<String, LiveInstance> {
        &self.live_instances
    }

    pub fn get_cluster_config(&self) -> &ClusterConfig {
        &self.cluster_config
    }
}

/// Identity of the controller process running the pipeline.
#[derive(Clone, Debug)]
pub struct ControllerContext {
    instance_name: String,
    version: Option<String>,
}

impl ControllerContext {
    pub fn new(instance_name: impl Into<String>) -> Self {
        ControllerContext {
            instance_name: instance_name.into(),
            version: None,
        }
    }

    pub fn with_version(instance_name: impl Into<String>, version: impl Into<String>) -> Self {
        ControllerContext {
            instance_name: instance_name.into(),
            version: Some(version.into()),
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}
