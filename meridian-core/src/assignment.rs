use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::partition::Partition;

/// Mapping of instance name to the state its replica holds (or is asked to
/// hold). An instance appears at most once per partition.
pub type InstanceStateMap = BTreeMap<String, String>;

/// Replica placement of one resource: partition -> (instance -> state).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionStateMap {
    resource_name: String,
    state_map: BTreeMap<Partition, InstanceStateMap>,
}

impl PartitionStateMap {
    pub fn new(resource_name: impl Into<String>) -> Self {
        PartitionStateMap {
            resource_name: resource_name.into(),
            state_map: BTreeMap::new(),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn partition_map(&self, partition: &Partition) -> Option<&InstanceStateMap> {
        self.state_map.get(partition)
    }

    pub fn set_state(&mut self, partition: Partition, state_map: InstanceStateMap) {
        self.state_map.insert(partition, state_map);
    }

    /// Partitions in deterministic (sorted) order.
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.state_map.keys()
    }

    pub fn len(&self) -> usize {
        self.state_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state_map.is_empty()
    }
}

/// The most recent observed assignment reported by participants, together
/// with the transitions already issued but not yet acknowledged.
#[derive(Clone, Debug, Default)]
pub struct CurrentStateOutput {
    current: BTreeMap<String, BTreeMap<Partition, InstanceStateMap>>,
    pending: BTreeMap<String, BTreeMap<Partition, InstanceStateMap>>,
}

impl CurrentStateOutput {
    pub fn new() -> Self {
        CurrentStateOutput::default()
    }

    pub fn set_current_state(
        &mut self,
        resource: impl Into<String>,
        partition: Partition,
        instance: impl Into<String>,
        state: impl Into<String>,
    ) {
        self.current
            .entry(resource.into())
            .or_default()
            .entry(partition)
            .or_default()
            .insert(instance.into(), state.into());
    }

    pub fn set_pending_state(
        &mut self,
        resource: impl Into<String>,
        partition: Partition,
        instance: impl Into<String>,
        state: impl Into<String>,
    ) {
        self.pending
            .entry(resource.into())
            .or_default()
            .entry(partition)
            .or_default()
            .insert(instance.into(), state.into());
    }

    /// Observed instance -> state map for one partition; `None` means no
    /// replica of this partition has reported a state yet.
    pub fn current_state_map(
        &self,
        resource: &str,
        partition: &Partition,
    ) -> Option<&InstanceStateMap> {
        self.current.get(resource)?.get(partition)
    }

    /// In-flight instance -> state map for one partition.
    pub fn pending_state_map(
        &self,
        resource: &str,
        partition: &Partition,
    ) -> Option<&InstanceStateMap> {
        self.pending.get(resource)?.get(partition)
    }
}

/// The goal assignment computed upstream, per resource.
#[derive(Clone, Debug, Default)]
pub struct BestPossibleStateOutput {
    state_map: BTreeMap<String, PartitionStateMap>,
}

impl BestPossibleStateOutput {
    pub fn new() -> Self {
        BestPossibleStateOutput::default()
    }

    pub fn set_state(&mut self, resource: impl Into<String>, partition_state_map: PartitionStateMap) {
        self.state_map.insert(resource.into(), partition_state_map);
    }

    pub fn partition_state_map(&self, resource: &str) -> Option<&PartitionStateMap> {
        self.state_map.get(resource)
    }
}

/// The assignment the controller drives the cluster toward this cycle,
/// bounded by the state-transition throttles.
#[derive(Clone, Debug, Default)]
pub struct IntermediateStateOutput {
    state_map: BTreeMap<String, PartitionStateMap>,
}

impl IntermediateStateOutput {
    pub fn new() -> Self {
        IntermediateStateOutput::default()
    }

    pub fn set_state(&mut self, resource: impl Into<String>, partition_state_map: PartitionStateMap) {
        self.state_map.insert(resource.into(), partition_state_map);
    }

    pub fn partition_state_map(&self, resource: &str) -> Option<&PartitionStateMap> {
        self.state_map.get(resource)
    }

    /// Resources in deterministic (sorted) order.
    pub fn resources(&self) -> impl Iterator<Item = &String> {
        self.state_map.keys()
    }

    pub fn len(&self) -> usize {
        self.state_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state_map.is_empty()
    }
}
