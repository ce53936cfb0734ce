use std::collections::{BTreeMap, BTreeSet};

use metrics::counter;
use tracing::{debug, info};

use meridian_core::{
    BestPossibleStateOutput, CurrentStateOutput, InstanceStateMap, IntermediateStateOutput,
    Partition, PartitionStateMap, RebalanceMode, RebalanceType, Resource, Result, StageError,
    StateModelDefinition,
};

use crate::cluster_cache::ClusterDataCache;
use crate::controller_metrics::{
    REBALANCE_LOAD_PARTITIONS_TOTAL, REBALANCE_LOAD_THROTTLED_TOTAL,
    REBALANCE_RECOVERY_PARTITIONS_TOTAL,
};
use crate::throttle::StateTransitionThrottleController;

static EMPTY_STATE_MAP: InstanceStateMap = InstanceStateMap::new();

/// Typed inputs of the intermediate state calculation. All references are
/// read-only; the stage never mutates its inputs.
#[derive(Clone, Copy, Debug)]
pub struct StageInput<'a> {
    pub cache: &'a ClusterDataCache,
    pub resource_map: &'a BTreeMap<String, Resource>,
    pub current_state: &'a CurrentStateOutput,
    pub best_possible: &'a BestPossibleStateOutput,
}

/// For each partition, computes the intermediate (instance, state) pairs
/// based on the best possible state and current state, with all constraints
/// applied (such as state-transition throttling).
///
/// Resources are processed in sorted order; within a resource, pending
/// transitions are charged against the throttle ledgers before any new
/// admission, recovery is admitted before load balance, and load balance is
/// suppressed entirely while any partition of the resource needs recovery.
/// The same inputs always produce the same output.
pub fn compute_intermediate_state(input: &StageInput) -> Result<IntermediateStateOutput> {
    info!(resources = input.resource_map.len(), "start intermediate state calculation");

    let mut output = IntermediateStateOutput::new();
    let mut throttle_controller = StateTransitionThrottleController::new(
        input.resource_map.keys(),
        input.cache.get_cluster_config(),
        input.cache.get_live_instances().keys(),
    );

    for (resource_name, resource) in input.resource_map {
        let intermediate = compute_intermediate_partition_state(
            input,
            resource_name,
            resource,
            &mut throttle_controller,
        )?;
        output.set_state(resource_name.clone(), intermediate);
    }

    info!("end intermediate state calculation");
    Ok(output)
}

/// Per-resource computation: classify partitions, charge pending work,
/// admit recovery, then admit load balance if no recovery remains.
fn compute_intermediate_partition_state(
    input: &StageInput,
    resource_name: &str,
    resource: &Resource,
    throttle_controller: &mut StateTransitionThrottleController,
) -> Result<PartitionStateMap> {
    info!(resource = %resource_name, "processing resource");

    let ideal_state = input.cache.get_ideal_state(resource_name).ok_or_else(|| {
        StageError::MissingInputs(format!("ideal state for resource {resource_name}"))
    })?;
    let best_possible = input
        .best_possible
        .partition_state_map(resource_name)
        .ok_or_else(|| {
            StageError::MissingInputs(format!(
                "best possible state for resource {resource_name}"
            ))
        })?;

    if !throttle_controller.is_throttle_enabled()
        || ideal_state.rebalance_mode() != RebalanceMode::FullAuto
    {
        // Throttling applies only to FULL_AUTO resources.
        return Ok(best_possible.clone());
    }

    let state_model_def = input
        .cache
        .get_state_model_def(ideal_state.state_model_def_ref())
        .ok_or_else(|| {
            StageError::MissingInputs(format!(
                "state model definition {} for resource {resource_name}",
                ideal_state.state_model_def_ref()
            ))
        })?;

    let mut intermediate = PartitionStateMap::new(resource_name);
    let mut partitions_need_recovery = BTreeSet::new();
    let mut partitions_need_loadbalance = BTreeSet::new();

    for partition in resource.partitions() {
        let current_state_map = input
            .current_state
            .current_state_map(resource_name, partition)
            .unwrap_or(&EMPTY_STATE_MAP);
        let best_possible_map = best_possible
            .partition_map(partition)
            .unwrap_or(&EMPTY_STATE_MAP);

        match rebalance_type(best_possible_map, state_model_def, current_state_map) {
            RebalanceType::RecoveryBalance => {
                partitions_need_recovery.insert(partition.clone());
            }
            RebalanceType::LoadBalance => {
                partitions_need_loadbalance.insert(partition.clone());
            }
            RebalanceType::None => {
                // No rebalance needed, the partition moves straight to its target.
                intermediate.set_state(partition.clone(), best_possible_map.clone());
            }
        }
    }

    debug!(
        resource = %resource_name,
        partitions = ?partitions_need_recovery,
        "recovery balance needed"
    );
    debug!(
        resource = %resource_name,
        partitions = ?partitions_need_loadbalance,
        "load balance needed"
    );

    charge_pending_transitions(
        resource,
        input.current_state,
        throttle_controller,
        &partitions_need_recovery,
        &partitions_need_loadbalance,
    );

    recovery_rebalance(
        best_possible,
        throttle_controller,
        &mut intermediate,
        &partitions_need_recovery,
    );

    let partitions_loadbalance_throttled = if partitions_need_recovery.is_empty() {
        load_rebalance(
            resource_name,
            input.current_state,
            best_possible,
            throttle_controller,
            &mut intermediate,
            &partitions_need_loadbalance,
        )
    } else {
        // Load balance makes no progress while recovery is outstanding for
        // the resource: those partitions keep their current placement.
        for partition in &partitions_need_loadbalance {
            let current_state_map = input
                .current_state
                .current_state_map(resource_name, partition)
                .cloned()
                .unwrap_or_default();
            intermediate.set_state(partition.clone(), current_state_map);
        }
        partitions_need_loadbalance.clone()
    };

    log_partition_map_state(
        resource_name,
        resource,
        &partitions_need_recovery,
        &partitions_need_loadbalance,
        &partitions_loadbalance_throttled,
        input.current_state,
        best_possible,
        &intermediate,
    );

    info!(resource = %resource_name, "end processing resource");
    Ok(intermediate)
}

/// Charges all in-flight transitions against the throttle ledgers, so fresh
/// admission decisions respect the capacity already consumed.
///
/// Must run exactly once per resource per invocation; a second call would
/// double-count the pending work.
pub(crate) fn charge_pending_transitions(
    resource: &Resource,
    current_state: &CurrentStateOutput,
    throttle_controller: &mut StateTransitionThrottleController,
    partitions_need_recovery: &BTreeSet<Partition>,
    partitions_need_loadbalance: &BTreeSet<Partition>,
) {
    let resource_name = resource.resource_name();

    for partition in resource.partitions() {
        let Some(pending_map) = current_state.pending_state_map(resource_name, partition) else {
            continue;
        };
        if pending_map.is_empty() {
            continue;
        }

        let rebalance_type = if partitions_need_recovery.contains(partition) {
            RebalanceType::RecoveryBalance
        } else if partitions_need_loadbalance.contains(partition) {
            RebalanceType::LoadBalance
        } else {
            RebalanceType::None
        };

        let current_state_map = current_state
            .current_state_map(resource_name, partition)
            .unwrap_or(&EMPTY_STATE_MAP);

        throttle_controller.charge_cluster(rebalance_type);
        throttle_controller.charge_resource(rebalance_type, resource_name);

        // Charge each instance whose pending state is not yet reached.
        for (instance, pending_state) in pending_map {
            if current_state_map.get(instance) != Some(pending_state) {
                throttle_controller.charge_instance(rebalance_type, instance);
            }
        }
    }
}

/// Admits every recovery partition at its best possible placement.
///
/// Recovery is not throttled; the controller parameter is the seam where a
/// future recovery quota would charge.
fn recovery_rebalance(
    best_possible: &PartitionStateMap,
    _throttle_controller: &mut StateTransitionThrottleController,
    intermediate: &mut PartitionStateMap,
    partitions_need_recovery: &BTreeSet<Partition>,
) {
    for partition in partitions_need_recovery {
        let best_possible_map = best_possible
            .partition_map(partition)
            .cloned()
            .unwrap_or_default();
        // TODO: charge the throttle ledgers here once a recovery quota exists.
        intermediate.set_state(partition.clone(), best_possible_map);
    }

    counter!(REBALANCE_RECOVERY_PARTITIONS_TOTAL.name)
        .increment(partitions_need_recovery.len() as u64);
}

/// Admits load-balance partitions toward best possible within the throttle
/// quotas; a throttled partition keeps its current placement this cycle.
/// Returns the partitions that were throttled.
fn load_rebalance(
    resource_name: &str,
    current_state: &CurrentStateOutput,
    best_possible: &PartitionStateMap,
    throttle_controller: &mut StateTransitionThrottleController,
    intermediate: &mut PartitionStateMap,
    partitions_need_loadbalance: &BTreeSet<Partition>,
) -> BTreeSet<Partition> {
    let mut partitions_loadbalance_throttled = BTreeSet::new();

    for partition in partitions_need_loadbalance {
        let current_state_map = current_state
            .current_state_map(resource_name, partition)
            .unwrap_or(&EMPTY_STATE_MAP);
        let best_possible_map = best_possible
            .partition_map(partition)
            .unwrap_or(&EMPTY_STATE_MAP);

        let mut all_instances: BTreeSet<&String> = current_state_map.keys().collect();
        all_instances.extend(best_possible_map.keys());

        let mut throttled = false;
        if throttle_controller.throttle_for_resource(RebalanceType::LoadBalance, resource_name) {
            throttled = true;
            debug!(
                resource = %resource_name,
                partition = %partition,
                "load balance throttled on resource"
            );
        } else {
            // Throttle the whole partition if any changing instance has no
            // capacity left for the transition.
            for instance in &all_instances {
                if instance_changes(instance, best_possible_map, current_state_map)
                    && throttle_controller
                        .throttle_for_instance(RebalanceType::LoadBalance, instance)
                {
                    throttled = true;
                    debug!(
                        resource = %resource_name,
                        partition = %partition,
                        instance = %instance,
                        "load balance throttled on instance"
                    );
                }
            }
        }

        if !throttled {
            for instance in &all_instances {
                if instance_changes(instance, best_possible_map, current_state_map) {
                    throttle_controller.charge_instance(RebalanceType::LoadBalance, instance);
                }
            }
            throttle_controller.charge_cluster(RebalanceType::LoadBalance);
            throttle_controller.charge_resource(RebalanceType::LoadBalance, resource_name);
            intermediate.set_state(partition.clone(), best_possible_map.clone());
        } else {
            intermediate.set_state(partition.clone(), current_state_map.clone());
            partitions_loadbalance_throttled.insert(partition.clone());
        }
    }

    info!(
        resource = %resource_name,
        loadbalance_needed = partitions_need_loadbalance.len(),
        loadbalance_throttled = partitions_loadbalance_throttled.len(),
        "load balance summary"
    );
    counter!(REBALANCE_LOAD_PARTITIONS_TOTAL.name)
        .increment(partitions_need_loadbalance.len() as u64);
    counter!(REBALANCE_LOAD_THROTTLED_TOTAL.name)
        .increment(partitions_loadbalance_throttled.len() as u64);

    partitions_loadbalance_throttled
}

/// True when the best possible assignment asks this instance to hold a state
/// it does not currently hold.
fn instance_changes(
    instance: &str,
    best_possible_map: &InstanceStateMap,
    current_state_map: &InstanceStateMap,
) -> bool {
    match best_possible_map.get(instance) {
        Some(best_possible_state) => current_state_map.get(instance) != Some(best_possible_state),
        None => false,
    }
}

/// Classifies the movement a partition needs: `None` when current placement
/// equals the target, `RecoveryBalance` when a non-reserved priority state
/// has fewer replicas than the target asks for, `LoadBalance` otherwise.
///
/// Pure function of its arguments.
pub(crate) fn rebalance_type(
    best_possible_map: &InstanceStateMap,
    state_model_def: &StateModelDefinition,
    current_state_map: &InstanceStateMap,
) -> RebalanceType {
    if best_possible_map == current_state_map {
        return RebalanceType::None;
    }

    let best_possible_counts = state_counts(best_possible_map);
    let current_counts = state_counts(current_state_map);

    for state in state_model_def.states_priority_list() {
        let best_possible_count = best_possible_counts.get(state);
        let current_count = current_counts.get(state);

        match (best_possible_count, current_count) {
            (None, None) => continue,
            (Some(best), Some(current)) if current >= best => continue,
            _ => {
                // A deficit in a reserved state is not a lost replica.
                if !state_model_def.is_reserved_state(state) {
                    return RebalanceType::RecoveryBalance;
                }
            }
        }
    }

    RebalanceType::LoadBalance
}

/// Given an instance -> state map, returns the per-state replica counts.
/// Covers exactly the states present; no entry has count zero.
pub(crate) fn state_counts(state_map: &InstanceStateMap) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for state in state_map.values() {
        *counts.entry(state.clone()).or_insert(0) += 1;
    }
    counts
}

#[allow(clippy::too_many_arguments)]
fn log_partition_map_state(
    resource_name: &str,
    resource: &Resource,
    partitions_need_recovery: &BTreeSet<Partition>,
    partitions_need_loadbalance: &BTreeSet<Partition>,
    partitions_loadbalance_throttled: &BTreeSet<Partition>,
    current_state: &CurrentStateOutput,
    best_possible: &PartitionStateMap,
    intermediate: &PartitionStateMap,
) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    for partition in resource.partitions() {
        if partitions_need_recovery.contains(partition) {
            debug!(resource = %resource_name, partition = %partition, "recovery balance needed");
        } else if partitions_need_loadbalance.contains(partition) {
            debug!(resource = %resource_name, partition = %partition, "load balance needed");
            if partitions_loadbalance_throttled.contains(partition) {
                debug!(resource = %resource_name, partition = %partition, "load balance throttled");
            }
        } else {
            debug!(resource = %resource_name, partition = %partition, "no balance needed");
        }

        debug!(
            partition = %partition,
            best_possible = ?best_possible.partition_map(partition),
            current = ?current_state.current_state_map(resource_name, partition),
            pending = ?current_state.pending_state_map(resource_name, partition),
            intermediate = ?intermediate.partition_map(partition),
            "partition state maps"
        );
    }
}
