use std::collections::BTreeMap;

use meridian_core::{ClusterConfig, RebalanceType, ThrottleLimits};

const CHARGEABLE_TYPES: [RebalanceType; 2] =
    [RebalanceType::RecoveryBalance, RebalanceType::LoadBalance];

/// Multi-level admission ledger for state transitions.
///
/// Tracks how many transitions have been admitted (or were already in flight)
/// at cluster, resource and instance scope, per rebalance type, within one
/// pipeline run. Quotas come from `StateTransitionThrottleConfig`; an absent
/// limit never throttles. The ledger lives and dies with one invocation of
/// the intermediate computer and must not be shared across invocations.
#[derive(Debug)]
pub(crate) struct StateTransitionThrottleController {
    enabled: bool,
    recovery_limits: ThrottleLimits,
    load_limits: ThrottleLimits,
    cluster_charges: BTreeMap<RebalanceType, u64>,
    resource_charges: BTreeMap<(RebalanceType, String), u64>,
    instance_charges: BTreeMap<(RebalanceType, String), u64>,
}

impl StateTransitionThrottleController {
    pub(crate) fn new<'a>(
        resources: impl IntoIterator<Item = &'a String>,
        cluster_config: &ClusterConfig,
        live_instances: impl IntoIterator<Item = &'a String>,
    ) -> Self {
        let throttle = &cluster_config.state_transition_throttle;

        let mut resource_charges = BTreeMap::new();
        for resource in resources {
            for rebalance_type in CHARGEABLE_TYPES {
                resource_charges.insert((rebalance_type, resource.clone()), 0);
            }
        }

        let mut instance_charges = BTreeMap::new();
        for instance in live_instances {
            for rebalance_type in CHARGEABLE_TYPES {
                instance_charges.insert((rebalance_type, instance.clone()), 0);
            }
        }

        StateTransitionThrottleController {
            enabled: throttle.enabled,
            recovery_limits: throttle.recovery_balance.clone(),
            load_limits: throttle.load_balance.clone(),
            cluster_charges: BTreeMap::new(),
            resource_charges,
            instance_charges,
        }
    }

    pub(crate) fn is_throttle_enabled(&self) -> bool {
        self.enabled
    }

    /// True once the resource has used up its quota for this rebalance type.
    /// Cluster-scope saturation short-circuits the per-resource check.
    pub(crate) fn throttle_for_resource(
        &self,
        rebalance_type: RebalanceType,
        resource: &str,
    ) -> bool {
        if self.cluster_quota_reached(rebalance_type) {
            return true;
        }
        let Some(limit) = self.limits(rebalance_type).and_then(|l| l.resource) else {
            return false;
        };
        self.resource_charge_count(rebalance_type, resource) >= limit
    }

    /// True once the instance has used up its quota for this rebalance type.
    /// Cluster-scope saturation short-circuits the per-instance check.
    pub(crate) fn throttle_for_instance(
        &self,
        rebalance_type: RebalanceType,
        instance: &str,
    ) -> bool {
        if self.cluster_quota_reached(rebalance_type) {
            return true;
        }
        let Some(limit) = self.limits(rebalance_type).and_then(|l| l.instance) else {
            return false;
        };
        self.instance_charge_count(rebalance_type, instance) >= limit
    }

    pub(crate) fn charge_cluster(&mut self, rebalance_type: RebalanceType) {
        *self.cluster_charges.entry(rebalance_type).or_insert(0) += 1;
    }

    pub(crate) fn charge_resource(&mut self, rebalance_type: RebalanceType, resource: &str) {
        *self
            .resource_charges
            .entry((rebalance_type, resource.to_string()))
            .or_insert(0) += 1;
    }

    pub(crate) fn charge_instance(&mut self, rebalance_type: RebalanceType, instance: &str) {
        *self
            .instance_charges
            .entry((rebalance_type, instance.to_string()))
            .or_insert(0) += 1;
    }

    fn limits(&self, rebalance_type: RebalanceType) -> Option<&ThrottleLimits> {
        match rebalance_type {
            RebalanceType::None => None,
            RebalanceType::RecoveryBalance => Some(&self.recovery_limits),
            RebalanceType::LoadBalance => Some(&self.load_limits),
        }
    }

    fn cluster_quota_reached(&self, rebalance_type: RebalanceType) -> bool {
        let Some(limit) = self.limits(rebalance_type).and_then(|l| l.cluster) else {
            return false;
        };
        self.cluster_charges.get(&rebalance_type).copied().unwrap_or(0) >= limit
    }

    fn resource_charge_count(&self, rebalance_type: RebalanceType, resource: &str) -> u64 {
        self.resource_charges
            .get(&(rebalance_type, resource.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn instance_charge_count(&self, rebalance_type: RebalanceType, instance: &str) -> u64 {
        self.instance_charges
            .get(&(rebalance_type, instance.to_string()))
            .copied()
            .unwrap_or(0)
    }
}
