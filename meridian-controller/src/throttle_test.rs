//! Unit Tests for the State-Transition Throttle Controller
//!
//! Tests the multi-level admission ledger: per-scope quota exhaustion,
//! unbounded scopes, independence of the per-type ledgers, and the
//! cluster-scope short-circuit that gates resource and instance checks.

use meridian_core::{ClusterConfig, RebalanceType, StateTransitionThrottleConfig, ThrottleLimits};

use crate::throttle::StateTransitionThrottleController;

fn cluster_config(throttle: StateTransitionThrottleConfig) -> ClusterConfig {
    let mut config = ClusterConfig::new("test-cluster");
    config.state_transition_throttle = throttle;
    config
}

fn controller(throttle: StateTransitionThrottleConfig) -> StateTransitionThrottleController {
    let resources = vec!["db".to_string()];
    let instances = vec!["node-1".to_string(), "node-2".to_string()];
    StateTransitionThrottleController::new(&resources, &cluster_config(throttle), &instances)
}

/// **Test:** Enabled Flag Propagation
///
/// **Reason:** The global flag gates the whole mechanism; the intermediate
/// computer falls back to best-possible passthrough when it is off.
///
/// **Expectation:** `is_throttle_enabled` mirrors the configured flag.
#[test]
fn test_throttle_enabled_flag() {
    let ctl = controller(StateTransitionThrottleConfig::default());
    assert!(!ctl.is_throttle_enabled());

    let ctl = controller(StateTransitionThrottleConfig {
        enabled: true,
        ..Default::default()
    });
    assert!(ctl.is_throttle_enabled());
}

/// **Test:** Absent Limits Never Throttle
///
/// **Reason:** Absence of a configured limit means unbounded; a cluster with
/// no quotas must admit arbitrarily many transitions.
///
/// **Expectation:** After many charges at every scope, no query throttles.
#[test]
fn test_unbounded_without_limits() {
    let mut ctl = controller(StateTransitionThrottleConfig {
        enabled: true,
        ..Default::default()
    });

    for _ in 0..100 {
        ctl.charge_cluster(RebalanceType::LoadBalance);
        ctl.charge_resource(RebalanceType::LoadBalance, "db");
        ctl.charge_instance(RebalanceType::LoadBalance, "node-1");
    }

    assert!(!ctl.throttle_for_resource(RebalanceType::LoadBalance, "db"));
    assert!(!ctl.throttle_for_instance(RebalanceType::LoadBalance, "node-1"));
}

/// **Test:** Resource Quota Exhaustion
///
/// **Reason:** The per-resource ledger is the mid-level admission gate;
/// reaching its quota must flip the query exactly at the limit, not before.
///
/// **Expectation:** With a resource limit of 2, the resource throttles after
/// the second charge and only for the charged resource.
#[test]
fn test_resource_quota_reached() {
    let mut ctl = controller(StateTransitionThrottleConfig {
        enabled: true,
        load_balance: ThrottleLimits {
            resource: Some(2),
            ..Default::default()
        },
        ..Default::default()
    });

    assert!(!ctl.throttle_for_resource(RebalanceType::LoadBalance, "db"));
    ctl.charge_resource(RebalanceType::LoadBalance, "db");
    assert!(!ctl.throttle_for_resource(RebalanceType::LoadBalance, "db"));
    ctl.charge_resource(RebalanceType::LoadBalance, "db");
    assert!(ctl.throttle_for_resource(RebalanceType::LoadBalance, "db"));

    // Other resources keep their own ledger
    assert!(!ctl.throttle_for_resource(RebalanceType::LoadBalance, "cache"));
}

/// **Test:** Instance Quota Exhaustion
///
/// **Reason:** Instance-scope quotas protect individual nodes from transition
/// storms; the ledger must be keyed per instance.
///
/// **Expectation:** With an instance limit of 1, the charged instance
/// throttles and its peer does not.
#[test]
fn test_instance_quota_reached() {
    let mut ctl = controller(StateTransitionThrottleConfig {
        enabled: true,
        load_balance: ThrottleLimits {
            instance: Some(1),
            ..Default::default()
        },
        ..Default::default()
    });

    ctl.charge_instance(RebalanceType::LoadBalance, "node-1");
    assert!(ctl.throttle_for_instance(RebalanceType::LoadBalance, "node-1"));
    assert!(!ctl.throttle_for_instance(RebalanceType::LoadBalance, "node-2"));
}

/// **Test:** Per-Type Ledger Independence
///
/// **Reason:** Recovery must never consume load-balance budget and vice
/// versa; composing them would starve recovery behind optimization work.
///
/// **Expectation:** Exhausting the LOAD_BALANCE instance quota leaves
/// RECOVERY_BALANCE queries unthrottled for the same instance.
#[test]
fn test_rebalance_types_charge_separately() {
    let mut ctl = controller(StateTransitionThrottleConfig {
        enabled: true,
        recovery_balance: ThrottleLimits {
            instance: Some(1),
            ..Default::default()
        },
        load_balance: ThrottleLimits {
            instance: Some(1),
            ..Default::default()
        },
        ..Default::default()
    });

    ctl.charge_instance(RebalanceType::LoadBalance, "node-1");
    assert!(ctl.throttle_for_instance(RebalanceType::LoadBalance, "node-1"));
    assert!(!ctl.throttle_for_instance(RebalanceType::RecoveryBalance, "node-1"));
}

/// **Test:** Cluster-Scope Short-Circuit
///
/// **Reason:** A saturated cluster quota must suppress all admission for that
/// rebalance type even when resource and instance ledgers have room.
///
/// **Expectation:** After the cluster quota is consumed, both resource and
/// instance queries throttle despite having no quotas of their own.
#[test]
fn test_cluster_quota_short_circuits() {
    let mut ctl = controller(StateTransitionThrottleConfig {
        enabled: true,
        load_balance: ThrottleLimits {
            cluster: Some(1),
            ..Default::default()
        },
        ..Default::default()
    });

    assert!(!ctl.throttle_for_resource(RebalanceType::LoadBalance, "db"));
    ctl.charge_cluster(RebalanceType::LoadBalance);
    assert!(ctl.throttle_for_resource(RebalanceType::LoadBalance, "db"));
    assert!(ctl.throttle_for_instance(RebalanceType::LoadBalance, "node-1"));

    // The other rebalance type is unaffected
    assert!(!ctl.throttle_for_resource(RebalanceType::RecoveryBalance, "db"));
}

/// **Test:** NONE Type Never Throttles
///
/// **Reason:** Pending transitions of partitions needing no rebalance are
/// charged under `NONE`, which carries no quotas; the charges are recorded
/// but must never gate admission.
///
/// **Expectation:** Charging `NONE` repeatedly throttles nothing, including
/// the quota-bearing types.
#[test]
fn test_none_type_is_unbounded() {
    let mut ctl = controller(StateTransitionThrottleConfig {
        enabled: true,
        load_balance: ThrottleLimits {
            cluster: Some(1),
            ..Default::default()
        },
        ..Default::default()
    });

    for _ in 0..10 {
        ctl.charge_cluster(RebalanceType::None);
        ctl.charge_resource(RebalanceType::None, "db");
        ctl.charge_instance(RebalanceType::None, "node-1");
    }

    assert!(!ctl.throttle_for_resource(RebalanceType::None, "db"));
    assert!(!ctl.throttle_for_instance(RebalanceType::None, "node-1"));
    assert!(!ctl.throttle_for_resource(RebalanceType::LoadBalance, "db"));
}
