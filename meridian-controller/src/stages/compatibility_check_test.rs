//! Unit Tests for the Version Compatibility Gate
//!
//! Tests primary-version extraction, the lexicographic controller/participant
//! comparison, the static incompatible-pair set, and the fatal/skip policy
//! for missing versions.

use meridian_core::{ClusterConfig, LiveInstance, StageError};

use crate::cluster_cache::{ClusterDataCache, ControllerContext};
use crate::stages::compatibility_check::{check_compatibility, primary_version};

fn cache_with_participants(participants: &[LiveInstance]) -> ClusterDataCache {
    let mut cache = ClusterDataCache::new(ClusterConfig::new("test-cluster"));
    for participant in participants {
        cache.add_live_instance(participant.clone());
    }
    cache
}

/// **Test:** Primary Version Extraction
///
/// **Reason:** The whole gate keys off the two-segment prefix; getting the
/// second-dot boundary wrong would compare full versions instead.
///
/// **Expectation:** `0.6.1.3` -> `0.6`; short versions are their own primary.
#[test]
fn test_primary_version_extraction() {
    assert_eq!(primary_version("0.6.1.3"), "0.6");
    assert_eq!(primary_version("0.6.1"), "0.6");
    assert_eq!(primary_version("0.6"), "0.6");
    assert_eq!(primary_version("1"), "1");
}

/// **Test:** Newer Controller Is Compatible
///
/// **Reason:** A controller ahead of its participants is the normal rolling-
/// upgrade posture and must pass unless the pair is explicitly denied.
///
/// **Expectation:** Controller 0.6.1.3 with participant 0.5.2.0 passes:
/// (0.6, 0.5) is not in the incompatible set and 0.6 > 0.5.
#[test]
fn test_newer_controller_is_compatible() {
    let controller = ControllerContext::with_version("controller-1", "0.6.1.3");
    let cache = cache_with_participants(&[
        LiveInstance::with_version("node-1", "0.5.2.0"),
        LiveInstance::with_version("node-2", "0.6.1.3"),
    ]);

    assert!(check_compatibility(&controller, &cache).is_ok());
}

/// **Test:** Older Controller Is Incompatible
///
/// **Reason:** A participant ahead of the controller may rely on protocol
/// features the controller lacks; the pipeline must not continue.
///
/// **Expectation:** Controller 0.5.x against participant 0.6.x fails, naming
/// both sides and both versions.
#[test]
fn test_older_controller_is_incompatible() {
    let controller = ControllerContext::with_version("controller-1", "0.5.2.0");
    let cache = cache_with_participants(&[LiveInstance::with_version("node-1", "0.6.1.3")]);

    let err = check_compatibility(&controller, &cache).unwrap_err();
    match err {
        StageError::IncompatibleVersion {
            controller,
            controller_version,
            participant,
            participant_version,
        } => {
            assert_eq!(controller, "controller-1");
            assert_eq!(controller_version, "0.5.2.0");
            assert_eq!(participant, "node-1");
            assert_eq!(participant_version, "0.6.1.3");
        }
        other => panic!("expected IncompatibleVersion, got {other:?}"),
    }
}

/// **Test:** Denied Pair Is Incompatible Despite Newer Controller
///
/// **Reason:** Some pairs are known broken regardless of ordering; the static
/// incompatible set must override the lexicographic rule.
///
/// **Expectation:** Controller 0.4.x with participant 0.3.x fails because
/// (0.4, 0.3) is in the set.
#[test]
fn test_denied_pair_is_incompatible() {
    let controller = ControllerContext::with_version("controller-1", "0.4.0.1");
    let cache = cache_with_participants(&[LiveInstance::with_version("node-1", "0.3.9.2")]);

    assert!(matches!(
        check_compatibility(&controller, &cache),
        Err(StageError::IncompatibleVersion { .. })
    ));
}

/// **Test:** Missing Controller Version Is Fatal
///
/// **Expectation:** `MissingControllerVersion` naming the controller
/// instance, before any participant is inspected.
#[test]
fn test_missing_controller_version_is_fatal() {
    let controller = ControllerContext::new("controller-1");
    let cache = cache_with_participants(&[LiveInstance::with_version("node-1", "0.6.1.3")]);

    let err = check_compatibility(&controller, &cache).unwrap_err();
    match err {
        StageError::MissingControllerVersion { instance } => {
            assert_eq!(instance, "controller-1");
        }
        other => panic!("expected MissingControllerVersion, got {other:?}"),
    }
}

/// **Test:** Missing Participant Version Is Skipped
///
/// **Reason:** Participants predating version reporting are tolerated; the
/// check is skipped with a warning rather than failing the pipeline.
///
/// **Expectation:** A versionless participant passes; its versioned peers are
/// still checked.
#[test]
fn test_missing_participant_version_is_skipped() {
    let controller = ControllerContext::with_version("controller-1", "0.6.1.3");
    let cache = cache_with_participants(&[
        LiveInstance::new("node-1"),
        LiveInstance::with_version("node-2", "0.6.0.0"),
    ]);

    assert!(check_compatibility(&controller, &cache).is_ok());

    // A versionless peer does not mask an incompatible one.
    let cache = cache_with_participants(&[
        LiveInstance::new("node-1"),
        LiveInstance::with_version("node-2", "0.7.0.0"),
    ]);
    assert!(matches!(
        check_compatibility(&controller, &cache),
        Err(StageError::IncompatibleVersion { .. })
    ));
}

/// **Test:** Equal Primary Versions Are Compatible
///
/// **Expectation:** Identical primaries with different patch levels pass.
#[test]
fn test_equal_primary_versions_are_compatible() {
    let controller = ControllerContext::with_version("controller-1", "0.6.0.0");
    let cache = cache_with_participants(&[LiveInstance::with_version("node-1", "0.6.9.9")]);

    assert!(check_compatibility(&controller, &cache).is_ok());
}
