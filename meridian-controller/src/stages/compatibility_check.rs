use tracing::{info, warn};

use meridian_core::{Result, StageError};

use crate::cluster_cache::{ClusterDataCache, ControllerContext};

/// Primary-version pairs (controller, participant) that cannot cooperate
/// even though the controller version is the newer of the two.
static INCOMPATIBLE_VERSION_PAIRS: &[(&str, &str)] = &[("0.4", "0.3")];

/// Rejects controller/participant pairs whose declared primary versions are
/// incompatible, before any state computation runs.
///
/// A participant without a declared version is skipped with a warning; a
/// controller without one is fatal. Any incompatible live participant fails
/// the whole pipeline step, naming the offending instance. Instances are
/// visited in sorted name order so the instance named in the error is
/// deterministic.
pub fn check_compatibility(
    controller: &ControllerContext,
    cache: &ClusterDataCache,
) -> Result<()> {
    let Some(controller_version) = controller.version() else {
        return Err(StageError::MissingControllerVersion {
            instance: controller.instance_name().to_string(),
        });
    };

    for (instance_name, live_instance) in cache.get_live_instances() {
        let Some(participant_version) = live_instance.version() else {
            warn!(
                instance = %instance_name,
                "missing version of participant, skipping version check"
            );
            continue;
        };

        if !is_compatible(controller_version, participant_version) {
            return Err(StageError::IncompatibleVersion {
                controller: controller.instance_name().to_string(),
                controller_version: controller_version.to_string(),
                participant: instance_name.clone(),
                participant_version: participant_version.to_string(),
            });
        }
    }

    Ok(())
}

fn is_compatible(controller_version: &str, participant_version: &str) -> bool {
    let controller_primary = primary_version(controller_version);
    let participant_primary = primary_version(participant_version);

    if controller_primary < participant_primary {
        info!(
            controller_version = %controller_version,
            participant_version = %participant_version,
            "controller primary version is less than participant primary version"
        );
        return false;
    }

    !INCOMPATIBLE_VERSION_PAIRS
        .iter()
        .any(|&(controller, participant)| {
            controller == controller_primary && participant == participant_primary
        })
}

/// First two dot-separated segments of a version string (`0.6.1.3` -> `0.6`).
/// A version with fewer than two separators is its own primary version.
pub(crate) fn primary_version(version: &str) -> &str {
    match version.match_indices('.').nth(1) {
        Some((idx, _)) => &version[..idx],
        None => version,
    }
}
