use thiserror::Error;

pub type Result<T> = std::result::Result<T, StageError>;

/// Fatal errors surfaced by controller pipeline stages.
///
/// None of these are caught or retried inside the core; they propagate to the
/// pipeline caller. A throttled partition is a valid outcome, not an error.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Missing stage attributes: {0}")]
    MissingInputs(String),

    #[error("Missing version of controller: {instance}; pipeline will not continue")]
    MissingControllerVersion { instance: String },

    #[error(
        "Cluster manager versions are incompatible; pipeline will not continue. \
         controller: {controller}, controller version: {controller_version}; \
         participant: {participant}, participant version: {participant_version}"
    )]
    IncompatibleVersion {
        controller: String,
        controller_version: String,
        participant: String,
        participant_version: String,
    },
}
