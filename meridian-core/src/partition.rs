use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of one partition of a resource.
///
/// Ordered so that sets and maps of partitions iterate deterministically;
/// admission decisions depend on iteration order, so this matters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partition(String);

impl Partition {
    pub fn new(name: impl Into<String>) -> Self {
        Partition(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Partition {
    fn from(name: &str) -> Self {
        Partition(name.to_string())
    }
}

/// The unit of assignment: a named set of partitions bound to a state model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    resource_name: String,
    partitions: Vec<Partition>,
    state_model_def_ref: String,
}

impl Resource {
    pub fn new(
        resource_name: impl Into<String>,
        partitions: Vec<Partition>,
        state_model_def_ref: impl Into<String>,
    ) -> Self {
        Resource {
            resource_name: resource_name.into(),
            partitions,
            state_model_def_ref: state_model_def_ref.into(),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn state_model_def_ref(&self) -> &str {
        &self.state_model_def_ref
    }
}
