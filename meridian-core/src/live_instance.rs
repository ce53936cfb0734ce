use serde::{Deserialize, Serialize};

/// A participant currently connected to the cluster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveInstance {
    instance_name: String,
    /// Declared software version; older participants may not report one.
    version: Option<String>,
}

impl LiveInstance {
    pub fn new(instance_name: impl Into<String>) -> Self {
        LiveInstance {
            instance_name: instance_name.into(),
            version: None,
        }
    }

    pub fn with_version(instance_name: impl Into<String>, version: impl Into<String>) -> Self {
        LiveInstance {
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
