use serde::{Deserialize, Serialize};

/// State name every cluster defines regardless of the state model: the
/// replica has been dropped from its instance.
pub const DROPPED_STATE: &str = "DROPPED";

/// State name every cluster defines regardless of the state model: the
/// replica failed a transition and is parked.
pub const ERROR_STATE: &str = "ERROR";

/// Definition of a replica state model: the states ordered by priority
/// (highest first) and the state a replica occupies before any transition.
///
/// The priority list is a total order. `DROPPED`, `ERROR` and the initial
/// state are reserved: a replica-count deficit in any of them never makes a
/// partition a recovery candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateModelDefinition {
    name: String,
    states_priority_list: Vec<String>,
    initial_state: String,
}

impl StateModelDefinition {
    pub fn new(
        name: impl Into<String>,
        states_priority_list: Vec<String>,
        initial_state: impl Into<String>,
    ) -> Self {
        StateModelDefinition {
            name: name.into(),
            states_priority_list,
            initial_state: initial_state.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// States ordered from highest to lowest priority.
    pub fn states_priority_list(&self) -> &[String] {
        &self.states_priority_list
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    /// True for `DROPPED`, `ERROR` and the declared initial state.
    pub fn is_reserved_state(&self, state: &str) -> bool {
        state == DROPPED_STATE || state == ERROR_STATE || state == self.initial_state
    }
}
