//! Controller pipeline stages.
//!
//! Each stage is a free function over typed inputs; the embedding pipeline
//! decides when to run them and what to do with the outputs.

mod compatibility_check;
pub use compatibility_check::check_compatibility;

mod intermediate_state;
pub use intermediate_state::{compute_intermediate_state, StageInput};

#[cfg(test)]
mod compatibility_check_test;
