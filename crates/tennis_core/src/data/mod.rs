//! Data embedded into the binary.
//! - Fantasy scoring rulesets

pub mod rulesets;

pub use rulesets::{builtin_rulesets, RULESETS_YAML};
