//! Built-in fantasy rulesets
//!
//! The YAML document is embedded at compile time and parsed on first use.

use std::sync::OnceLock;

use crate::scoring::RulesetRegistry;

/// Built-in rulesets YAML (compile-time embedded)
pub const RULESETS_YAML: &str = include_str!("../../../../data/scoring/rulesets.yaml");

static BUILTIN_RULESETS: OnceLock<RulesetRegistry> = OnceLock::new();

/// Built-in ruleset registry, parsed once and cached.
///
/// # Panics
///
/// Panics if the embedded YAML is malformed. The document ships with the
/// binary, so this only happens on a broken build.
pub fn builtin_rulesets() -> &'static RulesetRegistry {
    BUILTIN_RULESETS.get_or_init(|| {
        RulesetRegistry::from_yaml(RULESETS_YAML)
            .unwrap_or_else(|e| panic!("embedded rulesets.yaml is invalid: {e}"))
    })
}
