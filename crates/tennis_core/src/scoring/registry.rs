use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::table::ScoringTable;
use crate::error::{Result, SimError};

/// Named scoring tables plus the table unknown names fall back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegistryDocument")]
pub struct RulesetRegistry {
    default: String,
    rulesets: BTreeMap<String, ScoringTable>,
}

/// Unchecked registry document; validated through [`RulesetRegistry::new`].
#[derive(Deserialize)]
struct RegistryDocument {
    default: String,
    rulesets: BTreeMap<String, ScoringTable>,
}

impl TryFrom<RegistryDocument> for RulesetRegistry {
    type Error = SimError;

    fn try_from(doc: RegistryDocument) -> Result<Self> {
        Self::new(doc.default, doc.rulesets)
    }
}

/// Outcome of looking a ruleset name up in a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResolvedRuleset {
    pub requested: String,
    pub resolved: String,
    /// The requested name was unknown and the default table was used.
    pub fell_back: bool,
    #[serde(skip)]
    pub table: ScoringTable,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl RulesetRegistry {
    /// Parse a registry document (`default:` + `rulesets:` map).
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| SimError::RulesetParse(e.to_string()))
    }

    pub fn new(default: impl Into<String>, rulesets: BTreeMap<String, ScoringTable>) -> Result<Self> {
        let rulesets: BTreeMap<String, ScoringTable> =
            rulesets.into_iter().map(|(name, table)| (normalize(&name), table)).collect();
        let default = normalize(&default.into());

        if !rulesets.contains_key(&default) {
            return Err(SimError::RulesetParse(format!(
                "default ruleset '{}' is not defined",
                default
            )));
        }
        for (name, table) in &rulesets {
            let bad = table.non_finite_weights();
            if !bad.is_empty() {
                return Err(SimError::RulesetParse(format!(
                    "ruleset '{}' has non-finite weights: {}",
                    name,
                    bad.join(", ")
                )));
            }
            let fine = table.sub_milli_weights();
            if !fine.is_empty() {
                return Err(SimError::RulesetParse(format!(
                    "ruleset '{}' has weights finer than 0.001: {}",
                    name,
                    fine.join(", ")
                )));
            }
        }

        Ok(Self { default, rulesets })
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| SimError::Serialization(e.to_string()))
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rulesets.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&ScoringTable> {
        self.rulesets.get(&normalize(name))
    }

    pub fn default_table(&self) -> &ScoringTable {
        // Presence is checked in `new`.
        &self.rulesets[&self.default]
    }

    /// Look `name` up, falling back to the default table when unknown.
    ///
    /// `None` selects the default without flagging a fallback.
    pub fn resolve(&self, name: Option<&str>) -> ResolvedRuleset {
        let requested = name.map(normalize).unwrap_or_else(|| self.default.clone());

        match self.rulesets.get(&requested) {
            Some(table) => ResolvedRuleset {
                resolved: requested.clone(),
                requested,
                fell_back: false,
                table: table.clone(),
            },
            None => {
                warn!(
                    requested = %requested,
                    fallback = %self.default,
                    "unknown fantasy ruleset, using default"
                );
                ResolvedRuleset {
                    requested,
                    resolved: self.default.clone(),
                    fell_back: true,
                    table: self.default_table().clone(),
                }
            }
        }
    }
}
