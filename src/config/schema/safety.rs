use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ask before every script runs.
    #[serde(default)]
    pub leash: bool,
    /// Built-in rule ids to switch off.
    #[serde(default)]
    pub disabled_rules: Vec<String>,
    #[serde(default)]
    pub extra_rules: Vec<RuleConfig>,
}

fn default_true() -> bool {
    true
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            leash: false,
            disabled_rules: Vec::new(),
            extra_rules: Vec::new(),
        }
    }
}

/// What a refusal rule is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RuleTarget {
    #[default]
    Code,
    Request,
}

/// User-defined refusal rule. Every pattern must match for the rule to fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub id: String,
    pub reason: String,
    #[serde(default)]
    pub target: RuleTarget,
    pub patterns: Vec<String>,
}
