use super::defaults::default_rules;
use crate::config::{RuleConfig, RuleTarget, SafetyConfig};
use crate::error::SecurityError;
use crate::script::ValidationResult;
use regex::Regex;

/// A compiled refusal rule. Fires only when every pattern matches.
#[derive(Debug, Clone)]
pub struct RefusalRule {
    pub id: String,
    pub reason: String,
    pub target: RuleTarget,
    all_of: Vec<Regex>,
}

impl RefusalRule {
    pub fn compile(config: &RuleConfig) -> Result<Self, SecurityError> {
        if config.patterns.is_empty() {
            return Err(SecurityError::InvalidRule {
                id: config.id.clone(),
                message: "rule has no patterns".into(),
            });
        }
        let all_of = config
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| SecurityError::InvalidRule {
                    id: config.id.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: config.id.clone(),
            reason: config.reason.clone(),
            target: config.target,
            all_of,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.all_of.iter().all(|pattern| pattern.is_match(text))
    }
}

/// Heuristic pre-execution check over the request and the script text.
///
/// Advisory only: a determined script can always get past a text match.
#[derive(Debug, Clone, Default)]
pub struct SafetyGate {
    rules: Vec<RefusalRule>,
}

impl SafetyGate {
    /// Gate with every built-in rule enabled.
    pub fn with_defaults() -> Result<Self, SecurityError> {
        Self::from_config(&SafetyConfig::default())
    }

    /// Gate that lets everything through.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SafetyConfig) -> Result<Self, SecurityError> {
        if !config.enabled {
            tracing::warn!("safety gate disabled by configuration");
            return Ok(Self::disabled());
        }

        let rules = default_rules()
            .iter()
            .filter(|rule| !config.disabled_rules.iter().any(|id| id == &rule.id))
            .chain(config.extra_rules.iter())
            .map(RefusalRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rules = rules.len(), "safety gate ready");
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RefusalRule] {
        &self.rules
    }

    /// First rule that fires for this request/script pair.
    pub fn find_violation(&self, request: &str, code: &str) -> Option<&RefusalRule> {
        self.rules.iter().find(|rule| {
            let text = match rule.target {
                RuleTarget::Code => code,
                RuleTarget::Request => request,
            };
            rule.matches(text)
        })
    }

    /// `Valid` or `Refused(reason)`.
    pub fn check(&self, request: &str, code: &str) -> ValidationResult {
        match self.find_violation(request, code) {
            Some(rule) => {
                tracing::warn!(rule = %rule.id, target = %rule.target, "safety gate refused script");
                ValidationResult::Refused(rule.reason.clone())
            }
            None => ValidationResult::Valid,
        }
    }
}
