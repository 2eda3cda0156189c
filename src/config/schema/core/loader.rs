use super::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_in(&home.join(".scriptpilot"))
    }

    /// Load `config.toml` from `dir`, writing defaults there on first run.
    ///
    /// Env overrides are applied but the result is not validated: command-line
    /// flags still have to be folded in, so callers run [`Config::validate`].
    pub fn load_or_init_in(dir: &Path) -> Result<Self> {
        let config_path = dir.join("config.toml");

        if !dir.exists() {
            fs::create_dir_all(dir).context("Failed to create .scriptpilot directory")?;
        }

        let mut config = if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path.clone_from(&config_path);
            config.config_dir = dir.to_path_buf();
            config
        } else {
            let config = Self {
                config_path: config_path.clone(),
                config_dir: dir.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            tracing::info!(path = %config_path.display(), "wrote default config");
            config
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Validation(message));

        if !(0.0..=2.0).contains(&self.default_temperature) {
            return invalid(format!(
                "default_temperature must be within 0.0..=2.0, got {}",
                self.default_temperature
            ));
        }
        if self.agent.max_iterations == 0 {
            return invalid("agent.max_iterations must be at least 1".into());
        }
        if self.agent.terminal_marker.trim().is_empty() {
            return invalid("agent.terminal_marker must not be empty".into());
        }
        if self.agent.generation_timeout_secs == 0 {
            return invalid("agent.generation_timeout_secs must be greater than 0".into());
        }
        if self.executor.timeout_secs == 0 {
            return invalid("executor.timeout_secs must be greater than 0".into());
        }
        if self.reliability.request_timeout_secs == 0 {
            return invalid("reliability.request_timeout_secs must be greater than 0".into());
        }
        if self
            .executor
            .interpreter
            .first()
            .is_none_or(|program| program.trim().is_empty())
        {
            return invalid("executor.interpreter must name a program".into());
        }

        for rule in &self.safety.extra_rules {
            if rule.id.trim().is_empty() {
                return invalid("safety.extra_rules entries need an id".into());
            }
            if rule.patterns.is_empty() {
                return invalid(format!("safety rule {} has no patterns", rule.id));
            }
            for pattern in &rule.patterns {
                if let Err(e) = regex::Regex::new(pattern) {
                    return invalid(format!("safety rule {} has an invalid pattern: {e}", rule.id));
                }
            }
        }

        Ok(())
    }
}
