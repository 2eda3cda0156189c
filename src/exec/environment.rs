use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Variables passed through when the parent environment is not inherited.
/// Only functional variables are included, never API keys or secrets.
pub const SAFE_ENV_VARS: &[&str] = &[
    "PATH", "HOME", "TERM", "LANG", "LC_ALL", "LC_CTYPE", "USER", "SHELL", "TMPDIR", "TZ",
];

/// Working directory and variables every script runs against.
///
/// One handle lives for the whole session and is shared by every execution;
/// nothing is snapshotted or reset between turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    cwd: PathBuf,
    vars: BTreeMap<String, String>,
    inherit_env: bool,
}

impl Environment {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            vars: BTreeMap::new(),
            inherit_env: true,
        }
    }

    pub fn current() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    #[must_use]
    pub fn with_inherit_env(mut self, inherit_env: bool) -> Self {
        self.inherit_env = inherit_env;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn set_cwd(&mut self, cwd: impl Into<PathBuf>) {
        self.cwd = cwd.into();
    }

    pub fn inherit_env(&self) -> bool {
        self.inherit_env
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove_var(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Configure `cmd` with this environment's directory and variables.
    pub fn apply(&self, cmd: &mut Command) {
        cmd.current_dir(&self.cwd);
        if !self.inherit_env {
            cmd.env_clear();
            for var in SAFE_ENV_VARS {
                if let Ok(val) = std::env::var(var) {
                    cmd.env(var, val);
                }
            }
        }
        cmd.envs(&self.vars);
    }
}
