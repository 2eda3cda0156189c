use serde::{Deserialize, Serialize};

/// Session record output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// `~` is expanded at write time.
    #[serde(default = "default_dir")]
    pub dir: String,
}

fn default_enabled() -> bool {
    true
}

fn default_dir() -> String {
    "~/.scriptpilot/logs".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dir: default_dir(),
        }
    }
}

impl LoggingConfig {
    pub fn resolved_dir(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(shellexpand::tilde(&self.dir).into_owned())
    }
}
