use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Program and leading arguments; the script source is appended last.
    #[serde(default = "default_interpreter")]
    pub interpreter: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// When false only a small allow-list of variables reaches the script.
    #[serde(default = "default_inherit_env")]
    pub inherit_env: bool,
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

fn default_interpreter() -> Vec<String> {
    vec!["python3".into(), "-u".into(), "-c".into()]
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_inherit_env() -> bool {
    true
}

fn default_max_output_bytes() -> usize {
    1_048_576
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            timeout_secs: default_timeout_secs(),
            inherit_env: default_inherit_env(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}
