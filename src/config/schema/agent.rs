use serde::{Deserialize, Serialize};

/// Loop controller limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Generated candidates allowed per request.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Sentinel phrase a script prints once the task is finished.
    #[serde(default = "default_terminal_marker")]
    pub terminal_marker: String,
    /// Observation text fed back to the model is cut to this many chars.
    #[serde(default = "default_max_observation_chars")]
    pub max_observation_chars: usize,
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
}

fn default_max_iterations() -> u32 {
    10
}

fn default_terminal_marker() -> String {
    "TASK COMPLETE".into()
}

fn default_max_observation_chars() -> usize {
    12_000
}

fn default_generation_timeout_secs() -> u64 {
    180
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            terminal_marker: default_terminal_marker(),
            max_observation_chars: default_max_observation_chars(),
            generation_timeout_secs: default_generation_timeout_secs(),
        }
    }
}
