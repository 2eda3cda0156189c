use crate::config::Config;
use clap::Parser;

/// `scriptpilot` - turns plain-language requests into Python scripts and runs them.
#[derive(Parser, Debug)]
#[command(name = "scriptpilot")]
#[command(version)]
#[command(
    about = "Ask for something in plain language; a model writes Python scripts and runs them until the task is done.",
    long_about = None
)]
pub struct Cli {
    /// The request. Omit it to start an interactive session.
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,

    /// Show each script and ask before running it
    #[arg(long)]
    pub leash: bool,

    /// Scripts to generate before giving up
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<u32>,

    /// Model to use (overrides default_model)
    #[arg(long)]
    pub model: Option<String>,

    /// Per-script execution timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Don't write a session log
    #[arg(long)]
    pub no_log: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The prompt words joined back into one request, if any were given.
    pub fn request(&self) -> Option<String> {
        let joined = self.prompt.join(" ");
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Fold command-line flags into the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(n) = self.max_iterations {
            config.agent.max_iterations = n;
        }
        if let Some(model) = self.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            config.default_model = model.to_string();
        }
        if let Some(secs) = self.timeout {
            config.executor.timeout_secs = secs;
        }
        if self.leash {
            config.safety.leash = true;
        }
        if self.no_log {
            config.logging.enabled = false;
        }
    }
}
