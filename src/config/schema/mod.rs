mod agent;
mod core;
mod executor;
mod logging;
mod safety;

pub use agent::AgentConfig;
pub use core::{Config, ReliabilityConfig};
pub use executor::ExecutorConfig;
pub use logging::LoggingConfig;
pub use safety::{RuleConfig, RuleTarget, SafetyConfig};
