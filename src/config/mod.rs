pub mod schema;

pub use schema::{
    AgentConfig, Config, ExecutorConfig, LoggingConfig, ReliabilityConfig, RuleConfig, RuleTarget,
    SafetyConfig,
};
