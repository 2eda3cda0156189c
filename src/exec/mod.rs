pub mod environment;
pub mod executor;
pub mod interrupt;
pub mod process;

pub use environment::{Environment, SAFE_ENV_VARS};
pub use executor::{ExecutionRequest, ExecutionResult, ScriptExecutor};
pub use interrupt::Interrupts;
pub use process::ProcessExecutor;
