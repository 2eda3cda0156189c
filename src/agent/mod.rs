pub mod hooks;
pub mod observation;
pub mod prompt;
pub mod script_loop;
pub mod state;

pub use hooks::LoopHook;
pub use prompt::{PromptContext, system_turns};
pub use script_loop::{LoopSettings, ScriptLoop, ScriptLoopRunParams};
pub use state::{LoopOutcome, LoopState, StopReason};
