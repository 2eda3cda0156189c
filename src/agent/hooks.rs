use super::state::LoopState;
use crate::exec::ExecutionResult;
use crate::session::Turn;

/// Lifecycle hook for the script loop.
///
/// Hooks are invoked at four points:
/// 1. On every state transition (`on_state_change`)
/// 2. When a script has been extracted (`on_script`)
/// 3. After each execution (`on_execution`)
/// 4. After every turn appended to the conversation (`on_turn`)
///
/// All methods default to no-ops. Hooks observe; they cannot alter the loop.
pub trait LoopHook: Send + Sync + std::fmt::Debug {
    fn on_state_change(&self, _from: LoopState, _to: LoopState) {}

    fn on_script(&self, _iteration: u32, _code: &str) {}

    fn on_execution(&self, _result: &ExecutionResult) {}

    fn on_turn(&self, _turn: &Turn) {}
}
