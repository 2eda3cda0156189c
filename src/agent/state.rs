use strum::Display;

/// Phases of the generate–validate–execute–feedback loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LoopState {
    AwaitingScript,
    Executing,
    AwaitingNextTurn,
    Done,
    Aborted,
}

impl LoopState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A script printed the terminal marker.
    Completed,
    /// The configured number of candidates was used up.
    IterationLimit,
    /// The safety gate vetoed a script.
    Refused(String),
    /// The generator failed or did not answer in time.
    GeneratorUnavailable(String),
    /// The user declined to run a script in leash mode.
    Declined,
    /// Ctrl-C before the next generation.
    Interrupted,
}

impl StopReason {
    /// Terminal state this reason lands in.
    pub fn state(&self) -> LoopState {
        match self {
            Self::Completed => LoopState::Done,
            _ => LoopState::Aborted,
        }
    }
}

/// Final result of one [`super::ScriptLoop::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub state: LoopState,
    pub stop_reason: StopReason,
    /// Last captured output on success, otherwise the abort notice or refusal reason.
    pub final_output: String,
    /// Candidates generated.
    pub iterations: u32,
    /// Scripts actually executed.
    pub executions: u32,
}

impl LoopOutcome {
    pub fn new(
        stop_reason: StopReason,
        final_output: impl Into<String>,
        iterations: u32,
        executions: u32,
    ) -> Self {
        Self {
            state: stop_reason.state(),
            stop_reason,
            final_output: final_output.into(),
            iterations,
            executions,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == LoopState::Done
    }

    /// Process exit code for a single-shot run.
    pub fn exit_code(&self) -> u8 {
        if self.is_done() { 0 } else { 1 }
    }
}
