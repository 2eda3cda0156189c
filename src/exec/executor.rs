use super::environment::Environment;
use crate::error::ExecError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What happened when a script ran. Exactly one per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Completed {
        output: String,
        had_terminal_marker: bool,
    },
    Failed {
        error_text: String,
    },
    TimedOut {
        timeout: Duration,
        partial_output: String,
    },
}

impl ExecutionResult {
    /// Successful run; the marker check is a plain substring search.
    pub fn completed(output: impl Into<String>, terminal_marker: &str) -> Self {
        let output = output.into();
        let had_terminal_marker = !terminal_marker.is_empty() && output.contains(terminal_marker);
        Self::Completed {
            output,
            had_terminal_marker,
        }
    }

    pub fn failed(error_text: impl Into<String>) -> Self {
        Self::Failed {
            error_text: error_text.into(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn has_terminal_marker(&self) -> bool {
        matches!(
            self,
            Self::Completed {
                had_terminal_marker: true,
                ..
            }
        )
    }

    /// Captured text regardless of outcome.
    pub fn output(&self) -> &str {
        match self {
            Self::Completed { output, .. } => output,
            Self::Failed { error_text } => error_text,
            Self::TimedOut { partial_output, .. } => partial_output,
        }
    }
}

/// Everything one execution needs.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionRequest<'a> {
    pub code: &'a str,
    pub env: &'a Environment,
    pub terminal_marker: &'a str,
    pub cancel: &'a CancellationToken,
}

/// Runs validated scripts.
///
/// Script failures (non-zero exit, timeout, interruption) are reported as
/// [`ExecutionResult`] values. `Err` is reserved for a broken environment,
/// such as an interpreter that cannot be spawned.
pub trait ScriptExecutor: Send + Sync {
    fn name(&self) -> &str;

    fn execute<'a>(
        &'a self,
        request: ExecutionRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult, ExecError>> + Send + 'a>>;
}
