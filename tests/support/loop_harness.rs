#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use scriptpilot::agent::{
    LoopHook, LoopOutcome, LoopSettings, LoopState, ScriptLoop, ScriptLoopRunParams,
};
use scriptpilot::error::{ExecError, PilotError, SecurityError};
use scriptpilot::exec::{
    Environment, ExecutionRequest, ExecutionResult, Interrupts, ScriptExecutor,
};
use scriptpilot::llm::{Provider, ProviderMessage, ProviderResponse};
use scriptpilot::script::PythonValidator;
use scriptpilot::security::{ApprovalDecision, AutoApprove, ExecutionApprover, SafetyGate};
use scriptpilot::session::{Conversation, Turn};
use scriptpilot::usage::CostMeter;
use tempfile::TempDir;

pub const MODEL: &str = "gpt-4-turbo-preview";

/// Wrap a script the way the model is told to.
pub fn fenced(code: &str) -> String {
    format!("Here you go:\n```python\n{code}\n```")
}

// ── Provider ─────────────────────────────────────────────────────────────────

pub enum Reply {
    Text(ProviderResponse),
    Fail(&'static str),
    Stall(Duration),
}

pub fn reply(text: impl Into<String>) -> Reply {
    Reply::Text(ProviderResponse::text_only(text))
}

pub fn script(code: &str) -> Reply {
    reply(fenced(code))
}

/// Hands out scripted replies in order and records every request.
#[derive(Default)]
pub struct MockProvider {
    replies: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<Vec<ProviderMessage>>>,
}

impl MockProvider {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn seen_messages(&self) -> Vec<Vec<ProviderMessage>> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn chat<'a>(
        &'a self,
        messages: &'a [ProviderMessage],
        _model: &'a str,
        _temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ProviderResponse>> + Send + 'a>> {
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(messages.to_vec());
            let next = self
                .replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            match next {
                Some(Reply::Text(response)) => Ok(response),
                Some(Reply::Fail(message)) => anyhow::bail!("{message}"),
                Some(Reply::Stall(delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok(ProviderResponse::text_only("too late"))
                }
                None => anyhow::bail!("mock provider has no replies left"),
            }
        })
    }
}

// ── Executor ─────────────────────────────────────────────────────────────────

pub enum Run {
    Output(&'static str),
    Fail(&'static str),
    Timeout(&'static str),
    /// Simulates Ctrl-C while the script is running.
    Interrupted,
}

/// Returns scripted results and records every script it was asked to run.
pub struct RecordingExecutor {
    runs: Mutex<VecDeque<Run>>,
    executed: Mutex<Vec<String>>,
    interrupts: Arc<Interrupts>,
}

impl RecordingExecutor {
    pub fn new(runs: Vec<Run>, interrupts: Arc<Interrupts>) -> Self {
        Self {
            runs: Mutex::new(VecDeque::from(runs)),
            executed: Mutex::new(Vec::new()),
            interrupts,
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ScriptExecutor for RecordingExecutor {
    fn name(&self) -> &str {
        "recording"
    }

    fn execute<'a>(
        &'a self,
        request: ExecutionRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult, ExecError>> + Send + 'a>> {
        Box::pin(async move {
            self.executed
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request.code.to_string());
            let next = self
                .runs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            Ok(match next {
                Some(Run::Output(text)) => ExecutionResult::completed(text, request.terminal_marker),
                Some(Run::Fail(text)) => ExecutionResult::failed(text),
                Some(Run::Timeout(partial)) => ExecutionResult::TimedOut {
                    timeout: Duration::from_secs(2),
                    partial_output: partial.to_string(),
                },
                Some(Run::Interrupted) => {
                    self.interrupts.trigger();
                    request.cancel.cancelled().await;
                    ExecutionResult::failed("interrupted by user")
                }
                None => ExecutionResult::completed("", request.terminal_marker),
            })
        })
    }
}

// ── Approvers and hooks ──────────────────────────────────────────────────────

pub struct DeclineAll;

impl ExecutionApprover for DeclineAll {
    fn approve<'a>(
        &'a self,
        _code: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ApprovalDecision, SecurityError>> + Send + 'a>> {
        Box::pin(async move { Ok(ApprovalDecision::Declined) })
    }
}

#[derive(Debug, Default)]
pub struct RecordingHook {
    transitions: Mutex<Vec<(LoopState, LoopState)>>,
    scripts: Mutex<Vec<(u32, String)>>,
    turns: Mutex<Vec<Turn>>,
}

impl RecordingHook {
    pub fn transitions(&self) -> Vec<(LoopState, LoopState)> {
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn scripts(&self) -> Vec<(u32, String)> {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.turns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LoopHook for RecordingHook {
    fn on_state_change(&self, from: LoopState, to: LoopState) {
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((from, to));
    }

    fn on_script(&self, iteration: u32, code: &str) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((iteration, code.to_string()));
    }

    fn on_turn(&self, turn: &Turn) {
        self.turns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(turn.clone());
    }
}

// ── Harness ──────────────────────────────────────────────────────────────────

/// One loop's collaborators, wired the way the CLI wires them.
pub struct LoopHarness {
    pub provider: MockProvider,
    pub executor: RecordingExecutor,
    pub interrupts: Arc<Interrupts>,
    pub settings: LoopSettings,
    pub gate: SafetyGate,
    pub approver: Box<dyn ExecutionApprover>,
    pub hook: Arc<RecordingHook>,
    pub conversation: Conversation,
    pub meter: CostMeter,
    pub workspace: TempDir,
}

impl LoopHarness {
    pub fn new(replies: Vec<Reply>, runs: Vec<Run>) -> Self {
        let interrupts = Arc::new(Interrupts::new());
        Self {
            provider: MockProvider::new(replies),
            executor: RecordingExecutor::new(runs, Arc::clone(&interrupts)),
            interrupts,
            settings: LoopSettings::default(),
            gate: SafetyGate::with_defaults().unwrap(),
            approver: Box::new(AutoApprove),
            hook: Arc::new(RecordingHook::default()),
            conversation: Conversation::new(format!("mock/{MODEL}")),
            meter: CostMeter::new(MODEL),
            workspace: TempDir::new().unwrap(),
        }
    }

    pub fn max_iterations(mut self, n: u32) -> Self {
        self.settings.max_iterations = n;
        self
    }

    pub async fn run(&mut self, request: &str) -> Result<LoopOutcome, PilotError> {
        let validator = PythonValidator::new().unwrap();
        let env = Environment::new(self.workspace.path());
        let hooks: Vec<Arc<dyn LoopHook>> = vec![self.hook.clone()];
        ScriptLoop::new(self.settings.clone())
            .run(ScriptLoopRunParams {
                provider: &self.provider,
                model: MODEL,
                temperature: 1.0,
                request,
                conversation: &mut self.conversation,
                validator: &validator,
                gate: &self.gate,
                approver: self.approver.as_ref(),
                executor: &self.executor,
                env: &env,
                interrupts: &self.interrupts,
                meter: &mut self.meter,
                hooks: &hooks,
            })
            .await
    }

    /// Contents of every observation turn, in order.
    pub fn observations(&self) -> Vec<String> {
        self.conversation
            .turns()
            .iter()
            .filter(|turn| turn.role == scriptpilot::session::Role::Observation)
            .map(|turn| turn.content.clone())
            .collect()
    }
}
