use super::hooks::LoopHook;
use super::observation;
use super::state::{LoopOutcome, LoopState, StopReason};
use crate::config::AgentConfig;
use crate::error::{PilotError, TurnFault};
use crate::exec::{Environment, ExecutionRequest, ExecutionResult, Interrupts, ScriptExecutor};
use crate::llm::{Provider, messages_from_turns, scrub_secret_patterns};
use crate::script::{ScriptValidator, ValidationResult, extract};
use crate::security::{ApprovalDecision, ExecutionApprover, SafetyGate};
use crate::session::{Conversation, Turn};
use crate::usage::CostMeter;
use std::sync::Arc;
use std::time::Duration;

// ── Public types ─────────────────────────────────────────────────────────────

/// Limits for one [`ScriptLoop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSettings {
    pub max_iterations: u32,
    pub terminal_marker: String,
    pub max_observation_chars: usize,
    pub generation_timeout: Duration,
}

impl LoopSettings {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            terminal_marker: config.terminal_marker.clone(),
            max_observation_chars: config.max_observation_chars,
            generation_timeout: Duration::from_secs(config.generation_timeout_secs),
        }
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

/// Drives the generate–validate–execute–feedback cycle for one request.
pub struct ScriptLoop {
    settings: LoopSettings,
}

/// Collaborators for a single [`ScriptLoop::run`] invocation.
pub struct ScriptLoopRunParams<'a> {
    pub provider: &'a dyn Provider,
    pub model: &'a str,
    pub temperature: f64,
    pub request: &'a str,
    pub conversation: &'a mut Conversation,
    pub validator: &'a dyn ScriptValidator,
    pub gate: &'a SafetyGate,
    pub approver: &'a dyn ExecutionApprover,
    pub executor: &'a dyn ScriptExecutor,
    pub env: &'a Environment,
    pub interrupts: &'a Interrupts,
    pub meter: &'a mut CostMeter,
    pub hooks: &'a [Arc<dyn LoopHook>],
}

// ── Internal types ───────────────────────────────────────────────────────────

/// Counters and current phase, with hook fan-out.
struct RunState<'h> {
    state: LoopState,
    iterations: u32,
    executions: u32,
    hooks: &'h [Arc<dyn LoopHook>],
}

impl RunState<'_> {
    fn transition(&mut self, to: LoopState) {
        let from = self.state;
        if from == to {
            return;
        }
        tracing::debug!(%from, %to, iteration = self.iterations, "loop state change");
        for hook in self.hooks {
            hook.on_state_change(from, to);
        }
        self.state = to;
    }

    fn append(&self, conversation: &mut Conversation, turn: Turn) {
        conversation.append(turn);
        if let Some(turn) = conversation.last() {
            for hook in self.hooks {
                hook.on_turn(turn);
            }
        }
    }

    fn fault(&self, fault: &TurnFault) {
        tracing::info!(iteration = self.iterations, %fault, "recoverable turn fault");
    }

    fn finish(&mut self, reason: StopReason, final_output: impl Into<String>) -> LoopOutcome {
        self.transition(reason.state());
        LoopOutcome::new(reason, final_output, self.iterations, self.executions)
    }
}

/// What to do after a recoverable turn failure.
enum Retry {
    Continue,
    Stop(LoopOutcome),
}

fn fault_of(result: &ExecutionResult) -> Option<TurnFault> {
    match result {
        ExecutionResult::Completed { .. } => None,
        ExecutionResult::Failed { error_text } => Some(TurnFault::Runtime(
            error_text.lines().last().unwrap_or_default().to_string(),
        )),
        ExecutionResult::TimedOut { timeout, .. } => Some(TurnFault::TimedOut(timeout.as_secs())),
    }
}

// ── Implementation ───────────────────────────────────────────────────────────

impl ScriptLoop {
    pub fn new(settings: LoopSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// Run the loop for `params.request` until it reaches `Done` or `Aborted`.
    ///
    /// Recoverable faults (no script, bad syntax, runtime errors, timeouts)
    /// become observation turns. `Err` is returned only when the environment
    /// itself is broken: the interpreter cannot be spawned or the approval
    /// prompt fails.
    pub async fn run(&self, params: ScriptLoopRunParams<'_>) -> Result<LoopOutcome, PilotError> {
        let ScriptLoopRunParams {
            provider,
            model,
            temperature,
            request,
            conversation,
            validator,
            gate,
            approver,
            executor,
            env,
            interrupts,
            meter,
            hooks,
        } = params;
        let settings = &self.settings;
        let mut run = RunState {
            state: LoopState::AwaitingScript,
            iterations: 0,
            executions: 0,
            hooks,
        };

        run.append(conversation, Turn::user(request));

        loop {
            // ── AwaitingScript ───────────────────────────────────────────
            if interrupts.consume() {
                tracing::info!(iteration = run.iterations, "interrupted before generation");
                return Ok(run.finish(StopReason::Interrupted, "Interrupted by user."));
            }

            let messages = messages_from_turns(conversation.turns());
            let generated = tokio::time::timeout(
                settings.generation_timeout,
                provider.chat(&messages, model, temperature),
            )
            .await;
            let response = match generated {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    let message = scrub_secret_patterns(&e.to_string()).into_owned();
                    tracing::warn!(provider = provider.name(), "generation failed: {message}");
                    return Ok(run.finish(StopReason::GeneratorUnavailable(message.clone()), message));
                }
                Err(_) => {
                    let message = format!(
                        "{} gave no response within {}s",
                        provider.name(),
                        settings.generation_timeout.as_secs()
                    );
                    tracing::warn!("{message}");
                    return Ok(run.finish(StopReason::GeneratorUnavailable(message.clone()), message));
                }
            };

            conversation.add_cost(meter.record(response.usage));
            run.iterations += 1;
            run.append(conversation, Turn::assistant(response.text.as_str()));

            let candidate = extract(&response.text);
            let code = match candidate.code() {
                Ok(code) => code.to_string(),
                Err(error) => {
                    run.fault(&TurnFault::Extraction(error.to_string()));
                    run.append(
                        conversation,
                        Turn::observation(observation::extraction_failure(error)),
                    );
                    match self.after_turn_fault(&mut run) {
                        Retry::Continue => continue,
                        Retry::Stop(outcome) => return Ok(outcome),
                    }
                }
            };
            for hook in hooks {
                hook.on_script(run.iterations, &code);
            }

            match validator.validate(&code) {
                ValidationResult::Valid => {}
                ValidationResult::SyntaxError(issue) => {
                    run.fault(&TurnFault::Syntax(issue.to_string()));
                    run.append(conversation, Turn::observation(observation::syntax_error(&issue)));
                    match self.after_turn_fault(&mut run) {
                        Retry::Continue => continue,
                        Retry::Stop(outcome) => return Ok(outcome),
                    }
                }
                ValidationResult::Refused(reason) => {
                    run.append(conversation, Turn::observation(observation::refused(&reason)));
                    return Ok(run.finish(StopReason::Refused(reason.clone()), reason));
                }
            }

            if let ValidationResult::Refused(reason) = gate.check(request, &code) {
                run.append(conversation, Turn::observation(observation::refused(&reason)));
                return Ok(run.finish(StopReason::Refused(reason.clone()), reason));
            }

            if approver.approve(&code).await? == ApprovalDecision::Declined {
                run.append(conversation, Turn::observation(observation::declined()));
                return Ok(run.finish(StopReason::Declined, "Execution declined."));
            }

            // ── Executing ────────────────────────────────────────────────
            run.transition(LoopState::Executing);
            let cancel = interrupts.token();
            let result = executor
                .execute(ExecutionRequest {
                    code: &code,
                    env,
                    terminal_marker: &settings.terminal_marker,
                    cancel: &cancel,
                })
                .await?;
            run.executions += 1;
            if cancel.is_cancelled() {
                // The kill has been reported; the next Ctrl-C ends the session.
                interrupts.consume();
            }
            if let Some(fault) = fault_of(&result) {
                run.fault(&fault);
            }
            for hook in hooks {
                hook.on_execution(&result);
            }

            // ── AwaitingNextTurn ─────────────────────────────────────────
            run.transition(LoopState::AwaitingNextTurn);
            run.append(
                conversation,
                Turn::observation(observation::execution(
                    &result,
                    settings.max_observation_chars,
                )),
            );

            if result.has_terminal_marker() {
                tracing::info!(
                    iterations = run.iterations,
                    executions = run.executions,
                    "terminal marker seen"
                );
                return Ok(run.finish(StopReason::Completed, result.output()));
            }
            if run.iterations >= settings.max_iterations {
                return Ok(self.iteration_limit(&mut run));
            }
            run.transition(LoopState::AwaitingScript);
        }
    }

    fn after_turn_fault(&self, run: &mut RunState<'_>) -> Retry {
        if run.iterations >= self.settings.max_iterations {
            Retry::Stop(self.iteration_limit(run))
        } else {
            Retry::Continue
        }
    }

    fn iteration_limit(&self, run: &mut RunState<'_>) -> LoopOutcome {
        tracing::warn!(
            max_iterations = self.settings.max_iterations,
            "iteration limit reached"
        );
        let notice = format!(
            "Stopped after {} script(s) without \"{}\".",
            run.iterations, self.settings.terminal_marker
        );
        run.finish(StopReason::IterationLimit, notice)
    }
}
