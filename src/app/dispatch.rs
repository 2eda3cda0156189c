use crate::Config;
use crate::agent::{
    LoopHook, LoopOutcome, LoopSettings, PromptContext, ScriptLoop, ScriptLoopRunParams,
    system_turns,
};
use crate::app::render::{CliHook, render_outcome};
use crate::cli::commands::Cli;
use crate::error::PilotError;
use crate::exec::{Environment, Interrupts, ProcessExecutor};
use crate::llm::{Provider, create_provider, generator_identity};
use crate::script::PythonValidator;
use crate::security::{AutoApprove, CliApprover, ExecutionApprover, SafetyGate};
use crate::session::{Conversation, SessionRecord};
use crate::ui::style as ui;
use crate::usage::CostMeter;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Everything one user session needs, built once from the config.
///
/// The conversation is shared by every request in an interactive session.
struct Session {
    config: Config,
    provider: Box<dyn Provider>,
    validator: PythonValidator,
    gate: SafetyGate,
    approver: Box<dyn ExecutionApprover>,
    executor: ProcessExecutor,
    env: Environment,
    interrupts: Arc<Interrupts>,
    meter: CostMeter,
    conversation: Conversation,
    hooks: Vec<Arc<dyn LoopHook>>,
    script_loop: ScriptLoop,
}

impl Session {
    fn build(config: Config) -> Result<Self> {
        let provider = create_provider(&config)?;
        let validator = PythonValidator::new().context("failed to load the Python grammar")?;
        let gate = SafetyGate::from_config(&config.safety)?;
        let approver: Box<dyn ExecutionApprover> = if config.safety.leash {
            Box::new(CliApprover)
        } else {
            Box::new(AutoApprove)
        };
        let executor = ProcessExecutor::from_config(&config.executor);
        let env = Environment::current()
            .context("failed to read the current directory")?
            .with_inherit_env(config.executor.inherit_env);

        let identity = generator_identity(provider.as_ref(), &config.default_model);
        let mut conversation = Conversation::new(identity);
        let prompt = PromptContext::gather(env.cwd(), &config.agent.terminal_marker);
        for turn in system_turns(&prompt) {
            conversation.append(turn);
        }

        let hooks: Vec<Arc<dyn LoopHook>> = vec![Arc::new(CliHook::new(!config.safety.leash))];
        let interrupts = Arc::new(Interrupts::new());
        interrupts.listen_for_ctrl_c();

        Ok(Self {
            meter: CostMeter::new(&config.default_model),
            script_loop: ScriptLoop::new(LoopSettings::from_config(&config.agent)),
            provider,
            validator,
            gate,
            approver,
            executor,
            env,
            interrupts,
            conversation,
            hooks,
            config,
        })
    }

    async fn run_request(&mut self, request: &str) -> Result<LoopOutcome, PilotError> {
        tracing::info!(model = %self.config.default_model, "starting request");
        self.script_loop
            .run(ScriptLoopRunParams {
                provider: self.provider.as_ref(),
                model: &self.config.default_model,
                temperature: self.config.default_temperature,
                request,
                conversation: &mut self.conversation,
                validator: &self.validator,
                gate: &self.gate,
                approver: self.approver.as_ref(),
                executor: &self.executor,
                env: &self.env,
                interrupts: &self.interrupts,
                meter: &mut self.meter,
                hooks: &self.hooks,
            })
            .await
    }

    /// Write the session record. Failures are reported, never fatal.
    fn save_log(&self) {
        if !self.config.logging.enabled {
            return;
        }
        let dir = self.config.logging.resolved_dir();
        match SessionRecord::from_conversation(&self.conversation).save_in(&dir) {
            Ok(path) => tracing::debug!(path = %path.display(), "session log written"),
            Err(e) => eprintln!("{} {e}", ui::warn("Warning: session log not saved:")),
        }
    }
}

/// Run one request, or an interactive session when no prompt was given.
///
/// Returns the process exit code: 0 when the request finished, 1 when it
/// was aborted. Environment and config failures come back as `Err`.
pub async fn dispatch(cli: Cli, mut config: Config) -> Result<u8> {
    cli.apply_overrides(&mut config);
    config.validate()?;

    let request = cli.request();
    let mut session = Session::build(config)?;

    match request {
        Some(request) => run_single(&mut session, &request).await,
        None => run_interactive(&mut session).await,
    }
}

async fn run_single(session: &mut Session, request: &str) -> Result<u8> {
    let result = session.run_request(request).await;
    session.save_log();

    let outcome = result?;
    eprintln!("{}", render_outcome(&outcome, &session.meter));
    tracing::info!(
        state = %outcome.state,
        exit_code = outcome.exit_code(),
        "request finished"
    );
    Ok(outcome.exit_code())
}

async fn run_interactive(session: &mut Session) -> Result<u8> {
    eprintln!(
        "{} {}",
        ui::accent("scriptpilot"),
        ui::dim("- type a request, or `exit` to quit")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stderr = tokio::io::stderr();

    let result = loop {
        session.interrupts.consume();
        stderr.write_all(ui::accent("> ").as_bytes()).await?;
        stderr.flush().await?;

        // Ctrl-C at the prompt ends the session.
        let cancel = session.interrupts.token();
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read from stdin")?,
            () = cancel.cancelled() => {
                session.interrupts.consume();
                eprintln!();
                None
            }
        };
        let Some(line) = line else {
            break Ok(0);
        };
        let request = line.trim();
        if request.is_empty() {
            continue;
        }
        if request.eq_ignore_ascii_case("exit") || request.eq_ignore_ascii_case("quit") {
            break Ok(0);
        }

        match session.run_request(request).await {
            Ok(outcome) => eprintln!("{}", render_outcome(&outcome, &session.meter)),
            Err(e) => break Err(anyhow::Error::from(e)),
        }
    };

    session.save_log();
    result
}
