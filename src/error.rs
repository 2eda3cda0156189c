use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `scriptpilot`.
///
/// These are the failures that escape the script loop: configuration
/// problems, generator outages, a broken environment. Faults raised by the
/// generated scripts themselves never show up here; they are recorded as
/// observation turns instead (see [`TurnFault`]).
#[derive(Debug, Error)]
pub enum PilotError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── LLM / Generator ─────────────────────────────────────────────────
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    // ── Session record ──────────────────────────────────────────────────
    #[error("session: {0}")]
    Session(#[from] SessionError),

    // ── Executor environment ────────────────────────────────────────────
    #[error("exec: {0}")]
    Exec(#[from] ExecError),

    // ── Safety gate / approval ──────────────────────────────────────────
    #[error("security: {0}")]
    Security(#[from] SecurityError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── LLM / Generator errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} returned no choices")]
    EmptyResponse { provider: String },

    #[error("provider {provider} did not answer within {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },

    #[error("no API key configured (set SCRIPTPILOT_API_KEY or api_key in config.toml)")]
    MissingApiKey,
}

// ─── Session errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to write session record {path}: {message}")]
    Write { path: String, message: String },

    #[error("failed to read session record {path}: {message}")]
    Read { path: String, message: String },
}

// ─── Executor errors ────────────────────────────────────────────────────────

/// Failures of the execution *environment*, as opposed to failures of the
/// executed script.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("interpreter command is empty")]
    EmptyInterpreter,

    #[error("failed to spawn interpreter `{program}`: {message}")]
    Spawn { program: String, message: String },

    #[error("working directory {0} does not exist")]
    MissingWorkingDir(String),

    #[error("failed waiting for script process: {0}")]
    Wait(String),
}

// ─── Security errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("invalid refusal rule {id}: {message}")]
    InvalidRule { id: String, message: String },

    #[error("approval prompt failed: {0}")]
    Approval(String),
}

// ─── Recoverable turn faults ────────────────────────────────────────────────

/// Recoverable faults that stay inside the loop.
///
/// Each one is rendered into an observation turn and the model gets another
/// attempt; none of them unwinds past the loop controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnFault {
    #[error("extraction failure: {0}")]
    Extraction(String),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("runtime fault: {0}")]
    Runtime(String),

    #[error("timed out after {0}s")]
    TimedOut(u64),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, PilotError>;
