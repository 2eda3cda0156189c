use super::executor::{ExecutionRequest, ExecutionResult, ScriptExecutor};
use crate::config::ExecutorConfig;
use crate::error::ExecError;
use std::future::Future;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// How long to wait for output pipes to drain after the process is gone.
const DRAIN_GRACE: Duration = Duration::from_secs(2);
const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Runs each script as `<interpreter...> <code>` in its own process group.
pub struct ProcessExecutor {
    interpreter: Vec<String>,
    timeout: Duration,
    max_output_bytes: usize,
}

impl ProcessExecutor {
    pub fn new(interpreter: Vec<String>, timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            interpreter,
            timeout,
            max_output_bytes,
        }
    }

    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(
            config.interpreter.clone(),
            Duration::from_secs(config.timeout_secs),
            config.max_output_bytes,
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self, request: ExecutionRequest<'_>) -> Result<ExecutionResult, ExecError> {
        let (program, args) = self
            .interpreter
            .split_first()
            .ok_or(ExecError::EmptyInterpreter)?;

        if !request.env.cwd().is_dir() {
            return Err(ExecError::MissingWorkingDir(
                request.env.cwd().display().to_string(),
            ));
        }

        let mut cmd = Command::new(program);
        cmd.args(args)
            .arg(request.code)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        request.env.apply(&mut cmd);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| ExecError::Spawn {
            program: program.clone(),
            message: e.to_string(),
        })?;
        let pid = child.id();
        tracing::debug!(?pid, program = %program, "script process started");

        let buffer = Arc::new(Mutex::new(OutputBuffer::new(self.max_output_bytes)));
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(pump(stdout, Arc::clone(&buffer))));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(pump(stderr, Arc::clone(&buffer))));
        }

        let outcome = tokio::select! {
            status = child.wait() => Outcome::Exited(status),
            () = tokio::time::sleep(self.timeout) => Outcome::TimedOut,
            () = request.cancel.cancelled() => Outcome::Interrupted,
        };

        if !matches!(outcome, Outcome::Exited(_)) {
            kill_process_group(pid);
            child.kill().await.ok();
            child.wait().await.ok();
        }

        drain(readers, DRAIN_GRACE).await;
        let output = buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .to_text();

        match outcome {
            Outcome::Exited(Ok(status)) if status.success() => {
                tracing::debug!(bytes = output.len(), "script completed");
                Ok(ExecutionResult::completed(output, request.terminal_marker))
            }
            Outcome::Exited(Ok(status)) => {
                tracing::debug!(status = %status, "script failed");
                Ok(ExecutionResult::failed(append_line(
                    output,
                    &describe_exit(status),
                )))
            }
            Outcome::Exited(Err(e)) => Err(ExecError::Wait(e.to_string())),
            Outcome::TimedOut => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "script timed out");
                Ok(ExecutionResult::TimedOut {
                    timeout: self.timeout,
                    partial_output: output,
                })
            }
            Outcome::Interrupted => {
                tracing::info!("script interrupted by user");
                Ok(ExecutionResult::failed(append_line(
                    output,
                    "interrupted by user",
                )))
            }
        }
    }
}

impl ScriptExecutor for ProcessExecutor {
    fn name(&self) -> &str {
        "process"
    }

    fn execute<'a>(
        &'a self,
        request: ExecutionRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult, ExecError>> + Send + 'a>> {
        Box::pin(self.run(request))
    }
}

enum Outcome {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Interrupted,
}

/// stdout and stderr chunks in arrival order, capped at `limit` bytes.
struct OutputBuffer {
    bytes: Vec<u8>,
    limit: usize,
    truncated: bool,
}

impl OutputBuffer {
    fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
            truncated: false,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        let room = self.limit.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.truncated = true;
        }
        self.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    fn to_text(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.truncated {
            text.push_str(&format!(
                "\n... [output truncated at {} bytes]",
                self.limit
            ));
        }
        text
    }
}

async fn pump<R>(mut reader: R, buffer: Arc<Mutex<OutputBuffer>>)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0_u8; READ_CHUNK_BYTES];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let mut guard = buffer.lock().unwrap_or_else(PoisonError::into_inner);
                guard.push(&chunk[..n]);
            }
        }
    }
}

/// Wait for the pipe readers to hit EOF, aborting any that outlive `grace`.
///
/// A detached grandchild can hold the pipe open indefinitely.
async fn drain(readers: Vec<JoinHandle<()>>, grace: Duration) {
    for mut reader in readers {
        if tokio::time::timeout(grace, &mut reader).await.is_err() {
            tracing::debug!("output pipe still open after process exit; giving up on it");
            reader.abort();
        }
    }
}

fn append_line(mut text: String, line: &str) -> String {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(line);
    text
}

fn describe_exit(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("Process exited with status {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("Process killed by signal {signal}");
        }
    }
    format!("Process exited abnormally ({status})")
}

/// Kill the script and anything it spawned.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pgid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: killpg only sends a signal; the group was created for this
    // child by `process_group(0)`, so no unrelated process is targeted.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(pgid, "killpg failed; process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
