use crate::agent::{LoopHook, LoopOutcome, LoopState, StopReason};
use crate::exec::ExecutionResult;
use crate::ui::style as ui;
use crate::usage::CostMeter;
use std::io::Write;

/// Prints scripts and their results as the loop runs.
///
/// Script output goes to stdout; everything else goes to stderr.
#[derive(Debug)]
pub struct CliHook {
    show_scripts: bool,
}

impl CliHook {
    /// `show_scripts` is off in leash mode, where the approver already lists them.
    pub fn new(show_scripts: bool) -> Self {
        Self { show_scripts }
    }
}

impl LoopHook for CliHook {
    fn on_state_change(&self, _from: LoopState, to: LoopState) {
        if to == LoopState::Executing {
            eprintln!("{}", ui::dim("  running..."));
        }
    }

    fn on_script(&self, iteration: u32, code: &str) {
        if !self.show_scripts {
            return;
        }
        eprintln!();
        eprintln!("{}", ui::header(format!("Script {iteration}:")));
        for line in code.lines() {
            eprintln!("  {}", ui::dim(line));
        }
    }

    fn on_execution(&self, result: &ExecutionResult) {
        match result {
            ExecutionResult::Completed { output, .. } => {
                let mut stdout = std::io::stdout().lock();
                let _ = stdout.write_all(output.as_bytes());
                if !output.is_empty() && !output.ends_with('\n') {
                    let _ = stdout.write_all(b"\n");
                }
                let _ = stdout.flush();
            }
            ExecutionResult::Failed { error_text } => {
                eprintln!("{}", ui::error_text(error_text.trim_end()));
            }
            ExecutionResult::TimedOut {
                timeout,
                partial_output,
            } => {
                if !partial_output.is_empty() {
                    eprintln!("{}", partial_output.trim_end());
                }
                eprintln!(
                    "{}",
                    ui::warn(format!("Script timed out after {}s", timeout.as_secs()))
                );
            }
        }
    }
}

/// One-line summary of how a request ended, for stderr.
pub fn render_outcome(outcome: &LoopOutcome, meter: &CostMeter) -> String {
    let scripts = format!(
        "{} script(s), {} run",
        outcome.iterations, outcome.executions
    );
    let cost = ui::value(format!("${}", meter.total()));

    match &outcome.stop_reason {
        StopReason::Completed => format!("{} {scripts}, cost {cost}", ui::success("✓ Done:")),
        StopReason::IterationLimit => format!(
            "{} {} ({scripts}, cost {cost})",
            ui::failure("✗ Gave up:"),
            outcome.final_output
        ),
        StopReason::Refused(reason) => {
            format!("{} {reason}", ui::failure("✗ Refused:"))
        }
        StopReason::GeneratorUnavailable(message) => {
            format!("{} {message}", ui::failure("✗ Model unavailable:"))
        }
        StopReason::Declined => format!("{} script not run", ui::warn("✗ Declined:")),
        StopReason::Interrupted => format!("{} {scripts}", ui::warn("✗ Interrupted:")),
    }
}
