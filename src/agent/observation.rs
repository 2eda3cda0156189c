//! Wording of the observation turns fed back to the model.

use crate::exec::ExecutionResult;
use crate::script::{ExtractionError, SyntaxIssue};

pub const OUTPUT_PREFIX: &str = "LAST SCRIPT OUTPUT:";
pub const FAILURE_PREFIX: &str = "LAST SCRIPT FAILED:";
pub const TIMEOUT_PREFIX: &str = "LAST SCRIPT TIMED OUT:";
pub const NO_SCRIPT_PREFIX: &str = "NO SCRIPT FOUND:";
pub const SYNTAX_PREFIX: &str = "SYNTAX ERROR:";
pub const REFUSED_PREFIX: &str = "SCRIPT REFUSED:";
pub const DECLINED_PREFIX: &str = "SCRIPT DECLINED:";

pub fn execution(result: &ExecutionResult, max_chars: usize) -> String {
    match result {
        ExecutionResult::Completed { output, .. } => {
            format!("{OUTPUT_PREFIX}\n{}", truncate_middle(output, max_chars))
        }
        ExecutionResult::Failed { error_text } => {
            format!("{FAILURE_PREFIX}\n{}", truncate_middle(error_text, max_chars))
        }
        ExecutionResult::TimedOut {
            timeout,
            partial_output,
        } => format!(
            "{TIMEOUT_PREFIX} killed after {}s. Output before the timeout:\n{}",
            timeout.as_secs(),
            truncate_middle(partial_output, max_chars)
        ),
    }
}

pub fn extraction_failure(error: &ExtractionError) -> String {
    format!(
        "{NO_SCRIPT_PREFIX} {error}. Reply with exactly one Python script inside a single pair of ``` delimiters."
    )
}

pub fn syntax_error(issue: &SyntaxIssue) -> String {
    format!("{SYNTAX_PREFIX} {issue}. The script was not run. Send a corrected script.")
}

pub fn refused(reason: &str) -> String {
    format!("{REFUSED_PREFIX} {reason} The script was not run and the session has ended.")
}

pub fn declined() -> String {
    format!("{DECLINED_PREFIX} the user chose not to run the last script.")
}

/// Keep the head and tail of `text` within `max_chars` characters.
pub fn truncate_middle(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }

    let omitted = total - max_chars;
    let head_chars = max_chars / 2;
    let tail_chars = max_chars - head_chars;
    let head: String = text.chars().take(head_chars).collect();
    let tail: String = text.chars().skip(total - tail_chars).collect();
    format!("{head}\n... [{omitted} characters omitted] ...\n{tail}")
}
