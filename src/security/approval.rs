use crate::error::SecurityError;
use crate::ui::style as ui;
use dialoguer::Confirm;
use std::future::Future;
use std::pin::Pin;

/// Outcome of asking the user whether a script may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approved,
    Declined,
}

/// Gate between a validated script and the executor.
pub trait ExecutionApprover: Send + Sync {
    fn approve<'a>(
        &'a self,
        code: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ApprovalDecision, SecurityError>> + Send + 'a>>;
}

/// Runs everything without asking.
pub struct AutoApprove;

impl ExecutionApprover for AutoApprove {
    fn approve<'a>(
        &'a self,
        _code: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ApprovalDecision, SecurityError>> + Send + 'a>> {
        Box::pin(async move { Ok(ApprovalDecision::Approved) })
    }
}

/// Leash mode: prints each script and asks on the terminal.
pub struct CliApprover;

impl ExecutionApprover for CliApprover {
    fn approve<'a>(
        &'a self,
        code: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ApprovalDecision, SecurityError>> + Send + 'a>> {
        Box::pin(async move {
            eprintln!();
            eprintln!("{}", ui::header("Script to run:"));
            for line in code.lines() {
                eprintln!("  {}", ui::dim(line));
            }
            eprintln!();

            let confirmed = tokio::task::spawn_blocking(|| {
                Confirm::new()
                    .with_prompt("  Execute this script?")
                    .default(false)
                    .interact()
            })
            .await
            .map_err(|e| SecurityError::Approval(e.to_string()))?
            .map_err(|e| SecurityError::Approval(e.to_string()))?;

            Ok(if confirmed {
                ApprovalDecision::Approved
            } else {
                ApprovalDecision::Declined
            })
        })
    }
}
