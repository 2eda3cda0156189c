pub mod approval;
pub mod defaults;
pub mod gate;

pub use approval::{ApprovalDecision, AutoApprove, CliApprover, ExecutionApprover};
pub use defaults::default_rules;
pub use gate::{RefusalRule, SafetyGate};
