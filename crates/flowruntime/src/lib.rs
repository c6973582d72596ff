//! Flow graph execution runtime
//! 
//! This crate provides the interpreter that runs flow graphs: the node
//! variants, the per-run trigger registry and return stack, the tick-driven
//! graph runner and the host-facing runtime controller.

pub mod nodes;
mod returns;
mod runner;
mod runtime;
mod triggers;
pub mod validate;

pub use nodes::{FlowNode, NodeIndex, NodeState};
pub use returns::ReturnStack;
pub use runner::{GraphRunner, NodeStatus};
pub use runtime::{FlowRuntime, RuntimeConfig};
pub use triggers::TriggerRegistry;
pub use validate::{validate, GraphReport, IssueKind, LintIssue, Severity};
