//! Drover - deployment orchestrator for web applications
//!
//! Drover publishes a locally built application tree into a versioned
//! release on a target host, re-links persistent shared resources into the
//! release, toggles maintenance mode and drives the managed application's
//! own migration commands - as ordered, abort-on-failure step sequences
//! built from an overridable named-task registry.

pub mod config;
pub mod error;
pub mod linker;
pub mod maintenance;
pub mod release;
pub mod runner;
pub mod shell;
pub mod strategy;
pub mod tasks;
pub mod transport;
pub mod workflows;

// Re-exports for convenience
pub use config::{DeployConfig, DeployStrategyKind};
pub use error::{DeployError, DeployResult};
pub use linker::{link_commands, ResourceKind, SharedResource};
pub use maintenance::MaintenanceState;
pub use release::Release;
pub use runner::StepSequence;
pub use shell::{quote, CommandBatch, ShellCommand};
pub use strategy::{DeployStrategy, LocalBuildStrategy, NullStrategy, PlanStrategy};
pub use tasks::{
    ContextFlag, ContextFlags, ExecutionCondition, InvokeOutcome, TaskContext, TaskName,
    TaskRegistry,
};
pub use transport::{DryRunTransport, LocalShell, SshTransport, Transport};
pub use workflows::{default_registry, install_sequence, update_sequence};
