//! Task registry
//!
//! Deployment work is organized as named tasks under organizational
//! namespaces (`deploy`, `app`, `orchestrator`). Registration under a name
//! that already exists fully replaces the earlier task; this is how
//! embedders customize the default workflows. Tasks carry execution
//! conditions evaluated against typed context flags at every invocation;
//! a condition mismatch skips the task silently.

use std::collections::HashMap;
use std::fmt;

use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::release::Release;
use crate::shell::CommandBatch;
use crate::strategy::DeployStrategy;
use crate::transport::Transport;

/// A single flag describing the invocation context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextFlag {
    /// This host is the designated primary in a multi-host deployment
    Primary,
    /// No release exists yet under the releases area
    NoRelease,
}

/// Typed context flags; evaluated fresh on every task invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextFlags {
    pub primary: bool,
    pub no_release: bool,
}

impl ContextFlags {
    pub fn new(primary: bool, no_release: bool) -> Self {
        Self { primary, no_release }
    }

    pub fn is_set(&self, flag: ContextFlag) -> bool {
        match flag {
            ContextFlag::Primary => self.primary,
            ContextFlag::NoRelease => self.no_release,
        }
    }
}

/// When a task is allowed to run.
///
/// A task may carry several conditions; it runs only if every one of them
/// allows the current flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionCondition {
    /// No restriction
    Always,
    /// Run only when all listed flags are set
    RequireAll(Vec<ContextFlag>),
    /// Skip when any listed flag is set
    ExcludeAny(Vec<ContextFlag>),
}

impl ExecutionCondition {
    pub fn allows(&self, flags: ContextFlags) -> bool {
        match self {
            ExecutionCondition::Always => true,
            ExecutionCondition::RequireAll(required) => {
                required.iter().all(|flag| flags.is_set(*flag))
            }
            ExecutionCondition::ExcludeAny(excluded) => {
                !excluded.iter().any(|flag| flags.is_set(*flag))
            }
        }
    }
}

/// Fully qualified task name: `namespace:name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskName {
    namespace: String,
    name: String,
}

impl TaskName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parse a `namespace:name` reference
    pub fn parse(reference: &str) -> DeployResult<Self> {
        match reference.split_once(':') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self::new(namespace, name))
            }
            _ => Err(DeployError::InvalidTaskReference {
                reference: reference.to_string(),
            }),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Everything a task body may touch during one workflow run.
///
/// The config is immutable, the transport is the only execution boundary,
/// and the registry reference lets task bodies invoke other tasks by name.
pub struct TaskContext<'a> {
    pub config: &'a DeployConfig,
    pub transport: &'a dyn Transport,
    pub registry: &'a TaskRegistry,
    pub strategy: &'a dyn DeployStrategy,
    pub flags: ContextFlags,
    pub release: Option<Release>,
}

impl<'a> TaskContext<'a> {
    /// The latest release, for tasks that operate inside a release tree
    pub fn release(&self) -> DeployResult<&Release> {
        self.release.as_ref().ok_or_else(|| DeployError::NoRelease {
            releases: self.config.releases_path(),
        })
    }

    /// Submit a command batch as a single remote invocation.
    ///
    /// An empty batch is a no-op; no remote call is issued.
    pub fn run_batch(&self, batch: &CommandBatch) -> DeployResult<()> {
        match batch.render() {
            Some(command) => self.transport.run(&command),
            None => Ok(()),
        }
    }

    /// Invoke another registered task under the same context
    pub fn invoke(&self, namespace: &str, name: &str) -> DeployResult<InvokeOutcome> {
        self.registry.invoke(&TaskName::new(namespace, name), self)
    }
}

/// What happened when a task was invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    Ran,
    /// Condition mismatch; intentional filtering, not a failure
    Skipped,
}

type TaskBody = Box<dyn Fn(&TaskContext) -> DeployResult<()> + Send + Sync>;

struct Task {
    conditions: Vec<ExecutionCondition>,
    body: TaskBody,
}

/// Named, namespaced operations with override semantics
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<TaskName, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace a task.
    ///
    /// Registering under a name that already exists *replaces* the earlier
    /// task entirely; the previous body and conditions never run again.
    /// Override never composes with what it overrides.
    pub fn register<F>(
        &mut self,
        namespace: &str,
        name: &str,
        conditions: Vec<ExecutionCondition>,
        body: F,
    ) where
        F: Fn(&TaskContext) -> DeployResult<()> + Send + Sync + 'static,
    {
        self.tasks.insert(
            TaskName::new(namespace, name),
            Task {
                conditions,
                body: Box::new(body),
            },
        );
    }

    pub fn contains(&self, name: &TaskName) -> bool {
        self.tasks.contains_key(name)
    }

    /// All registered task names, sorted for stable listing
    pub fn names(&self) -> Vec<TaskName> {
        let mut names: Vec<TaskName> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Evaluate the task's conditions against the context flags and either
    /// run its body or skip silently.
    ///
    /// Conditions are checked fresh on every invocation. A skip is not an
    /// error; an unknown name is.
    pub fn invoke(&self, name: &TaskName, ctx: &TaskContext) -> DeployResult<InvokeOutcome> {
        let task = self.tasks.get(name).ok_or_else(|| DeployError::UnknownTask {
            task: name.to_string(),
        })?;

        if !task.conditions.iter().all(|c| c.allows(ctx.flags)) {
            return Ok(InvokeOutcome::Skipped);
        }

        (task.body)(ctx)?;
        Ok(InvokeOutcome::Ran)
    }
}
