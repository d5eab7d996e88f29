//! Step sequence execution
//!
//! A workflow runs as an ordered sequence of task invocations with
//! abort-on-failure semantics: the first failing step stops the run and the
//! error names that step. Completed steps are *not* undone - remote side
//! effects have no compensating rollback here. Recovery is a converging
//! re-run of the workflow, not an automatic revert.

use crate::error::{DeployError, DeployResult};
use crate::tasks::{TaskContext, TaskName};

/// An ordered list of task invocations forming one workflow run.
///
/// Exists only for the duration of the run; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct StepSequence {
    steps: Vec<TaskName>,
}

impl StepSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: TaskName) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[TaskName] {
        &self.steps
    }

    /// Execute every step in order through the context's registry.
    ///
    /// Stops at the first failure and wraps the error with the failing
    /// step's name. Steps skipped by their conditions count as executed.
    pub fn run(&self, ctx: &TaskContext) -> DeployResult<()> {
        for step in &self.steps {
            ctx.registry
                .invoke(step, ctx)
                .map_err(|source| DeployError::TaskFailed {
                    task: step.to_string(),
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}

impl FromIterator<TaskName> for StepSequence {
    fn from_iter<I: IntoIterator<Item = TaskName>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}
