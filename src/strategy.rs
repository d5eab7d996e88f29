//! Code publishing strategies
//!
//! How application code gets into a release is a collaborator concern, not
//! orchestration logic. The default `deploy:update_code` task delegates to
//! whichever `DeployStrategy` the composition root injects; embedders can
//! also re-register the task outright.

use std::process::{Command, Stdio};

use crate::error::{DeployError, DeployResult};
use crate::shell::ShellCommand;
use crate::tasks::TaskContext;

/// Publishes application code into the latest release
pub trait DeployStrategy {
    fn name(&self) -> &'static str;

    fn update_code(&self, ctx: &TaskContext) -> DeployResult<()>;
}

/// Build the rsync invocation that publishes `source_path` into the release
/// root, over SSH when a host is configured.
pub fn publish_command(ctx: &TaskContext) -> DeployResult<ShellCommand> {
    let release = ctx.release()?;
    let config = ctx.config;

    let destination = match &config.host {
        Some(host) => format!("{}:{}/", host, release.root.display()),
        None => format!("{}/", release.root.display()),
    };

    let mut command = ShellCommand::program("rsync").arg("-az").arg("--delete");
    if config.normalize_asset_timestamps {
        // Give published assets fresh mtimes on the target instead of
        // preserving whatever the local build left behind.
        command = command.arg("--no-times");
    }
    if config.host.is_some() {
        command = command.arg("-e").arg("ssh");
    }
    // Trailing slash: copy the contents of the source tree, not the tree.
    Ok(command
        .arg(format!("{}/", config.source_path.display()))
        .arg(destination))
}

/// Local-build strategy: the application is built on the operator's machine
/// and the built tree is rsynced into the release.
///
/// Runs rsync as a local process (it is the transport for this one
/// operation); everything else in a workflow still goes through the
/// configured `Transport`.
pub struct LocalBuildStrategy;

impl LocalBuildStrategy {
    /// Check that rsync is installed
    pub fn check_available() -> bool {
        Command::new("rsync")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl DeployStrategy for LocalBuildStrategy {
    fn name(&self) -> &'static str {
        "local-build"
    }

    fn update_code(&self, ctx: &TaskContext) -> DeployResult<()> {
        let command = publish_command(ctx)?;
        let rendered = command.render();

        let ShellCommand::Argv(parts) = command else {
            unreachable!("publish_command builds argv commands only");
        };
        let output = Command::new(&parts[0])
            .args(&parts[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        if !output.status.success() {
            return Err(DeployError::CommandFailed {
                command: rendered,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Dry-run strategy: routes the would-be publish command through the
/// transport so it shows up in the recorded plan instead of executing.
pub struct PlanStrategy;

impl DeployStrategy for PlanStrategy {
    fn name(&self) -> &'static str {
        "plan"
    }

    fn update_code(&self, ctx: &TaskContext) -> DeployResult<()> {
        let command = publish_command(ctx)?;
        ctx.transport.run(&command.render())
    }
}

/// Strategy that publishes nothing. For embedders that manage code
/// placement themselves, and for tests.
pub struct NullStrategy;

impl DeployStrategy for NullStrategy {
    fn name(&self) -> &'static str {
        "null"
    }

    fn update_code(&self, _ctx: &TaskContext) -> DeployResult<()> {
        Ok(())
    }
}
