//! Remote command transport
//!
//! The orchestration core talks to a `Transport` instead of spawning
//! processes directly. Production uses `SshTransport` (or `LocalShell` when
//! no host is configured); tests swap in `ScriptedTransport`; `--dry-run`
//! wraps the real transport in `DryRunTransport`.
//!
//! Connectivity retries, timeouts and cancellation belong to this boundary,
//! not to task logic: the core treats any failure signaled here as final
//! for the run.

use std::process::{Command, Stdio};
use std::sync::Mutex;

use crate::error::{DeployError, DeployResult};

/// Abstract command execution on the deployment target
pub trait Transport {
    /// Run a command, discarding its output. Non-zero exit is fatal.
    fn run(&self, command: &str) -> DeployResult<()>;

    /// Run a read-only probe and capture its stdout, trimmed.
    fn run_capture(&self, command: &str) -> DeployResult<String>;

    /// Human-readable target description for status output
    fn describe(&self) -> String;
}

fn command_error(command: &str, status: Option<i32>, stderr: &[u8]) -> DeployError {
    DeployError::CommandFailed {
        command: command.to_string(),
        status: status.unwrap_or(-1),
        stderr: String::from_utf8_lossy(stderr).trim().to_string(),
    }
}

/// Transport executing commands on a remote host via SSH
pub struct SshTransport {
    /// SSH destination (`user@host` or `host`)
    destination: String,
}

impl SshTransport {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    fn invoke(&self, command: &str) -> DeployResult<std::process::Output> {
        let output = Command::new("ssh")
            .arg(&self.destination)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        if !output.status.success() {
            return Err(command_error(command, output.status.code(), &output.stderr));
        }
        Ok(output)
    }
}

impl Transport for SshTransport {
    fn run(&self, command: &str) -> DeployResult<()> {
        self.invoke(command).map(|_| ())
    }

    fn run_capture(&self, command: &str) -> DeployResult<String> {
        let output = self.invoke(command)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn describe(&self) -> String {
        format!("ssh {}", self.destination)
    }
}

/// Transport executing commands through the local shell.
///
/// Used when no host is configured (the deployment target is the machine
/// drover runs on) and by the integration tests.
pub struct LocalShell;

impl LocalShell {
    fn invoke(&self, command: &str) -> DeployResult<std::process::Output> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        if !output.status.success() {
            return Err(command_error(command, output.status.code(), &output.stderr));
        }
        Ok(output)
    }
}

impl Transport for LocalShell {
    fn run(&self, command: &str) -> DeployResult<()> {
        self.invoke(command).map(|_| ())
    }

    fn run_capture(&self, command: &str) -> DeployResult<String> {
        let output = self.invoke(command)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn describe(&self) -> String {
        "local shell".to_string()
    }
}

/// Transport wrapper that records mutating commands instead of running them.
///
/// Read-only probes (`run_capture`) still reach the wrapped transport so
/// the plan reflects the real target state, e.g. which release is latest.
pub struct DryRunTransport {
    inner: Box<dyn Transport>,
    recorded: Mutex<Vec<String>>,
}

impl DryRunTransport {
    pub fn new(inner: Box<dyn Transport>) -> Self {
        Self {
            inner,
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Commands that would have been executed, in order
    pub fn recorded(&self) -> Vec<String> {
        self.recorded.lock().unwrap().clone()
    }
}

impl Transport for DryRunTransport {
    fn run(&self, command: &str) -> DeployResult<()> {
        self.recorded.lock().unwrap().push(command.to_string());
        Ok(())
    }

    fn run_capture(&self, command: &str) -> DeployResult<String> {
        self.inner.run_capture(command)
    }

    fn describe(&self) -> String {
        format!("{} (dry run)", self.inner.describe())
    }
}

/// Scripted transport for unit tests.
///
/// Records every command; fails any command containing `fail_on`; answers
/// captures from a canned table.
#[cfg(test)]
pub struct ScriptedTransport {
    pub commands: Mutex<Vec<String>>,
    pub fail_on: Option<String>,
    pub captures: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            fail_on: None,
            captures: std::collections::HashMap::new(),
        }
    }

    pub fn failing_on(substring: impl Into<String>) -> Self {
        Self {
            fail_on: Some(substring.into()),
            ..Self::new()
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    fn check(&self, command: &str) -> DeployResult<()> {
        if let Some(needle) = &self.fail_on {
            if command.contains(needle.as_str()) {
                return Err(DeployError::CommandFailed {
                    command: command.to_string(),
                    status: 1,
                    stderr: "scripted failure".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl Transport for ScriptedTransport {
    fn run(&self, command: &str) -> DeployResult<()> {
        self.commands.lock().unwrap().push(command.to_string());
        self.check(command)
    }

    fn run_capture(&self, command: &str) -> DeployResult<String> {
        self.commands.lock().unwrap().push(command.to_string());
        self.check(command)?;
        Ok(self
            .captures
            .iter()
            .find(|(key, _)| command.contains(key.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or_default())
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
