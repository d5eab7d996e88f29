//! Common test utilities for drover integration tests.
//!
//! Provides `TestEnv`: an isolated deployment target in a temp directory,
//! with a project config pointing at it and a stub application CLI on PATH
//! that records every invocation.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Result of running a drover CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment.
///
/// Layout under one temp directory:
/// - `project/` - working directory with `drover.toml` and a `build/` tree
/// - `deploy/`  - the deployment target root (local transport)
/// - `bin/appctl` - stub application CLI appending its argv to `appctl.log`
pub struct TestEnv {
    root: TempDir,
    drover_bin: PathBuf,
}

const APPCTL_STUB: &str = r#"#!/bin/sh
echo "appctl $@" >> "$APPCTL_LOG"
case "$1" in
  env-info) echo standard ;;
esac
exit 0
"#;

impl TestEnv {
    pub fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        let env = Self {
            root,
            drover_bin: PathBuf::from(env!("CARGO_BIN_EXE_drover")),
        };

        std::fs::create_dir_all(env.project_path("build")).expect("create build dir");
        std::fs::write(env.project_path("build/index.php"), "<?php\n").expect("seed build tree");
        std::fs::create_dir_all(env.deploy_root()).expect("create deploy root");
        env.write_default_config();

        let bin_dir = env.root.path().join("bin");
        std::fs::create_dir_all(&bin_dir).expect("create bin dir");
        let stub = bin_dir.join("appctl");
        std::fs::write(&stub, APPCTL_STUB).expect("write appctl stub");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755))
                .expect("mark stub executable");
        }

        env
    }

    fn write_default_config(&self) {
        self.write_config_extra("");
    }

    /// Write the project drover.toml; `deploy_to` and `source_path` pointing
    /// into the temp environment are always included, `extra` is appended.
    pub fn write_config_extra(&self, extra: &str) {
        let config = format!(
            "deploy_to = \"{}\"\nsource_path = \"{}\"\n{}",
            self.deploy_root().display(),
            self.project_path("build").display(),
            extra,
        );
        std::fs::write(self.project_path("drover.toml"), config).expect("write drover.toml");
    }

    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.root.path().join("project").join(relative)
    }

    pub fn deploy_root(&self) -> PathBuf {
        self.root.path().join("deploy")
    }

    pub fn deploy_path(&self, relative: &str) -> PathBuf {
        self.deploy_root().join(relative)
    }

    fn appctl_log_path(&self) -> PathBuf {
        self.root.path().join("appctl.log")
    }

    /// Every stub invocation so far, one line per call
    pub fn appctl_log(&self) -> Vec<String> {
        match std::fs::read_to_string(self.appctl_log_path()) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Create a release directory and return its root
    pub fn create_release(&self, name: &str) -> PathBuf {
        let release = self.deploy_path("releases").join(name);
        std::fs::create_dir_all(&release).expect("create release dir");
        release
    }

    /// Run drover in this environment from the project directory
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run drover with extra environment variables
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let path = format!(
            "{}:{}",
            self.root.path().join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );

        let mut cmd = Command::new(&self.drover_bin);
        cmd.current_dir(self.project_path(""))
            .args(args)
            .env("PATH", path)
            .env("APPCTL_LOG", self.appctl_log_path());
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("failed to execute drover");
        Self::output_to_result(output)
    }

    fn output_to_result(output: Output) -> TestResult {
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Assert that a symlink exists at `path` and points at `target`
pub fn assert_link(path: &Path, target: &Path) {
    let metadata = std::fs::symlink_metadata(path)
        .unwrap_or_else(|e| panic!("missing link {}: {}", path.display(), e));
    assert!(
        metadata.file_type().is_symlink(),
        "{} is not a symlink",
        path.display()
    );
    let dest = std::fs::read_link(path).expect("read link");
    assert_eq!(dest, target, "link {} has wrong target", path.display());
}
