//! Release resolution
//!
//! Releases are created and versioned by an external mechanism; the
//! orchestration core only needs the root path of the latest one. Release
//! directories are named sortably by that mechanism, so "latest" is the
//! lexicographically greatest entry of the releases area.

use std::path::{Path, PathBuf};

use crate::config::DeployConfig;
use crate::error::DeployResult;
use crate::shell::ShellCommand;
use crate::transport::Transport;

/// One versioned deployment of application code on the target host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub root: PathBuf,
}

impl Release {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the latest release by listing the releases area through the
    /// transport.
    ///
    /// Returns `None` when the area is empty or cannot be listed (nothing
    /// has been deployed yet); condition-gated tasks then skip instead of
    /// failing mid-probe.
    pub fn resolve_latest(
        transport: &dyn Transport,
        config: &DeployConfig,
    ) -> DeployResult<Option<Release>> {
        let releases = config.releases_path();
        let listing = ShellCommand::program("ls")
            .arg("-1")
            .arg(releases.display().to_string())
            .render();

        let output = match transport.run_capture(&listing) {
            Ok(output) => output,
            Err(_) => return Ok(None),
        };

        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .max()
            .map(|name| Release::new(releases.join(name))))
    }
}
