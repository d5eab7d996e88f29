//! Shared resource linking
//!
//! A release tree is disposable; persistent files and directories (settings,
//! user uploads) live in the deployment's shared storage area and are
//! re-attached into every release as symbolic links. This module computes
//! the exact operation batch for that re-linking; it performs no I/O itself.

use std::path::Path;

use crate::shell::ShellCommand;

/// Whether a shared resource is a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Directory,
}

/// A path that must persist across releases.
///
/// Paths are relative to a release root and must be unique within the
/// declared set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedResource {
    pub path: String,
    pub kind: ResourceKind,
}

impl SharedResource {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ResourceKind::File,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ResourceKind::Directory,
        }
    }

    /// Final path segment; this is the resource's name in shared storage
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Directory portion of the path, if the path is nested
    pub fn parent(&self) -> Option<&str> {
        self.path.rsplit_once('/').map(|(parent, _)| parent)
    }
}

/// Compute the operation batch that re-establishes every shared resource as
/// a symlink inside `release_root`, pointing into `shared_root`.
///
/// Per resource, in declaration order:
/// 1. `rm -rf` the in-release location, so a file or directory shipped in
///    the release's own source tree (or a stale link from a prior run)
///    never conflicts with link creation.
/// 2. `mkdir -p` the parent directory, only for nested paths. Some source
///    control systems do not track empty directories, so the parent may not
///    exist in a fresh release.
/// 3. `ln -s` from the shared storage entry to the in-release location.
///
/// The shared storage entry is always named by the path's *final segment*,
/// regardless of nesting depth: `sites/default/files` and `other/files`
/// both link to `<shared_root>/files`. Resources that differ only in their
/// directory prefix therefore collide in shared storage. This is documented
/// compatibility behavior, kept so existing deployments keep their storage
/// layout; declare distinct basenames if the resources must be distinct.
///
/// Re-running the batch on an already-linked release converges to the same
/// link state, so recovery from a partial failure is a plain re-run.
pub fn link_commands(
    resources: &[SharedResource],
    release_root: &Path,
    shared_root: &Path,
) -> Vec<ShellCommand> {
    let mut commands = Vec::new();

    for resource in resources {
        let target = format!("{}/{}", release_root.display(), resource.path);

        commands.push(ShellCommand::program("rm").arg("-rf").arg(&target));

        if let Some(parent) = resource.parent() {
            commands.push(
                ShellCommand::program("mkdir")
                    .arg("-p")
                    .arg(format!("{}/{}", release_root.display(), parent)),
            );
        }

        commands.push(
            ShellCommand::program("ln")
                .arg("-s")
                .arg(format!("{}/{}", shared_root.display(), resource.basename()))
                .arg(&target),
        );
    }

    commands
}
