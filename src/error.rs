//! Error types for Drover
//!
//! Uses `thiserror` for library errors; the CLI layer wraps these in
//! `anyhow` at the binary boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Drover operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for Drover operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// A remote (or local) shell command exited non-zero
    #[error("command `{command}` exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// A step in a sequence failed; wraps the underlying error so the
    /// operator can see which task aborted the run
    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: Box<DeployError>,
    },

    /// A task was invoked under a name nothing registered
    #[error("unknown task '{task}'")]
    UnknownTask { task: String },

    /// A malformed task reference (expected `namespace:name`)
    #[error("invalid task reference '{reference}' - expected 'namespace:name'")]
    InvalidTaskReference { reference: String },

    /// A required setting is missing from the configuration
    #[error("missing required setting '{setting}'")]
    MissingSetting { setting: &'static str },

    /// A setting is present but malformed
    #[error("invalid setting '{setting}': {reason}")]
    InvalidSetting {
        setting: &'static str,
        reason: String,
    },

    /// Two shared resources declare the same release-relative path
    #[error("duplicate shared path '{path}'")]
    DuplicateSharedPath { path: String },

    /// The config file exists but does not parse
    #[error("invalid config file {file}: {source}")]
    ConfigParse {
        file: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A workflow needs a release but none exists yet
    #[error("no release found under {releases}")]
    NoRelease { releases: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
