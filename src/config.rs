//! Configuration module for Drover
//!
//! Configuration sources, highest priority first:
//! 1. CLI flags
//! 2. Environment variables (DROVER_*)
//! 3. Config file (explicit --config path, else ./drover.toml,
//!    else ~/.config/drover/config.toml)
//! 4. Built-in defaults
//!
//! The config is assembled once at process start and read-only afterwards;
//! values derived from other settings (the shared resource sets, the
//! deploy-root layout) are plain methods, not stored state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DeployError, DeployResult};
use crate::linker::SharedResource;

/// How code is published into a release.
///
/// Only the local-build strategy exists: the application is built on the
/// operator's machine and the built tree is transferred to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeployStrategyKind {
    #[default]
    LocalBuild,
}

/// Deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// SSH destination (`user@host`); commands run through the local shell
    /// when absent
    #[serde(default)]
    pub host: Option<String>,

    /// Deployment root on the target; releases, shared storage and the
    /// current-symlink all live underneath it
    #[serde(default)]
    pub deploy_to: PathBuf,

    /// Local tree published into each release by the local-build strategy
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,

    /// The managed application's CLI tool
    #[serde(default = "default_command_path")]
    pub command_path: String,

    #[serde(default)]
    pub deploy_strategy: DeployStrategyKind,

    /// Environment name passed to migration and manifest operations
    #[serde(default = "default_environment_name")]
    pub environment_name: String,

    /// Site identifier parameterizing the shared resource path templates
    #[serde(default = "default_site_identifier")]
    pub site_identifier: String,

    /// Apply `chmod g+w` to releases and provisioned directories
    #[serde(default = "default_true")]
    pub group_writable: bool,

    /// Consumed by the build/publish collaborator, not by task logic
    #[serde(default)]
    pub normalize_asset_timestamps: bool,

    /// Explicit override of the derived shared file set
    #[serde(default)]
    pub shared_files: Option<Vec<String>>,

    /// Explicit override of the derived shared directory set
    #[serde(default)]
    pub shared_dirs: Option<Vec<String>>,
}

fn default_source_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_command_path() -> String {
    "appctl".to_string()
}

fn default_environment_name() -> String {
    "production".to_string()
}

fn default_site_identifier() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            host: None,
            deploy_to: PathBuf::new(),
            source_path: default_source_path(),
            command_path: default_command_path(),
            deploy_strategy: DeployStrategyKind::default(),
            environment_name: default_environment_name(),
            site_identifier: default_site_identifier(),
            group_writable: true,
            normalize_asset_timestamps: false,
            shared_files: None,
            shared_dirs: None,
        }
    }
}

impl DeployConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn load(path: &Path) -> DeployResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| DeployError::ConfigParse {
            file: path.to_path_buf(),
            source,
        })
    }

    /// User-level config path (`~/.config/drover/config.toml`)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("drover").join("config.toml"))
    }

    /// Resolve which config file to load: an explicit path wins, then the
    /// project file, then the user-level file. A missing explicit path is
    /// reported, a missing default path falls through.
    pub fn resolve_and_load(explicit: Option<&Path>) -> DeployResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(DeployError::InvalidSetting {
                    setting: "config",
                    reason: format!("config file {} does not exist", path.display()),
                });
            }
            return Self::load(path);
        }
        let project = Path::new("drover.toml");
        if project.exists() {
            return Self::load(project);
        }
        if let Some(user) = Self::user_config_path() {
            if user.exists() {
                return Self::load(&user);
            }
        }
        Ok(Self::default())
    }

    /// Apply `DROVER_*` environment variable overrides.
    ///
    /// Called once during configuration assembly, before the config is
    /// handed to any component.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("DROVER_HOST") {
            if !host.is_empty() {
                self.host = Some(host);
            }
        }
        if let Ok(deploy_to) = std::env::var("DROVER_DEPLOY_TO") {
            if !deploy_to.is_empty() {
                self.deploy_to = PathBuf::from(deploy_to);
            }
        }
        if let Ok(command_path) = std::env::var("DROVER_COMMAND_PATH") {
            if !command_path.is_empty() {
                self.command_path = command_path;
            }
        }
        if let Ok(environment) = std::env::var("DROVER_ENVIRONMENT") {
            if !environment.is_empty() {
                self.environment_name = environment;
            }
        }
        if let Ok(site) = std::env::var("DROVER_SITE") {
            if !site.is_empty() {
                self.site_identifier = site;
            }
        }
    }

    /// Validate the configuration before any remote operation is attempted
    pub fn validate(&self) -> DeployResult<()> {
        if self.deploy_to.as_os_str().is_empty() {
            return Err(DeployError::MissingSetting {
                setting: "deploy_to",
            });
        }
        if !self.deploy_to.is_absolute() {
            return Err(DeployError::InvalidSetting {
                setting: "deploy_to",
                reason: format!("must be an absolute path, got {}", self.deploy_to.display()),
            });
        }
        if self.command_path.trim().is_empty() {
            return Err(DeployError::MissingSetting {
                setting: "command_path",
            });
        }
        if self.site_identifier.trim().is_empty() {
            return Err(DeployError::MissingSetting {
                setting: "site_identifier",
            });
        }
        if self.site_identifier.contains('/') || self.site_identifier.contains(char::is_whitespace)
        {
            return Err(DeployError::InvalidSetting {
                setting: "site_identifier",
                reason: format!("'{}' must be a single path segment", self.site_identifier),
            });
        }
        self.shared_resources().map(|_| ())
    }

    /// Shared files linked into every release.
    ///
    /// Derived from `site_identifier` unless overridden in the config file.
    pub fn shared_files(&self) -> Vec<SharedResource> {
        match &self.shared_files {
            Some(paths) => paths.iter().map(SharedResource::file).collect(),
            None => vec![
                SharedResource::file(format!("sites/{}/settings.php", self.site_identifier)),
                SharedResource::file(format!(
                    "sites/{}/settings.local.php",
                    self.site_identifier
                )),
            ],
        }
    }

    /// Shared directories linked into every release
    pub fn shared_dirs(&self) -> Vec<SharedResource> {
        match &self.shared_dirs {
            Some(paths) => paths.iter().map(SharedResource::dir).collect(),
            None => vec![SharedResource::dir(format!(
                "sites/{}/files",
                self.site_identifier
            ))],
        }
    }

    /// The full shared resource set, files then directories, declaration
    /// order preserved. Duplicate paths are a configuration error.
    pub fn shared_resources(&self) -> DeployResult<Vec<SharedResource>> {
        let mut resources = self.shared_files();
        resources.extend(self.shared_dirs());

        let mut seen = std::collections::HashSet::new();
        for resource in &resources {
            if !seen.insert(resource.path.as_str()) {
                return Err(DeployError::DuplicateSharedPath {
                    path: resource.path.clone(),
                });
            }
        }
        Ok(resources)
    }

    /// Releases area under the deploy root
    pub fn releases_path(&self) -> PathBuf {
        self.deploy_to.join("releases")
    }

    /// Shared storage area under the deploy root
    pub fn shared_path(&self) -> PathBuf {
        self.deploy_to.join("shared")
    }

    /// The current-release symlink maintained by the release mechanism
    pub fn current_path(&self) -> PathBuf {
        self.deploy_to.join("current")
    }
}
