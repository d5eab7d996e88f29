//! Maintenance mode
//!
//! The managed application serves a placeholder response to end users while
//! its maintenance flag is set. The flag is host-independent (one
//! authoritative host owns it), so transitions are primary-only. State is
//! never read back: each workflow sets the state it needs explicitly.

use crate::config::DeployConfig;
use crate::release::Release;
use crate::shell::{CommandBatch, ShellCommand};

/// Application availability state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceState {
    Online,
    Offline,
}

impl MaintenanceState {
    /// Value written to the application's maintenance flag
    pub fn flag_value(self) -> &'static str {
        match self {
            MaintenanceState::Online => "0",
            MaintenanceState::Offline => "1",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            MaintenanceState::Online => "online",
            MaintenanceState::Offline => "offline",
        }
    }
}

/// Commands that move the application into `state`: set the maintenance
/// flag inside the latest release. Cache clearing follows as a separate
/// task invocation so overrides of `app:cache_clear` take effect here too.
pub fn transition_batch(
    state: MaintenanceState,
    config: &DeployConfig,
    release: &Release,
) -> CommandBatch {
    let mut batch = CommandBatch::new();
    batch.push(ShellCommand::program("cd").arg(release.root.display().to_string()));
    batch.push(
        ShellCommand::program(&config.command_path)
            .arg("state-set")
            .arg("maintenance_mode")
            .arg(state.flag_value())
            .arg("--yes"),
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn offline_sets_flag_to_one() {
        let config = DeployConfig {
            deploy_to: PathBuf::from("/srv/app"),
            ..DeployConfig::default()
        };
        let release = Release::new("/srv/app/releases/20240311083000");
        let batch = transition_batch(MaintenanceState::Offline, &config, &release);
        assert_eq!(
            batch.render().unwrap(),
            "cd /srv/app/releases/20240311083000 && appctl state-set maintenance_mode 1 --yes"
        );
    }

    #[test]
    fn online_sets_flag_to_zero() {
        let config = DeployConfig {
            deploy_to: PathBuf::from("/srv/app"),
            command_path: "/opt/bin/appctl".to_string(),
            ..DeployConfig::default()
        };
        let release = Release::new("/srv/app/releases/1");
        let batch = transition_batch(MaintenanceState::Online, &config, &release);
        assert_eq!(
            batch.render().unwrap(),
            "cd /srv/app/releases/1 && /opt/bin/appctl state-set maintenance_mode 0 --yes"
        );
    }

    #[test]
    fn state_descriptions() {
        assert_eq!(MaintenanceState::Online.describe(), "online");
        assert_eq!(MaintenanceState::Offline.describe(), "offline");
        assert_eq!(MaintenanceState::Online.flag_value(), "0");
        assert_eq!(MaintenanceState::Offline.flag_value(), "1");
    }
}
