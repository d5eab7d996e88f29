//! Default task set and workflows
//!
//! Registers every built-in task under the `deploy`, `app` and
//! `orchestrator` namespaces and defines the two top-level flows: `install`
//! (first deployment) and `update` (every subsequent one). Each flow runs
//! as one abort-on-failure step sequence. Embedders customize behavior by
//! re-registering tasks over the defaults.

use crate::linker::link_commands;
use crate::maintenance::{transition_batch, MaintenanceState};
use crate::runner::StepSequence;
use crate::shell::{quote, CommandBatch, ShellCommand};
use crate::tasks::{ContextFlag, ExecutionCondition, TaskContext, TaskName, TaskRegistry};

fn in_latest_release(ctx: &TaskContext) -> crate::error::DeployResult<CommandBatch> {
    let release = ctx.release()?;
    let mut batch = CommandBatch::new();
    batch.push(ShellCommand::program("cd").arg(release.root.display().to_string()));
    Ok(batch)
}

/// Steps of the update workflow: refresh code, go dark, re-link shared
/// resources, migrate, come back online.
pub fn update_sequence() -> StepSequence {
    [
        TaskName::new("deploy", "update_code"),
        TaskName::new("app", "offline"),
        TaskName::new("deploy", "finalize_update"),
        TaskName::new("orchestrator", "update"),
        TaskName::new("app", "online"),
    ]
    .into_iter()
    .collect()
}

/// Steps of the install workflow. No maintenance toggle: there is no
/// audience yet on a first deployment.
pub fn install_sequence() -> StepSequence {
    [
        TaskName::new("deploy", "update_code"),
        TaskName::new("deploy", "finalize_update"),
        TaskName::new("orchestrator", "install"),
    ]
    .into_iter()
    .collect()
}

/// Build the registry with the full default task set
pub fn default_registry() -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    register_deploy_tasks(&mut registry);
    register_app_tasks(&mut registry);
    register_orchestrator_tasks(&mut registry);
    registry
}

fn register_deploy_tasks(registry: &mut TaskRegistry) {
    registry.register("deploy", "update_code", vec![], |ctx| {
        ctx.strategy.update_code(ctx)
    });

    // Re-establish shared resources inside the release, as one remote
    // invocation. Re-runnable: converges an already- or partially-linked
    // release to the fully-linked state.
    registry.register(
        "deploy",
        "finalize_update",
        vec![ExecutionCondition::ExcludeAny(vec![ContextFlag::NoRelease])],
        |ctx| {
            let release = ctx.release()?;
            let mut batch = CommandBatch::new();
            if ctx.config.group_writable {
                batch.push(
                    ShellCommand::program("chmod")
                        .arg("-R")
                        .arg("--")
                        .arg("g+w")
                        .arg(release.root.display().to_string()),
                );
            }
            batch.extend(link_commands(
                &ctx.config.shared_resources()?,
                &release.root,
                &ctx.config.shared_path(),
            ));
            ctx.run_batch(&batch)
        },
    );

    // Provision the directory skeleton. mkdir -p keeps repeated runs from
    // failing on directories that already exist.
    registry.register("deploy", "setup", vec![], |ctx| {
        let config = ctx.config;
        let mut dirs = vec![
            config.deploy_to.clone(),
            config.releases_path(),
            config.shared_path(),
        ];
        for resource in config.shared_dirs() {
            dirs.push(config.shared_path().join(resource.basename()));
        }
        let dir_args: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();

        let mut batch = CommandBatch::new();
        batch.push(ShellCommand::program("mkdir").arg("-p").args(dir_args.clone()));
        if config.group_writable {
            batch.push(ShellCommand::program("chmod").arg("g+w").args(dir_args));
        }
        ctx.run_batch(&batch)
    });

    registry.register("deploy", "update", vec![], |ctx| update_sequence().run(ctx));

    registry.register("deploy", "install", vec![], |ctx| {
        install_sequence().run(ctx)
    });
}

fn register_app_tasks(registry: &mut TaskRegistry) {
    let host_singleton = || {
        vec![
            ExecutionCondition::ExcludeAny(vec![ContextFlag::NoRelease]),
            ExecutionCondition::RequireAll(vec![ContextFlag::Primary]),
        ]
    };

    registry.register("app", "cache_clear", host_singleton(), |ctx| {
        let mut batch = in_latest_release(ctx)?;
        batch.push(
            ShellCommand::program(&ctx.config.command_path)
                .arg("cache-clear")
                .arg("all"),
        );
        ctx.run_batch(&batch)
    });

    // The lightweight cache tier is safe to clear on every host.
    registry.register("app", "cache_clear_light", vec![], |ctx| {
        let mut batch = in_latest_release(ctx)?;
        batch.push(
            ShellCommand::program(&ctx.config.command_path)
                .arg("cache-clear")
                .arg("light"),
        );
        ctx.run_batch(&batch)
    });

    registry.register("app", "offline", host_singleton(), |ctx| {
        let batch = transition_batch(MaintenanceState::Offline, ctx.config, ctx.release()?);
        ctx.run_batch(&batch)?;
        ctx.invoke("app", "cache_clear").map(|_| ())
    });

    registry.register("app", "online", host_singleton(), |ctx| {
        let batch = transition_batch(MaintenanceState::Online, ctx.config, ctx.release()?);
        ctx.run_batch(&batch)?;
        ctx.invoke("app", "cache_clear").map(|_| ())
    });
}

fn register_orchestrator_tasks(registry: &mut TaskRegistry) {
    registry.register("orchestrator", "install", vec![], |ctx| {
        let sequence: StepSequence = [
            TaskName::new("orchestrator", "initialize_database"),
            TaskName::new("app", "cache_clear"),
            TaskName::new("orchestrator", "update"),
        ]
        .into_iter()
        .collect();
        sequence.run(ctx)
    });

    registry.register("orchestrator", "update", vec![], |ctx| {
        let sequence: StepSequence = [
            TaskName::new("orchestrator", "apply_module_dependencies"),
            TaskName::new("orchestrator", "updatedb"),
            TaskName::new("app", "cache_clear_light"),
            TaskName::new("orchestrator", "features_revert"),
            TaskName::new("app", "cache_clear"),
            TaskName::new("orchestrator", "manifests"),
            TaskName::new("app", "cache_clear"),
        ]
        .into_iter()
        .collect();
        sequence.run(ctx)
    });

    registry.register("orchestrator", "initialize_database", vec![], |ctx| {
        let cmd = quote(&ctx.config.command_path);
        let mut batch = in_latest_release(ctx)?;
        // The install profile comes from the application's own environment
        // probe; the substitution must reach the remote shell unquoted.
        batch.push(ShellCommand::raw(format!(
            "{cmd} site-install $({cmd} env-info --pipe) --yes"
        )));
        ctx.run_batch(&batch)
    });

    registry.register("orchestrator", "apply_module_dependencies", vec![], |ctx| {
        let mut batch = in_latest_release(ctx)?;
        batch.push(
            ShellCommand::program(&ctx.config.command_path)
                .arg("apply-module-dependencies")
                .arg(&ctx.config.environment_name),
        );
        ctx.run_batch(&batch)
    });

    registry.register("orchestrator", "updatedb", vec![], |ctx| {
        let mut batch = in_latest_release(ctx)?;
        batch.push(
            ShellCommand::program(&ctx.config.command_path)
                .arg("updatedb")
                .arg("--yes"),
        );
        ctx.run_batch(&batch)
    });

    registry.register("orchestrator", "features_revert", vec![], |ctx| {
        let mut batch = in_latest_release(ctx)?;
        batch.push(
            ShellCommand::program(&ctx.config.command_path)
                .arg("features-revert")
                .arg("--yes"),
        );
        ctx.run_batch(&batch)
    });

    registry.register("orchestrator", "manifests", vec![], |ctx| {
        let mut batch = in_latest_release(ctx)?;
        batch.push(
            ShellCommand::program(&ctx.config.command_path)
                .arg("manifests")
                .arg(&ctx.config.environment_name),
        );
        ctx.run_batch(&batch)
    });
}
