//! Drover CLI - deployment orchestrator
//!
//! Usage: drover <COMMAND>
//!
//! Commands:
//!   update      Deploy a new release of an installed application
//!   install     First deployment onto a provisioned target
//!   setup       Provision the deploy root and shared storage
//!   finalize    Re-establish shared resource links in the latest release
//!   offline     Put the application into maintenance mode
//!   online      Take the application out of maintenance mode
//!   cache-clear Clear the application cache
//!   run         Invoke any registered task by namespace:name
//!   tasks       List registered tasks

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;

use drover::{
    default_registry, ContextFlags, DeployConfig, DryRunTransport, InvokeOutcome,
    LocalBuildStrategy, LocalShell, PlanStrategy, Release, SshTransport, TaskContext, TaskName,
    Transport,
};

/// Drover - deployment orchestrator for web applications
#[derive(Parser, Debug)]
#[command(name = "drover")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file (default: ./drover.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SSH destination (user@host); overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Use this release root instead of resolving the latest release
    #[arg(long)]
    release: Option<PathBuf>,

    /// Treat this host as a non-primary deployment target
    #[arg(long)]
    no_primary: bool,

    /// Print the command batches without executing them
    #[arg(long)]
    dry_run: bool,

    /// Output format for CI
    #[arg(long, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy a new release of an installed application
    Update,

    /// First deployment onto a provisioned target
    Install,

    /// Provision the deploy root, releases area and shared storage
    Setup,

    /// Re-establish shared resource links in the latest release
    Finalize,

    /// Take the application out of maintenance mode
    Online,

    /// Put the application into maintenance mode
    Offline,

    /// Clear the application cache
    CacheClear {
        /// Clear only the lightweight cache tier
        #[arg(long)]
        light: bool,
    },

    /// Invoke a registered task by namespace:name
    Run {
        /// Task reference, e.g. orchestrator:updatedb
        task: String,
    },

    /// List registered tasks
    Tasks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Update => cmd_task(&cli, "Update", "deploy", "update"),
        Commands::Install => cmd_task(&cli, "Install", "deploy", "install"),
        Commands::Setup => cmd_task(&cli, "Setup", "deploy", "setup"),
        Commands::Finalize => cmd_task(&cli, "Finalize", "deploy", "finalize_update"),
        Commands::Online => cmd_task(&cli, "Online", "app", "online"),
        Commands::Offline => cmd_task(&cli, "Offline", "app", "offline"),
        Commands::CacheClear { light } => {
            let name = if *light { "cache_clear_light" } else { "cache_clear" };
            cmd_task(&cli, "Cache Clear", "app", name)
        }
        Commands::Run { task } => {
            let name = TaskName::parse(task)?;
            let namespace = name.namespace().to_string();
            let task = name.name().to_string();
            cmd_task(&cli, "Run", &namespace, &task)
        }
        Commands::Tasks => cmd_tasks(&cli),
    }
}

/// Transport selection, keeping the dry-run recorder reachable
enum RuntimeTransport {
    Real(Box<dyn Transport>),
    Dry(DryRunTransport),
}

impl RuntimeTransport {
    fn as_dyn(&self) -> &dyn Transport {
        match self {
            RuntimeTransport::Real(inner) => inner.as_ref(),
            RuntimeTransport::Dry(dry) => dry,
        }
    }

    fn plan(&self) -> Option<Vec<String>> {
        match self {
            RuntimeTransport::Real(_) => None,
            RuntimeTransport::Dry(dry) => Some(dry.recorded()),
        }
    }
}

fn load_config(cli: &Cli) -> Result<DeployConfig> {
    let mut config = DeployConfig::resolve_and_load(cli.config.as_deref())?;
    config.apply_env();
    if let Some(host) = &cli.host {
        config.host = Some(host.clone());
    }
    config.validate()?;
    Ok(config)
}

fn build_transport(cli: &Cli, config: &DeployConfig) -> RuntimeTransport {
    let base: Box<dyn Transport> = match &config.host {
        Some(host) => Box::new(SshTransport::new(host.clone())),
        None => Box::new(LocalShell),
    };
    if cli.dry_run {
        RuntimeTransport::Dry(DryRunTransport::new(base))
    } else {
        RuntimeTransport::Real(base)
    }
}

fn cmd_task(cli: &Cli, title: &str, namespace: &str, name: &str) -> Result<()> {
    let config = load_config(cli)?;
    let transport = build_transport(cli, &config);
    let fancy = !cli.json && std::io::stdout().is_terminal();

    let release = match &cli.release {
        Some(root) => Some(Release::new(root.clone())),
        None => Release::resolve_latest(transport.as_dyn(), &config)?,
    };

    if !cli.json {
        if fancy {
            println!("🚚 Drover {}", title);
        } else {
            println!("Drover {}", title);
        }
        println!("Target: {}", transport.as_dyn().describe());
        match &release {
            Some(release) => println!("Release: {}", release.root.display()),
            None => println!("Release: none"),
        }
        if cli.no_primary {
            println!("Mode: non-primary host");
        }
        println!();
    }

    let registry = default_registry();
    let local_build = LocalBuildStrategy;
    let plan_strategy = PlanStrategy;
    let strategy: &dyn drover::DeployStrategy = if cli.dry_run {
        &plan_strategy
    } else {
        &local_build
    };

    let flags = ContextFlags::new(!cli.no_primary, release.is_none());
    let ctx = TaskContext {
        config: &config,
        transport: transport.as_dyn(),
        registry: &registry,
        strategy,
        flags,
        release,
    };

    let task = TaskName::new(namespace, name);
    let outcome = registry.invoke(&task, &ctx)?;

    if let Some(plan) = transport.plan() {
        if cli.json {
            let output = serde_json::json!({
                "event": "plan",
                "task": task.to_string(),
                "commands": plan,
            });
            println!("{}", serde_json::to_string(&output)?);
        } else {
            if plan.is_empty() {
                println!("Plan: nothing to do");
            } else {
                println!("Plan:");
                for command in &plan {
                    println!("  → {}", command);
                }
            }
            println!();
        }
    }

    if cli.json {
        let output = serde_json::json!({
            "event": "task",
            "task": task.to_string(),
            "outcome": match outcome {
                InvokeOutcome::Ran => "ran",
                InvokeOutcome::Skipped => "skipped",
            },
            "dry_run": cli.dry_run,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        match outcome {
            InvokeOutcome::Ran if cli.dry_run => {
                println!("{} {} planned", if fancy { "✓" } else { "OK" }, task)
            }
            InvokeOutcome::Ran => {
                println!("{} {} complete", if fancy { "✓" } else { "OK" }, task)
            }
            InvokeOutcome::Skipped => {
                println!("{} {} skipped (conditions not met)", if fancy { "⚠" } else { "--" }, task)
            }
        }
    }

    Ok(())
}

fn cmd_tasks(cli: &Cli) -> Result<()> {
    let registry = default_registry();

    if cli.json {
        let names: Vec<String> = registry.names().iter().map(|n| n.to_string()).collect();
        let output = serde_json::json!({ "event": "tasks", "tasks": names });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Registered tasks:\n");
        for name in registry.names() {
            println!("  {}", name);
        }
    }

    Ok(())
}
