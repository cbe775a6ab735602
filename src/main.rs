mod artifacts;
mod config;
mod device;
mod error;
mod ibns;
mod inventory;
mod models;
mod parsers;
mod pipeline;
mod render;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artifacts::ArtifactWriter;
use config::Config;
use device::{Credentials, SshConnector};
use inventory::Inventory;
use models::HostEntry;
use pipeline::Pipeline;
use render::TeraRenderer;

/// Roll out IBNS dot1x configuration to Catalyst access switches
#[derive(Debug, Parser)]
#[command(name = "dot1x-applier", version, about)]
struct Cli {
    /// Inventory directory (hosts.yaml, groups.yaml, defaults.yaml)
    #[arg(long)]
    inventory: Option<PathBuf>,

    /// Directory holding the Jinja2 templates
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Maximum switches processed at once
    #[arg(long)]
    workers: Option<usize>,

    /// Only run hosts with this platform; empty runs all hosts
    #[arg(long)]
    platform: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    yes: bool,
}

impl Cli {
    /// Flags win over environment configuration
    fn apply(self, mut cfg: Config) -> Config {
        if let Some(dir) = self.inventory {
            cfg.inventory_dir = dir;
        }
        if let Some(dir) = self.templates {
            cfg.templates_dir = dir;
        }
        if let Some(workers) = self.workers {
            cfg.max_workers = workers;
        }
        if let Some(platform) = self.platform {
            cfg.platform_filter = platform;
        }
        cfg.normalized()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dot1x_applier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let assume_yes = cli.yes;
    let cfg = cli.apply(Config::load());
    tracing::info!("Inventory: {}", cfg.inventory_dir.display());
    tracing::info!("Templates: {}", cfg.templates_dir.display());
    tracing::info!("Workers: {}", cfg.max_workers);

    let hosts = Inventory::load(&cfg.inventory_dir)?.filter_platform(&cfg.platform_filter);
    if hosts.is_empty() {
        tracing::warn!("No hosts match platform {:?}; nothing to do", cfg.platform_filter);
        return Ok(());
    }
    tracing::info!("{} switches selected", hosts.len());

    let renderer = TeraRenderer::from_dir(&cfg.templates_dir)?;
    let credentials = resolve_credentials(&cfg, &hosts)?;

    if !confirm_run(&hosts, assume_yes)? {
        tracing::info!("Run aborted by operator");
        return Ok(());
    }

    let pipeline = Pipeline::new(
        Arc::new(SshConnector::new(credentials, cfg.ssh_timeout_secs)),
        Arc::new(renderer),
        cfg.max_workers,
        cfg.expected_dot1x_status.clone(),
    )
    .with_artifacts(ArtifactWriter::new(cfg.configs_dir.clone(), cfg.output_dir.clone()));

    let cancel = pipeline.cancellation_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::warn!("Interrupt received; finishing in-flight stages");
        cancel.cancel();
    });

    let summary = pipeline.run(hosts).await;
    print!("{}", summary);

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Fallback login for hosts without inventory credentials; prompts when the environment has none
fn resolve_credentials(cfg: &Config, hosts: &[HostEntry]) -> Result<Credentials> {
    let mut credentials = Credentials {
        username: cfg.ssh_user.clone(),
        password: cfg.ssh_pass.clone(),
    };
    if credentials.is_complete() || hosts.iter().all(HostEntry::has_credentials) {
        return Ok(credentials);
    }

    if credentials.username.is_empty() {
        credentials.username = dialoguer::Input::new()
            .with_prompt("SSH username")
            .interact_text()
            .context("Failed to read SSH username")?;
    }
    if credentials.password.is_empty() {
        credentials.password = dialoguer::Password::new()
            .with_prompt("SSH password")
            .interact()
            .context("Failed to read SSH password")?;
    }
    Ok(credentials)
}

fn confirm_run(hosts: &[HostEntry], assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    for host in hosts {
        println!("  {} ({})", host.name, host.address);
    }
    dialoguer::Confirm::new()
        .with_prompt(format!("Apply dot1x configuration to {} switches?", hosts.len()))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
