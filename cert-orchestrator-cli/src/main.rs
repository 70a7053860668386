//! Cert Orchestrator command line
//!
//! Requests the DNS-validated certificates declared in a TOML file and keeps
//! their state next to it, so running `up` again with an unchanged file
//! touches nothing.
//!
//! # Usage
//! ```bash
//! # Create or update every declared certificate
//! cert-orchestrator --config ./certs.toml up
//!
//! # Show what the state file records
//! cert-orchestrator --config ./certs.toml state --json
//! ```

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use cert_orchestrator_core::{
    DeploymentSummary, DnsValidatedCertificate, DnsValidatedCertificateArgs, Engine,
    JsonFileStateStore, ResourceOptions, StateStore,
};
use cert_orchestrator_provider::{
    CertificateManager, InMemoryCertificateManager, create_certificate_manager,
    create_dns_adapter,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

#[derive(Parser)]
#[command(name = "cert-orchestrator")]
#[command(about = "Request DNS-validated certificates", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: <config dir>/cert-orchestrator/config.toml)
    #[arg(short, long, env = "CERT_ORCHESTRATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the declared certificates
    Up {
        /// Print the deployment summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the resources recorded in the state file
    State {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    // stdout carries the results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when the command ran but something in it failed.
async fn run(cli: Cli) -> Result<bool> {
    let config_path = config::resolve_path(cli.config);
    let config = Config::load(&config_path)?;
    let state_path = config.state_path(&config_path);

    match cli.command {
        Commands::Up { json } => up(&config, &state_path, json).await,
        Commands::State { json } => {
            show_state(&state_path, json).await?;
            Ok(true)
        }
    }
}

async fn up(config: &Config, state_path: &Path, json: bool) -> Result<bool> {
    let env = |key: &str| std::env::var(key).ok();

    let dns = create_dns_adapter(config.dns_adapter(&env)?)
        .context("Failed to create DNS adapter")?;
    let manager: Arc<dyn CertificateManager> = match config.aws_config(&env)? {
        Some(aws) => create_certificate_manager(&aws)
            .context("Failed to create certificate manager")?,
        None => {
            tracing::warn!("No [aws] section; using the in-process certificate manager");
            Arc::new(InMemoryCertificateManager::new())
        }
    };

    tracing::info!(
        "Deploying {}/{} ({} certificate(s), DNS via {}, state in {})",
        config.project,
        config.stack,
        config.certificates.len(),
        dns.id(),
        state_path.display()
    );

    let engine = Engine::builder(&config.project, &config.stack)
        .state_store(Arc::new(JsonFileStateStore::new(state_path)))
        .certificate_manager(manager)
        .build();

    let mut certificates = Vec::with_capacity(config.certificates.len());
    for entry in &config.certificates {
        let mut args =
            DnsValidatedCertificateArgs::new(entry.domain_name.clone(), Arc::clone(&dns));
        if let Some(names) = &entry.alternative_names {
            args = args.alternative_names(names.clone());
        }
        let cert =
            DnsValidatedCertificate::new(&engine, &entry.name, args, ResourceOptions::new())?;
        certificates.push((entry.name.as_str(), cert));
    }

    let summary = engine.finish().await;

    let mut arns = serde_json::Map::new();
    for (name, cert) in &certificates {
        match cert.arn().resolve().await {
            Ok(arn) => {
                arns.insert((*name).to_string(), arn.into());
            }
            Err(e) => tracing::debug!("{name} has no ARN: {e}"),
        }
    }

    if json {
        let report = serde_json::json!({ "summary": summary, "certificates": arns });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&summary, &arns);
    }

    Ok(summary.is_success())
}

fn print_summary(summary: &DeploymentSummary, arns: &serde_json::Map<String, serde_json::Value>) {
    for step in &summary.steps {
        println!("{:>8}  {}", step.op, step.urn);
    }
    for failure in &summary.failures {
        println!("{:>8}  {}: {}", "failed", failure.urn, failure.error);
    }
    for urn in &summary.untracked {
        println!("{:>8}  {urn}", "untracked");
    }
    if summary.is_noop() {
        println!("No changes.");
    }
    for (name, arn) in arns {
        println!("{name}: {}", arn.as_str().unwrap_or_default());
    }
}

async fn show_state(state_path: &Path, json: bool) -> Result<()> {
    let store = JsonFileStateStore::new(state_path);
    let resources = store
        .list()
        .await
        .with_context(|| format!("Failed to read state file {}", state_path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resources)?);
        return Ok(());
    }
    if resources.is_empty() {
        println!("{} records no resources", state_path.display());
    }
    for resource in &resources {
        println!("{}  {}", resource.type_token, resource.urn);
    }
    Ok(())
}
