#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod config;
mod logging;
mod signals;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderName;
use clap::{Parser, Subcommand};
use nuages::NuagesService;
use nuages::infra::proxmox::ProxmoxClient;
use nuages::infra::storage::{self, SeaOrmNuageRepository};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, CliOverrides};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Nuages Server - container records kept in step with a Proxmox cluster
#[derive(Parser)]
#[command(name = "nuages-server")]
#[command(about = "Nuages Server - container records kept in step with a Proxmox cluster")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database (sqlite::memory:)
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(CliOverrides {
        port: cli.port,
        mock: cli.mock,
        verbose: cli.verbose,
    });

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_redacted_yaml()?);
        return Ok(());
    }

    logging::init_logging(&config.logging);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    config.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_redacted_yaml()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    config.validate()?;
    tracing::info!(
        bind_addr = %config.server.bind_addr,
        proxmox = %config.nuages.proxmox.base_url(),
        "Nuages Server starting"
    );

    let db = storage::connect(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;
    let repo = Arc::new(SeaOrmNuageRepository::new(db));
    let cluster = Arc::new(
        ProxmoxClient::new(&config.nuages.proxmox).context("failed to build Proxmox client")?,
    );
    let service = Arc::new(NuagesService::new(
        repo,
        cluster,
        config.nuages.service_config(),
    ));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let app = nuages::api::rest::router(service).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(request_id)),
    );

    let listener = TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(signals::shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Nuages Server stopped");
    Ok(())
}
