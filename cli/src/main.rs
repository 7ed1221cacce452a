use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use common::log::tracing_factory::{OutputType, TracingFactory, TracingFactoryOptions};
use supervisor::{ConnectorConfigStore, SupervisorRegistry};

/// Mirrors the teacher's own `CliArgs`: a config-file path plus a handful
/// of overrides merged over it.
#[derive(Parser, Debug)]
#[command(name = "cdc-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Change-data-capture ingestion engine")]
struct CliArgs {
    /// Path to the TOML configuration file (§10.2).
    #[arg(short, long, help = "Path to loaded configuration file", value_name = "FILE")]
    config: PathBuf,

    #[arg(short, long, help = "enable debug logging", default_value_t = false)]
    debug: bool,

    /// Overrides `admin_bind_addr` from the configuration file.
    #[arg(long, help = "admin HTTP bind address", value_name = "HOST:PORT")]
    admin_bind_addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let store = ConnectorConfigStore::load(&args.config)?;

    let log_dir = format!("{}/logs", store.config().metadata_dir);
    TracingFactory::init_log_with_options(TracingFactoryOptions::new(args.debug, OutputType::Log, Some(log_dir)));

    let admin_bind_addr = args.admin_bind_addr.unwrap_or_else(|| store.config().admin_bind_addr.clone());
    let connector_names: Vec<String> = store.config().connectors.iter().map(|c| c.name.clone()).collect();

    eprintln!();
    eprintln!("╔╦╗╔═╗ ╔═╗╔╦╗╦  ");
    eprintln!(" ║ ╠═╣ ║   ║ ║  ");
    eprintln!(" ╩ ╩ ╩ ╚═╝ ╩ ╩═╝ Rust CDC ingestion engine");
    eprintln!();

    let registry = SupervisorRegistry::new(store);

    for name in &connector_names {
        match registry.start(name).await {
            Ok(()) => info!(connector = %name, "started"),
            Err(e) => error!(connector = %name, error = %e, "failed to start"),
        }
    }

    let admin_registry = registry.clone();
    let admin_handle = tokio::spawn(async move {
        if let Err(e) = web::serve(admin_registry, &admin_bind_addr).await {
            error!(error = %e, "admin HTTP server exited");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping connectors");

    for name in &connector_names {
        if let Err(e) = registry.stop(name).await {
            tracing::warn!(connector = %name, error = %e, "error stopping connector");
        }
    }

    admin_handle.abort();
    Ok(())
}
