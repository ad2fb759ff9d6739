//! actionmap demo server.
//!
//! Serves the sample actions in `actionmap::demo` behind the full middleware
//! stack. Configuration comes from an optional TOML file, with a few
//! command-line overrides.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use actionmap::config::{load_config, validate_config, AppConfig, ConfigError};
use actionmap::http::{set_drop_context, HttpServer};
use actionmap::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "actionmap", version, about = "Map HTTP requests to typed actions")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener address, overrides listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,

    /// Deployment context path, overrides context.path
    #[arg(long)]
    context: Option<String>,
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(context) = &cli.context {
        config.context.path = context.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("actionmap v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        context_path = %config.context.path,
        drop_context = config.context.drop_context,
        forwarded = config.forwarded.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    set_drop_context(config.context.drop_context);

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let table = actionmap::demo::route_table()?;
    let server = HttpServer::new(config, table);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
