//! Travels API Server
//!
//! Run with: cargo run --bin travels -- --data /tmp/data/data.zip
//!
//! # Configuration
//!
//! Defaults, then a TOML file, then `TRAVELS_*` environment variables,
//! then the flags below. `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use travels::api::{serve, AppState};
use travels::config::{generate_default_config, Config, LoggingConfig};
use travels::loader::ArchiveLoader;
use travels::store::EntityStore;

#[derive(Parser)]
#[command(name = "travels")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-memory HTTP store for users, locations and visits")]
struct Args {
    /// Address to listen on, as host:port (":80" binds every interface)
    #[arg(short, long)]
    bind: Option<String>,

    /// ZIP archive to load at startup
    #[arg(long)]
    data: Option<PathBuf>,

    /// Log every request
    #[arg(short = 'v', long)]
    access_log: bool,

    /// Disable the requests-per-second log
    #[arg(long)]
    no_rps: bool,

    /// Config file (default: search the usual locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    // Fails before logging is up; the error is printed on exit
    let (config, source) = load_config(&args)?;
    init_logging(&config.logging);

    match &source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    tracing::info!(
        workers = config.loader.max_workers,
        shards = config.store.shards,
        "Starting Travels v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = Arc::new(EntityStore::new(config.store_config()));

    // The server answers while the archive is still loading
    let loader = ArchiveLoader::new(Arc::clone(&store), config.loader_config());
    let load = loader.spawn();
    tokio::spawn(async move {
        match load.await {
            Ok(Ok(_summary)) => {}
            Ok(Err(e)) => {
                tracing::error!("Failed to load data: {}", e);
                std::process::exit(1);
            }
            Err(e) => {
                tracing::error!("Loader task failed: {}", e);
                std::process::exit(1);
            }
        }
    });

    let api_config = config.api_config();
    serve(AppState::new(Arc::clone(&store), api_config.clone()), &api_config).await?;

    tracing::info!("Travels stopped ({})", store.stats());
    Ok(())
}

/// Resolve configuration: file and environment, then command-line flags
///
/// Also returns the config file that was read, if any.
fn load_config(args: &Args) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let (mut config, source) = match &args.config {
        Some(path) => (Config::load_with_env(path)?, Some(path.clone())),
        None => Config::load_default()?,
    };
    apply_args(&mut config, args)?;
    config.validate()?;
    Ok((config, source))
}

fn apply_args(config: &mut Config, args: &Args) -> anyhow::Result<()> {
    if let Some(bind) = &args.bind {
        let (host, port) = parse_bind(bind)?;
        config.server.host = host;
        config.server.port = port;
    }
    if let Some(data) = &args.data {
        config.data.archive = data.clone();
    }
    if args.access_log {
        config.server.access_log = true;
    }
    if args.no_rps {
        config.server.rps_watcher = false;
    }
    Ok(())
}

/// Split `host:port`; an empty host means every interface
fn parse_bind(bind: &str) -> anyhow::Result<(String, u16)> {
    let (host, port) = bind
        .rsplit_once(':')
        .with_context(|| format!("Invalid bind address {:?}: expected host:port", bind))?;
    let port = port
        .parse()
        .with_context(|| format!("Invalid port in bind address {:?}", bind))?;
    let host = if host.is_empty() { "0.0.0.0" } else { host };
    Ok((host.to_string(), port))
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("travels={},tower_http={}", logging.level, logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
