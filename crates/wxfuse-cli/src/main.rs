use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use wxfuse_cache::DiskCache;
use wxfuse_config::AppConfig;
use wxfuse_core::{AggregateRecord, Location};

#[derive(Parser)]
#[command(name = "wxfuse")]
#[command(about = "Merged weather, air quality and aurora data for a coordinate", long_about = None)]
struct Cli {
    /// TOML config file (defaults to $WXFUSE_CONFIG, then wxfuse.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the merged record for a location and print it as JSON
    Fetch {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// WeatherAPI.com key (overrides config and WEATHERAPI_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Skip the cache for both reading and writing
        #[arg(long)]
        no_cache: bool,
    },
    /// List every field of the record with its unit
    Fields,
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,
    },
    /// Cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached record
    Purge {
        /// Cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Observability
    wxfuse_obs::init("wxfuse");

    let cfg = load_config(cli.config.as_deref());

    match cli.command {
        Command::Fetch {
            lat,
            lon,
            api_key,
            cache_dir,
            no_cache,
        } => {
            let mut cfg = cfg.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "invalid config, using defaults");
                AppConfig::from_env()
            });
            if let Some(key) = api_key {
                cfg.set_api_key(key);
            }
            if let Some(dir) = cache_dir {
                cfg.set_cache_dir(dir);
            }
            if no_cache {
                cfg.set_cache_enabled(false);
            }
            fetch(&cfg, lat, lon).await
        }
        Command::Fields => {
            print!("{}", wxfuse_cli::fields_table());
            Ok(())
        }
        Command::Serve { bind } => serve(cfg?, bind).await,
        Command::Cache {
            action: CacheAction::Purge { cache_dir },
        } => {
            let cfg = cfg?;
            let dir = cache_dir.unwrap_or_else(|| cfg.cache_dir());
            let removed = DiskCache::new(&dir, cfg.cache_ttl())
                .purge()
                .with_context(|| format!("failed to purge cache at {}", dir.display()))?;
            println!("Removed {} cache entries from {}", removed, dir.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let mut cfg = AppConfig::from_path(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            cfg.apply_env();
            cfg.validate()?;
            Ok(cfg)
        }
        None => Ok(AppConfig::load()?),
    }
}

async fn fetch(cfg: &AppConfig, lat: f64, lon: f64) -> Result<()> {
    let record = match wxfuse_cli::Aggregator::from_config(cfg) {
        Ok(aggregator) => aggregator.aggregate(lat, lon).await.record,
        Err(e) => {
            tracing::error!(error = ?e, "cannot reach any source");
            AggregateRecord {
                location: Location {
                    generated_at: Some(chrono::Utc::now().timestamp()),
                    ..Location::new(lat, lon)
                },
                ..AggregateRecord::default()
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn serve(cfg: AppConfig, bind: Option<String>) -> Result<()> {
    let aggregator = wxfuse_cli::Aggregator::from_config(&cfg)?;
    let (app, state) = wxfuse_cli::build_app(aggregator)?;

    let bind = bind.unwrap_or_else(|| cfg.http_bind());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {bind}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    // Mark ready just before serving
    wxfuse_cli::set_ready(&state, true);

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
