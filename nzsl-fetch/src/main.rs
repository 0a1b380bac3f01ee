//! nzsl-fetch - NZSL sign video lookup and download
//!
//! Runs either as an HTTP service (`serve`, the default) or as a one-shot
//! CLI command against the same corpus and video directories.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nzsl_common::config::{load_toml_config, resolve_config_path, Overrides, Settings};
use nzsl_common::NzslId;
use nzsl_fetch::services::{CorpusReducer, DownloadOutcome, FetchPipeline, VideoAsset};
use nzsl_fetch::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for nzsl-fetch
#[derive(Parser, Debug)]
#[command(name = "nzsl-fetch")]
#[command(about = "Look up NZSL signs by gloss and download their videos")]
#[command(version)]
struct Args {
    /// TOML config file (also NZSL_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Sign page root URL
    #[arg(long, global = true, env = "NZSL_BASE_URL")]
    base_url: Option<String>,

    /// Directory of raw per-sign JSON records
    #[arg(long, global = true, env = "NZSL_RAW_CORPUS_DIR")]
    raw_corpus_dir: Option<PathBuf>,

    /// Directory for normalized records
    #[arg(long, global = true, env = "NZSL_NORMALIZED_CORPUS_DIR")]
    normalized_corpus_dir: Option<PathBuf>,

    /// Directory scanned by gloss lookups
    #[arg(long, global = true, env = "NZSL_LOOKUP_DIR")]
    lookup_dir: Option<PathBuf>,

    /// Directory downloaded videos are written to
    #[arg(long, global = true, env = "NZSL_VIDEO_DIR")]
    video_dir: Option<PathBuf>,

    /// Outbound HTTP timeout in seconds
    #[arg(long, global = true, env = "NZSL_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins if set
    #[arg(long, global = true, env = "NZSL_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to bind
        #[arg(long, env = "NZSL_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "NZSL_PORT")]
        port: Option<u16>,
    },

    /// Write a normalized copy of the raw corpus
    Reduce,

    /// Print the identifier a gloss term resolves to
    Lookup {
        /// Gloss term
        term: String,
    },

    /// Resolve a gloss term and download its video
    Fetch {
        /// Gloss term
        term: String,
    },

    /// Download the video of a known sign
    FetchId {
        /// NZSL identifier
        id: NzslId,
    },
}

impl Args {
    fn overrides(&self) -> Overrides {
        let (host, port) = match &self.command {
            Some(Command::Serve { host, port }) => (host.clone(), *port),
            _ => (None, None),
        };

        Overrides {
            base_url: self.base_url.clone(),
            raw_corpus_dir: self.raw_corpus_dir.clone(),
            normalized_corpus_dir: self.normalized_corpus_dir.clone(),
            lookup_dir: self.lookup_dir.clone(),
            video_dir: self.video_dir.clone(),
            host,
            port,
            request_timeout_secs: self.request_timeout_secs,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing first; config loading logs through it
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting nzsl-fetch v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let source = resolve_config_path(args.config.as_deref());
    let file = load_toml_config(&source).context("Failed to load configuration")?;
    let settings = Settings::resolve(&args.overrides(), &file).context("Invalid configuration")?;

    // RUST_LOG wins over the configured level
    if std::env::var_os("RUST_LOG").is_none() {
        filter_handle
            .reload(EnvFilter::new(&settings.log_level))
            .context("Failed to apply log level")?;
    }

    match args.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { .. } => serve(&settings).await,
        Command::Reduce => reduce(&settings).await,
        Command::Lookup { term } => lookup(&settings, &term).await,
        Command::Fetch { term } => {
            let pipeline = FetchPipeline::from_settings(&settings)?;
            let asset = pipeline.fetch_by_query(&term).await?;
            report(&asset);
            Ok(())
        }
        Command::FetchId { id } => {
            let pipeline = FetchPipeline::from_settings(&settings)?;
            let asset = pipeline.fetch_by_id(id).await?;
            report(&asset);
            Ok(())
        }
    }
}

async fn serve(settings: &Settings) -> Result<()> {
    info!("Sign pages: {}", settings.base_url);
    info!("Lookup corpus: {}", settings.lookup_dir.display());
    info!("Video directory: {}", settings.video_dir.display());

    let pipeline = FetchPipeline::from_settings(settings).context("Failed to build HTTP client")?;
    let app = build_router(AppState::new(pipeline));

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("nzsl-fetch listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn reduce(settings: &Settings) -> Result<()> {
    let reducer = CorpusReducer::new(&settings.raw_corpus_dir, &settings.normalized_corpus_dir);
    let summary = tokio::task::spawn_blocking(move || reducer.run()).await??;

    println!(
        "Reduced {} records: {} written, {} skipped, {} failed",
        summary.scanned, summary.written, summary.skipped, summary.failed
    );
    Ok(())
}

async fn lookup(settings: &Settings, term: &str) -> Result<()> {
    let pipeline = FetchPipeline::from_settings(settings)?;
    match pipeline.resolve(term).await? {
        Some(id) => {
            println!("{}", id);
            Ok(())
        }
        None => anyhow::bail!("No matching entries found for '{}'", term),
    }
}

fn report(asset: &VideoAsset) {
    match asset.outcome {
        DownloadOutcome::Downloaded { bytes } => println!(
            "Downloaded video for ID {} ({} bytes) to {}",
            asset.nzsl_id,
            bytes,
            asset.local_path.display()
        ),
        DownloadOutcome::Skipped => println!(
            "Video for ID {} already present at {}",
            asset.nzsl_id,
            asset.local_path.display()
        ),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
