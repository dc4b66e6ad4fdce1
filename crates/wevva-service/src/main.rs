//! wevva - periodic temperature collector.
//!
//! Run with: `cargo run -p wevva-service`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::{info, warn};

use wevva_service::{Collector, CommandSource, Config, inspect};
use wevva_store::Store;

/// wevva - collect outdoor temperatures into a local time-series store.
#[derive(Parser, Debug)]
#[command(name = "wevva")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Store path (overrides config).
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect on a schedule until interrupted (default behavior).
    Run {
        /// Seconds between refresh cycles (overrides config).
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Run a single refresh cycle and exit.
    Once,

    /// Print stored readings.
    View {
        /// Buckets to print (default: all).
        buckets: Vec<String>,
    },
}

/// How long a running cycle may take to finish after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wevva_service=info".parse()?)
                .add_directive("wevva_store=info".parse()?),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    if let Some(db_path) = args.database {
        config.storage.path = db_path;
    }

    let command = args.command.unwrap_or(Command::Run { interval: None });
    match command {
        Command::Run { interval } => {
            if let Some(secs) = interval {
                config.collector.interval_secs = secs;
            }
            config.validate()?;
            run(config).await
        }
        Command::Once => {
            config.validate()?;
            once(config).await
        }
        Command::View { buckets } => view(config, buckets).await,
    }
}

/// Open the store on the blocking pool; waiting for the file lock sleeps.
async fn open_store(config: &Config) -> anyhow::Result<Store> {
    let path = config.storage.path.clone();
    let lock_timeout = config.storage.lock_timeout();
    let opened = tokio::task::spawn_blocking({
        let path = path.clone();
        move || Store::open_with_timeout(&path, lock_timeout)
    })
    .await
    .context("Store open task failed")?;
    opened.with_context(|| format!("Failed to open store at {}", path.display()))
}

async fn run(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    if let Err(e) = inspect::log_summary(&store) {
        warn!("Failed to read stored data: {}", e);
    }

    let store = Arc::new(Mutex::new(store));
    let source = CommandSource::from_config(&config.source);
    let collector = Collector::new(Arc::clone(&store), source, config.collector.interval());
    let handle = collector.spawn();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown requested");
    handle.shutdown(SHUTDOWN_GRACE).await;

    store.lock().await.close();
    Ok(())
}

async fn once(config: Config) -> anyhow::Result<()> {
    let store = Arc::new(Mutex::new(open_store(&config).await?));
    let source = CommandSource::from_config(&config.source);
    let collector = Collector::new(Arc::clone(&store), source, config.collector.interval());

    let summary = collector.run_once().await.context("Refresh cycle failed")?;
    println!("{}", summary);

    store.lock().await.close();
    Ok(())
}

async fn view(config: Config, buckets: Vec<String>) -> anyhow::Result<()> {
    let mut store = open_store(&config).await?;
    let names = if buckets.is_empty() {
        inspect::all_bucket_names()
    } else {
        buckets
    };
    inspect::print_buckets(&store, &names)?;
    store.close();
    Ok(())
}
