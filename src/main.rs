use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use feria::app::{App, AppEvent};
use feria::config::Config;
use feria::feed::FeedSource;
use feria::storage::CacheMirror;
use feria::ui;

/// Feed read when neither `--source` nor the config names one.
const DEFAULT_SOURCE: &str = "public/data.json";

/// Get the config directory path (~/.config/feria/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("feria");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(
    name = "feria",
    version,
    about = "Terminal gallery for a static feed of event cards"
)]
struct Args {
    /// Feed to show: a JSON file path or an http(s) URL
    #[arg(long, value_name = "PATH|URL")]
    source: Option<String>,

    /// Config file (default: ~/.config/feria/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Delete the cached feed mirror before starting
    #[arg(long)]
    reset_cache: bool,

    /// Neither read nor write the cached feed mirror
    #[arg(long)]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // The TUI owns stdout, so logs go to stderr (e.g. RUST_LOG=feria=debug 2>feria.log)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        tracing::info!(path = %config_dir.display(), "Created config directory");
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let source_str = args
        .source
        .as_deref()
        .or(config.source.as_deref())
        .unwrap_or(DEFAULT_SOURCE);
    let source = FeedSource::parse(source_str)
        .with_context(|| format!("Invalid feed source '{}'", source_str))?;

    let mirror = if args.no_cache || !config.cache_enabled {
        CacheMirror::disabled()
    } else {
        CacheMirror::new(&config_dir)
    };

    // Applies to the file even when --no-cache disables the mirror
    if args.reset_cache {
        CacheMirror::new(&config_dir).clear();
        println!("Cache reset.");
    }

    tracing::info!(
        source = %source,
        cache = mirror.is_enabled(),
        "Starting feria"
    );

    let mut app = App::new(&config, source, mirror).context("Failed to create application")?;

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}
