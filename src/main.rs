//! vodloader - download Twitch past broadcasts
//!
//! Resolves broadcast ids or URLs, downloads the selected quality and converts it with
//! ffmpeg into `<library>/<game>/<channel>/<title>_<start time>.mp4`.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vodloader::utils::{AppConfig, CONFIG_FILE_NAME};
use vodloader::{DownloadEngine, Session, TwitchExtractor};

#[derive(Parser)]
#[command(version, about, override_usage = "vodloader [BROADCAST ...]")]
struct Args {
    /// Broadcast ids or URLs, optionally quoted with a quality ("585041281 720p").
    /// Without arguments an interactive prompt is started.
    broadcasts: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for the session
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vodloader=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // One request at a time, so a single-threaded runtime is enough
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(args.broadcasts))
}

async fn run(broadcasts: Vec<String>) -> Result<()> {
    // Setup answers and interactive commands share one buffered reader
    let mut input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();

    let config_path = Path::new(CONFIG_FILE_NAME);
    let config = AppConfig::load_or_setup(config_path, &mut input, &mut out).await?;
    info!("Library at {}", config.download_folder.display());

    let extractor = TwitchExtractor::from_config(&config)?;
    let engine = DownloadEngine::from_config(&config)?;
    let session = Session::new(config, extractor, engine);

    if broadcasts.is_empty() {
        session.run_interactive(input, &mut out).await?;
        return Ok(());
    }

    let summary = session.run_batch(&broadcasts, &mut out).await?;
    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} broadcasts failed: {}",
            summary.failed.len(),
            broadcasts.len(),
            summary.failed.join(", ")
        );
    }
    Ok(())
}
