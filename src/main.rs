//! CLI entry point for the manual downloader.

use anyhow::{Context, Result};
use clap::Parser;
use manual_downloader::{Mode, Pipeline};
use tracing::{debug, info, warn};

mod app_config;
mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let config = app_config::build_pipeline_config(file_config, &args)?;

    let mode = if args.static_pages {
        Mode::Static
    } else {
        Mode::Dynamic
    };
    info!(%mode, output_dir = %config.output_dir.display(), "Manual downloader starting");

    let pipeline = Pipeline::from_config(config).context("failed to initialize pipeline")?;
    let summary = pipeline.run(mode).await?;

    if summary.has_failures() {
        warn!(
            failed = summary.failed,
            unresolved = summary.unresolved,
            "some documents were not saved; rerun to retry them"
        );
    }

    Ok(())
}
