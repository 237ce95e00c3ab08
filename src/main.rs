//! Track-Harvest main entry point
//!
//! This is the command-line interface for the Track-Harvest audio link harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use track_harvest::config::{load_config, validate_page_url, Config};
use track_harvest::output::{print_registry, print_report, ConsoleSink};
use track_harvest::Harvester;
use tracing_subscriber::EnvFilter;

/// Track-Harvest: an audio link harvester
///
/// Track-Harvest reads one page, pairs every track title with the audio link
/// that follows it, and can total the files' sizes or download them.
#[derive(Parser, Debug)]
#[command(name = "track-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Find, size and download the audio files linked from a page", long_about = None)]
struct Cli {
    /// Page to harvest (overrides the config file's page.url)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Total the size of all linked files without downloading them
    #[arg(long)]
    size: bool,

    /// Download all linked files
    #[arg(long)]
    download: bool,

    /// Directory to write downloaded files into
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let page_url = config
        .page
        .url
        .clone()
        .context("No page URL given: pass one as an argument or set page.url in the config")?;

    let harvester = Harvester::new(config)?;

    // Ctrl-C lets the item in flight finish, then stops the loop.
    let stop = harvester.stop_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the current item");
            stop.request_stop();
        }
    });

    let registry = match harvester.fetch_registry(&page_url).await {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("Failed to harvest {}: {}", page_url, e);
            return Err(e.into());
        }
    };

    if !cli.size && !cli.download {
        print_registry(&registry);
        return Ok(());
    }

    let mut sink = ConsoleSink;

    if cli.size {
        let total_gib = harvester.total_size_gib(&registry, &mut sink).await;
        println!("Total size of all files: {:.2} GiB", total_gib);
    }

    if cli.download {
        let report = harvester.download_all(&registry, &mut sink).await;
        print_report(&report);
    }

    Ok(())
}

/// Loads the config file, if any, and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        validate_page_url(url)?;
        config.page.url = Some(url.clone());
    }

    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }

    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("track_harvest=info,warn"),
            1 => EnvFilter::new("track_harvest=debug,info"),
            2 => EnvFilter::new("track_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
