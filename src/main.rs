//! kb-mirror main entry point
//!
//! This is the command-line interface for mirroring a knowledge base.

use anyhow::Context;
use clap::Parser;
use kb_mirror::config::{load_config_with_hash, validate, Config};
use kb_mirror::Coordinator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// kb-mirror: mirrors a knowledge base into a local Markdown tree
///
/// Discovers every article of the configured site, converts each one to
/// Markdown in a category directory, rehosts its images and writes an index.
#[derive(Parser, Debug)]
#[command(name = "kb-mirror")]
#[command(version = "1.0.0")]
#[command(about = "Mirror a knowledge base into Markdown", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only discover the site structure and save the site map
    #[arg(long, conflicts_with = "use_sitemap")]
    discover_only: bool,

    /// Reuse the saved site map instead of discovering again
    #[arg(long)]
    use_sitemap: bool,

    /// Skip downloading images
    #[arg(long)]
    no_images: bool,

    /// Number of articles scraped concurrently
    #[arg(long, value_name = "N")]
    concurrent: Option<u32>,

    /// Delay after each article in seconds
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Output directory for the Markdown tree
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;
    let coordinator = Coordinator::with_http(Arc::new(config))
        .context("failed to set up HTTP clients")?;

    if cli.discover_only {
        let site_map = coordinator.run_discovery().await?;
        info!(
            "Discovery complete! Found {} articles",
            site_map.articles.len()
        );
    } else {
        let outcome = coordinator.run_full(cli.use_sitemap).await?;
        info!("Successfully scraped: {} articles", outcome.scraped.len());
        info!("Failed: {} articles", outcome.failed.len());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kb_mirror=info,warn"),
            1 => EnvFilter::new("kb_mirror=debug,info"),
            _ => EnvFilter::new("kb_mirror=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(concurrent) = cli.concurrent {
        config.crawler.concurrency = concurrent;
    }
    if let Some(delay) = cli.delay {
        anyhow::ensure!(delay >= 0.0, "--delay must not be negative");
        config.crawler.request_delay_ms = (delay * 1000.0).round() as u64;
    }
    if cli.no_images {
        config.output.download_images = false;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.output_dir = dir.clone();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}
