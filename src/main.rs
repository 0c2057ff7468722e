//! CLI entry point for the census-downloader tool.

use anyhow::{Result, bail};
use clap::Parser;
use reqwest::Client;
use tracing::{debug, info};

use census_downloader::{Dispatcher, DownloaderConfig, TableRegistry, YearSelection};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
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

    let registry = TableRegistry::builtin()?;

    if args.list_tables {
        for name in registry.table_names() {
            let table = registry.resolve(name)?;
            println!(
                "{name}  raw={}  universe={}  docs={}",
                table.raw_table_name,
                table.universe,
                table.documentation_url()
            );
        }
        return Ok(());
    }

    let Some(table_name) = args.table.as_deref() else {
        bail!("no table given; pass a table name or --list-tables to see what is available");
    };

    let config = DownloaderConfig::new(
        args.api_key.as_deref(),
        &args.source,
        args.years.unwrap_or(YearSelection::Latest),
        args.data_dir.as_deref(),
        args.force,
    )?;
    info!(
        source = %config.source,
        years = ?config.years_to_download,
        data_dir = %config.data_dir.display(),
        "starting download run"
    );

    let client = Client::new();
    let dispatcher = Dispatcher::with_api_fetchers(config, registry, &client);

    let outcomes = match args.geography {
        Some(geography) => dispatcher.download(geography, table_name).await?,
        None => dispatcher.download_everything(table_name).await?,
    };

    let skipped = outcomes.iter().filter(|o| o.skipped).count();
    info!(
        fetched = outcomes.len() - skipped,
        skipped,
        "download run complete"
    );
    Ok(())
}
