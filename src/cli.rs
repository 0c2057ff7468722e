//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use census_downloader::{Geography, YearSelection};

/// Download and process American Community Survey tables.
///
/// Fetches ACS tables from the Census Bureau API for one geography or all
/// fourteen, writing the raw payload and a processed file with
/// human-readable column names for every configured year.
#[derive(Parser, Debug)]
#[command(name = "census-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Processed table to download (see --list-tables)
    pub table: Option<String>,

    /// List the registered tables and their documentation URLs, then exit
    #[arg(long)]
    pub list_tables: bool,

    /// Census API key (falls back to the CENSUS_API_KEY environment variable)
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// ACS dataset variant to request
    #[arg(short, long, default_value = "acs5")]
    pub source: String,

    /// Years to download: "all", a single year, or a comma-separated list
    /// (default: the most recent supported year)
    #[arg(short, long, value_parser = parse_years)]
    pub years: Option<YearSelection>,

    /// Base data directory (raw/ and processed/ are created beneath it)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Restrict the run to a single geography (default: all geographies)
    #[arg(short, long)]
    pub geography: Option<Geography>,

    /// Overwrite existing artifacts instead of skipping them
    #[arg(short, long)]
    pub force: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Parses the `--years` value into a [`YearSelection`].
fn parse_years(value: &str) -> Result<YearSelection, String> {
    if value.eq_ignore_ascii_case("all") {
        return Ok(YearSelection::All);
    }
    let years = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<u16>()
                .map_err(|_| format!("invalid year: {part}"))
        })
        .collect::<Result<Vec<u16>, String>>()?;
    match years.as_slice() {
        [] => Err("no years given".to_owned()),
        [year] => Ok(YearSelection::Single(*year)),
        _ => Ok(YearSelection::List(years)),
    }
}
