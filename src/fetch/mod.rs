//! The fetch seam between the dispatcher and the Census API.
//!
//! The dispatcher never talks HTTP itself; it calls a [`GeoFetcher`] once
//! per (geography, year) pair. [`ApiFetcher`] is the concrete implementation
//! over the Census API; tests substitute their own.
//!
//! A fetcher owns its retry/backoff policy. The only contract the dispatcher
//! relies on is: one call produces a raw artifact plus a processed artifact
//! with crosswalk-renamed columns, and a call with `force = false` skips
//! work when both artifacts already exist.

mod api;
mod error;

pub use api::ApiFetcher;
pub use error::FetchError;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::geo::Geography;
use crate::table::TableConfig;

/// Output directories a fetcher writes into.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    /// Directory for raw API payloads.
    pub raw_dir: PathBuf,
    /// Directory for crosswalk-renamed output.
    pub processed_dir: PathBuf,
}

/// Result of one (geography, year) fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Where the raw payload landed.
    pub raw_path: PathBuf,
    /// Where the processed table landed.
    pub processed_path: PathBuf,
    /// True if existing artifacts were kept instead of refetched.
    pub skipped: bool,
}

/// A download routine for one geography shape.
#[async_trait]
pub trait GeoFetcher: Send + Sync {
    /// The geography this routine downloads.
    fn geography(&self) -> Geography;

    /// Fetches one year of one table, writing raw and processed artifacts.
    ///
    /// Must be idempotent when `force` is false: if both artifacts already
    /// exist the fetcher returns them with `skipped = true` and performs no
    /// network work.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on any API or filesystem failure. The
    /// dispatcher propagates it unchanged and aborts the run.
    async fn fetch(
        &self,
        year: u16,
        table: &TableConfig,
        paths: &OutputPaths,
        force: bool,
    ) -> Result<FetchOutcome, FetchError>;
}
