//! Census ACS Downloader Library
//!
//! This library downloads American Community Survey tables from the Census
//! Bureau API across configurable geographies and years, then normalizes raw
//! column codes (e.g. `001E`) into human-readable field names and writes
//! processed output alongside the raw payload.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Run configuration: API key, years, data directories
//! - [`table`] - Declarative table configs, crosswalks and the table registry
//! - [`geo`] - Supported geographies and the per-geography dispatch loop
//! - [`fetch`] - The fetch seam: `GeoFetcher` trait and the Census API client

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod fetch;
pub mod geo;
pub mod table;

// Re-export commonly used types
pub use config::{ConfigError, DownloaderConfig, YearSelection, SUPPORTED_YEARS};
pub use fetch::{ApiFetcher, FetchError, FetchOutcome, GeoFetcher, OutputPaths};
pub use geo::{DispatchError, Dispatcher, Geography};
pub use table::{Crosswalk, RegistryError, TableConfig, TableRegistry};
