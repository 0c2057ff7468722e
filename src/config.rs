//! Run configuration for a download session.
//!
//! A [`DownloaderConfig`] is built once per run from caller-supplied options,
//! validated eagerly, and read-only afterward. Validation failures are
//! configuration errors surfaced before any fetch begins.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::geo::Geography;

/// Environment variable consulted when no explicit API key is given.
pub const API_KEY_ENV_VAR: &str = "CENSUS_API_KEY";

/// Years the Census API serves for the ACS datasets we support, newest first.
pub const SUPPORTED_YEARS: [u16; 9] = [2017, 2016, 2015, 2014, 2013, 2012, 2011, 2010, 2009];

/// Default data directory, relative to the working directory.
const DEFAULT_DATA_DIR: &str = "data";

/// Errors raised while building or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key was passed and the environment variable is unset.
    #[error(
        "Census API key required: pass --api-key or set the {API_KEY_ENV_VAR} environment variable"
    )]
    MissingApiKey,

    /// A requested year falls outside the supported range.
    #[error("data is only available for the years 2009-2017, got {year}")]
    UnsupportedYear {
        /// The offending year.
        year: u16,
    },

    /// A geography in the declared list has no registered fetch routine.
    #[error("no fetch routine registered for geography: {geography}")]
    UnimplementedGeography {
        /// The geography that could not be dispatched.
        geography: Geography,
    },

    /// A data directory could not be created.
    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates an unsupported-year error.
    #[must_use]
    pub fn unsupported_year(year: u16) -> Self {
        Self::UnsupportedYear { year }
    }

    /// Creates an unimplemented-geography error.
    #[must_use]
    pub fn unimplemented_geography(geography: Geography) -> Self {
        Self::UnimplementedGeography { geography }
    }

    /// Creates a data-directory error.
    pub fn data_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DataDir {
            path: path.into(),
            source,
        }
    }
}

/// Which years a run should download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum YearSelection {
    /// Every supported year, newest first.
    All,
    /// A single year.
    Single(u16),
    /// An explicit list of years, downloaded in the given order.
    List(Vec<u16>),
    /// The most recent supported year (the default when nothing is given).
    #[default]
    Latest,
}

impl YearSelection {
    /// Resolves the selection to the concrete years to download.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedYear`] if any resolved year falls
    /// outside [`SUPPORTED_YEARS`].
    pub fn resolve(&self) -> Result<Vec<u16>, ConfigError> {
        let years = match self {
            Self::All => SUPPORTED_YEARS.to_vec(),
            Self::Single(year) => vec![*year],
            Self::List(years) => years.clone(),
            Self::Latest => vec![SUPPORTED_YEARS[0]],
        };
        for &year in &years {
            if !SUPPORTED_YEARS.contains(&year) {
                return Err(ConfigError::unsupported_year(year));
            }
        }
        Ok(years)
    }
}

/// Resolves the API key from an explicit argument or an environment value.
///
/// Pure so tests can exercise both paths without touching process env.
/// Empty strings count as absent.
///
/// # Errors
///
/// Returns [`ConfigError::MissingApiKey`] if neither source supplies a value.
pub fn resolve_api_key(
    explicit: Option<&str>,
    from_env: Option<String>,
) -> Result<String, ConfigError> {
    explicit
        .map(str::to_owned)
        .into_iter()
        .chain(from_env)
        .find(|key| !key.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey)
}

/// Validated, read-only configuration for one download run.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Census API key used on every request.
    pub api_key: String,
    /// ACS dataset variant, e.g. `acs5`. Passed through to the fetch routine
    /// unvalidated.
    pub source: String,
    /// Concrete years to download, already validated.
    pub years_to_download: Vec<u16>,
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Directory for raw API payloads: `<data_dir>/raw`.
    pub raw_dir: PathBuf,
    /// Directory for crosswalk-renamed output: `<data_dir>/processed`.
    pub processed_dir: PathBuf,
    /// When true, fetch routines overwrite existing artifacts instead of
    /// skipping them.
    pub force: bool,
}

impl DownloaderConfig {
    /// Builds and validates a run configuration.
    ///
    /// The API key comes from `api_key` or, failing that, the
    /// `CENSUS_API_KEY` environment variable. The data directory defaults to
    /// `./data`; the `raw/` and `processed/` subdirectories are created if
    /// absent (safe to call repeatedly).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the API key is missing, a year is
    /// unsupported, or a directory cannot be created.
    pub fn new(
        api_key: Option<&str>,
        source: &str,
        years: YearSelection,
        data_dir: Option<&Path>,
        force: bool,
    ) -> Result<Self, ConfigError> {
        let api_key = resolve_api_key(api_key, std::env::var(API_KEY_ENV_VAR).ok())?;
        let years_to_download = years.resolve()?;

        let data_dir = data_dir.map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), Path::to_path_buf);
        let raw_dir = data_dir.join("raw");
        let processed_dir = data_dir.join("processed");
        for dir in [&data_dir, &raw_dir, &processed_dir] {
            fs::create_dir_all(dir).map_err(|source| ConfigError::data_dir(dir, source))?;
        }

        Ok(Self {
            api_key,
            source: source.to_owned(),
            years_to_download,
            data_dir,
            raw_dir,
            processed_dir,
            force,
        })
    }

    /// Output directories handed to fetch routines.
    #[must_use]
    pub fn output_paths(&self) -> crate::fetch::OutputPaths {
        crate::fetch::OutputPaths {
            raw_dir: self.raw_dir.clone(),
            processed_dir: self.processed_dir.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_year_selection_all_resolves_every_supported_year() {
        let years = YearSelection::All.resolve().unwrap();
        assert_eq!(years, SUPPORTED_YEARS.to_vec());
        assert_eq!(years[0], 2017, "expected newest year first");
        assert_eq!(*years.last().unwrap(), 2009);
    }

    #[test]
    fn test_year_selection_single_resolves_to_that_year() {
        let years = YearSelection::Single(2012).resolve().unwrap();
        assert_eq!(years, vec![2012]);
    }

    #[test]
    fn test_year_selection_list_preserves_order() {
        let years = YearSelection::List(vec![2011, 2015, 2009]).resolve().unwrap();
        assert_eq!(years, vec![2011, 2015, 2009]);
    }

    #[test]
    fn test_year_selection_latest_is_default_and_resolves_to_2017() {
        assert_eq!(YearSelection::default(), YearSelection::Latest);
        let years = YearSelection::Latest.resolve().unwrap();
        assert_eq!(years, vec![2017]);
    }

    #[test]
    fn test_year_selection_rejects_year_before_range() {
        let err = YearSelection::Single(2008).resolve().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("2009-2017"), "expected range in: {msg}");
        assert!(msg.contains("2008"), "expected bad year in: {msg}");
    }

    #[test]
    fn test_year_selection_rejects_year_after_range_in_list() {
        let err = YearSelection::List(vec![2017, 2018]).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedYear { year: 2018 }));
    }

    #[test]
    fn test_resolve_api_key_prefers_explicit_argument() {
        let key = resolve_api_key(Some("abc123"), Some("env456".to_owned())).unwrap();
        assert_eq!(key, "abc123");
    }

    #[test]
    fn test_resolve_api_key_falls_back_to_env() {
        let key = resolve_api_key(None, Some("env456".to_owned())).unwrap();
        assert_eq!(key, "env456");
    }

    #[test]
    fn test_resolve_api_key_missing_both_fails() {
        let err = resolve_api_key(None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert!(
            err.to_string().contains("CENSUS_API_KEY"),
            "message should name the env var: {err}"
        );
    }

    #[test]
    fn test_resolve_api_key_ignores_empty_strings() {
        let err = resolve_api_key(Some(""), Some(String::new())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn test_config_creates_directories_and_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("data");

        let first = DownloaderConfig::new(
            Some("key"),
            "acs5",
            YearSelection::Latest,
            Some(data_dir.as_path()),
            false,
        )
        .unwrap();
        assert!(first.raw_dir.is_dir());
        assert!(first.processed_dir.is_dir());

        // Second construction against the same directory must not fail.
        let second = DownloaderConfig::new(
            Some("key"),
            "acs5",
            YearSelection::Latest,
            Some(data_dir.as_path()),
            true,
        )
        .unwrap();
        assert!(second.force);
        assert_eq!(second.raw_dir, data_dir.join("raw"));
        assert_eq!(second.processed_dir, data_dir.join("processed"));
    }

    #[test]
    fn test_config_rejects_unsupported_year_before_touching_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("untouched");
        let err = DownloaderConfig::new(
            Some("key"),
            "acs5",
            YearSelection::Single(1999),
            Some(data_dir.as_path()),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedYear { year: 1999 }));
        assert!(!data_dir.exists(), "bad config must not create directories");
    }
}
