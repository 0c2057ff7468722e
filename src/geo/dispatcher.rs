//! Per-geography download orchestration.
//!
//! The [`Dispatcher`] holds the run configuration, the table registry, and
//! an explicit map from [`Geography`] to its fetch routine. Dispatch is an
//! ordinary map lookup validated against the declared geography list, not
//! reflection: a geography without a registered routine is a configuration
//! error surfaced before anything is downloaded.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, DownloaderConfig};
use crate::fetch::{ApiFetcher, FetchError, FetchOutcome, GeoFetcher};
use crate::table::{RegistryError, TableRegistry};

use super::Geography;

/// Errors surfaced while dispatching downloads.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Invalid run configuration, including a geography with no routine.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The requested table is not in the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A fetch failed. Propagated unchanged; the run stops.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Drives the fetch of one or more geography datasets across the configured
/// years.
pub struct Dispatcher {
    config: DownloaderConfig,
    registry: TableRegistry,
    fetchers: HashMap<Geography, Arc<dyn GeoFetcher>>,
    geography_list: Vec<Geography>,
}

impl Dispatcher {
    /// Creates a dispatcher with no fetch routines registered. The declared
    /// geography list defaults to [`Geography::ALL`].
    #[must_use]
    pub fn new(config: DownloaderConfig, registry: TableRegistry) -> Self {
        Self {
            config,
            registry,
            fetchers: HashMap::new(),
            geography_list: Geography::ALL.to_vec(),
        }
    }

    /// Overrides the declared geography list. Some data sources only serve a
    /// subset of geographies; `download_everything` iterates exactly this
    /// list, in the given order.
    #[must_use]
    pub fn with_geography_list(mut self, geographies: impl Into<Vec<Geography>>) -> Self {
        self.geography_list = geographies.into();
        self
    }

    /// Creates a dispatcher with an [`ApiFetcher`] registered for every
    /// supported geography. This is the production wiring.
    #[must_use]
    pub fn with_api_fetchers(
        config: DownloaderConfig,
        registry: TableRegistry,
        client: &Client,
    ) -> Self {
        let mut dispatcher = Self::new(config, registry);
        for geography in Geography::ALL {
            let fetcher = ApiFetcher::new(
                geography,
                client.clone(),
                dispatcher.config.api_key.clone(),
                dispatcher.config.source.clone(),
            );
            dispatcher.register_fetcher(Arc::new(fetcher));
        }
        dispatcher
    }

    /// Registers (or replaces) the fetch routine for its geography.
    pub fn register_fetcher(&mut self, fetcher: Arc<dyn GeoFetcher>) {
        self.fetchers.insert(fetcher.geography(), fetcher);
    }

    /// The run configuration this dispatcher drives.
    #[must_use]
    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// The table registry this dispatcher consults.
    #[must_use]
    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Downloads one table at one geography, once per configured year.
    ///
    /// Years run in configured order; each produces a raw and a processed
    /// artifact (or a skip, when the artifacts exist and `force` is off).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the geography has no routine, the table
    /// is unknown, or a fetch fails. A fetch error aborts remaining years.
    pub async fn download(
        &self,
        geography: Geography,
        table_name: &str,
    ) -> Result<Vec<FetchOutcome>, DispatchError> {
        let table = self.registry.resolve(table_name)?;
        let fetcher = self
            .fetchers
            .get(&geography)
            .ok_or_else(|| ConfigError::unimplemented_geography(geography))?;

        let paths = self.config.output_paths();
        let mut outcomes = Vec::with_capacity(self.config.years_to_download.len());
        for &year in &self.config.years_to_download {
            info!(
                geography = %geography,
                table = table_name,
                year,
                "downloading"
            );
            let outcome = fetcher
                .fetch(year, &table, &paths, self.config.force)
                .await?;
            if outcome.skipped {
                info!(geography = %geography, year, "artifacts up to date, skipped");
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Downloads one table at every declared geography, in declared order.
    ///
    /// The fetcher map is validated against the declared geography list
    /// before any download starts, so a missing routine can never strand a
    /// partially finished run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnimplementedGeography`] (first missing
    /// geography in declared order) before any fetch, or the first fetch
    /// error encountered.
    pub async fn download_everything(
        &self,
        table_name: &str,
    ) -> Result<Vec<FetchOutcome>, DispatchError> {
        for &geography in &self.geography_list {
            if !self.fetchers.contains_key(&geography) {
                return Err(ConfigError::unimplemented_geography(geography).into());
            }
        }

        let mut outcomes = Vec::new();
        for &geography in &self.geography_list {
            outcomes.extend(self.download(geography, table_name).await?);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::YearSelection;
    use crate::fetch::OutputPaths;
    use crate::table::TableConfig;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every (geography, year) call instead of talking to the API.
    struct MockFetcher {
        mock_geography: Geography,
        calls: Arc<Mutex<Vec<(Geography, u16)>>>,
        fail: bool,
    }

    #[async_trait]
    impl GeoFetcher for MockFetcher {
        fn geography(&self) -> Geography {
            self.mock_geography
        }

        async fn fetch(
            &self,
            year: u16,
            table: &TableConfig,
            paths: &OutputPaths,
            _force: bool,
        ) -> Result<FetchOutcome, FetchError> {
            if self.fail {
                return Err(FetchError::http_status("https://mock", 500));
            }
            self.calls
                .lock()
                .unwrap()
                .push((self.mock_geography, year));
            let stem = format!("{}_{}", table.processed_table_name, year);
            Ok(FetchOutcome {
                raw_path: paths.raw_dir.join(format!("{stem}.json")),
                processed_path: paths.processed_dir.join(format!("{stem}.csv")),
                skipped: false,
            })
        }
    }

    fn test_config(years: YearSelection, dir: &std::path::Path) -> DownloaderConfig {
        DownloaderConfig::new(Some("testkey"), "acs5", years, Some(dir), false).unwrap()
    }

    fn dispatcher_with_mocks(
        years: YearSelection,
        dir: &std::path::Path,
        geographies: &[Geography],
    ) -> (Dispatcher, Arc<Mutex<Vec<(Geography, u16)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new(
            test_config(years, dir),
            TableRegistry::builtin().unwrap(),
        );
        for &geography in geographies {
            dispatcher.register_fetcher(Arc::new(MockFetcher {
                mock_geography: geography,
                calls: Arc::clone(&calls),
                fail: false,
            }));
        }
        (dispatcher, calls)
    }

    #[tokio::test]
    async fn test_download_iterates_configured_years_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let (dispatcher, calls) = dispatcher_with_mocks(
            YearSelection::List(vec![2015, 2011]),
            tmp.path(),
            &[Geography::States],
        );

        let outcomes = dispatcher
            .download(Geography::States, "mobility")
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![(Geography::States, 2015), (Geography::States, 2011)]
        );
    }

    #[tokio::test]
    async fn test_download_unknown_table_fails_before_fetching() {
        let tmp = tempfile::tempdir().unwrap();
        let (dispatcher, calls) = dispatcher_with_mocks(
            YearSelection::Latest,
            tmp.path(),
            &[Geography::States],
        );

        let err = dispatcher
            .download(Geography::States, "nosuchtable")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Registry(_)));
        assert!(calls.lock().unwrap().is_empty(), "no fetch should run");
    }

    #[tokio::test]
    async fn test_download_unregistered_geography_names_it() {
        let tmp = tempfile::tempdir().unwrap();
        let (dispatcher, _) =
            dispatcher_with_mocks(YearSelection::Latest, tmp.path(), &[Geography::States]);

        let err = dispatcher
            .download(Geography::Zctas, "mobility")
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("no fetch routine"), "got: {msg}");
        assert!(msg.contains("zctas"), "expected geography in: {msg}");
    }

    #[tokio::test]
    async fn test_download_everything_visits_all_geographies_in_declared_order() {
        let tmp = tempfile::tempdir().unwrap();
        let (dispatcher, calls) =
            dispatcher_with_mocks(YearSelection::Latest, tmp.path(), &Geography::ALL);

        let outcomes = dispatcher.download_everything("mobility").await.unwrap();
        assert_eq!(outcomes.len(), 14);
        let visited: Vec<Geography> =
            calls.lock().unwrap().iter().map(|(geo, _)| *geo).collect();
        assert_eq!(visited, Geography::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_download_everything_missing_routine_fails_before_any_fetch() {
        let tmp = tempfile::tempdir().unwrap();
        // Everything registered except tracts, which is last in declared
        // order; pre-validation must still fire before any download.
        let all_but_tracts: Vec<Geography> = Geography::ALL
            .into_iter()
            .filter(|geo| *geo != Geography::Tracts)
            .collect();
        let (dispatcher, calls) =
            dispatcher_with_mocks(YearSelection::Latest, tmp.path(), &all_but_tracts);

        let err = dispatcher.download_everything("mobility").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("tracts"), "expected geography in: {msg}");
        assert!(
            calls.lock().unwrap().is_empty(),
            "no geography may download when the declared list is incomplete"
        );
    }

    #[tokio::test]
    async fn test_overridden_geography_list_limits_full_run() {
        let tmp = tempfile::tempdir().unwrap();
        // A source that only tabulates states and counties.
        let (dispatcher, calls) = dispatcher_with_mocks(
            YearSelection::Latest,
            tmp.path(),
            &[Geography::States, Geography::Counties],
        );
        let dispatcher =
            dispatcher.with_geography_list(vec![Geography::States, Geography::Counties]);

        let outcomes = dispatcher.download_everything("population").await.unwrap();
        assert_eq!(outcomes.len(), 2);
        let visited: Vec<Geography> =
            calls.lock().unwrap().iter().map(|(geo, _)| *geo).collect();
        assert_eq!(visited, vec![Geography::States, Geography::Counties]);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_and_aborts_run() {
        let tmp = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new(
            test_config(YearSelection::List(vec![2017, 2016]), tmp.path()),
            TableRegistry::builtin().unwrap(),
        );
        dispatcher.register_fetcher(Arc::new(MockFetcher {
            mock_geography: Geography::States,
            calls: Arc::clone(&calls),
            fail: true,
        }));

        let err = dispatcher
            .download(Geography::States, "mobility")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Fetch(_)));
        assert!(err.to_string().contains("500"));
        assert!(calls.lock().unwrap().is_empty());
    }
}
