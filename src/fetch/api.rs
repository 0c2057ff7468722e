//! Census API implementation of [`GeoFetcher`].
//!
//! One fetch builds the variable list from the table's crosswalk, requests
//! `https://api.census.gov/data/<year>/acs/<source>`, writes the raw JSON
//! payload untouched, then writes a processed CSV whose columns follow the
//! crosswalk: `name` first, the renamed fields in crosswalk order, then any
//! trailing geography id columns the API appends.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::geo::Geography;
use crate::table::TableConfig;

use super::{FetchError, FetchOutcome, GeoFetcher, OutputPaths};

/// Production Census API endpoint.
const CENSUS_API_BASE: &str = "https://api.census.gov/data";

/// Fetches one geography shape from the Census API.
pub struct ApiFetcher {
    geography: Geography,
    client: Client,
    api_key: String,
    source: String,
    base_url: String,
}

impl ApiFetcher {
    /// Creates a fetcher for `geography` against the production API.
    #[must_use]
    pub fn new(
        geography: Geography,
        client: Client,
        api_key: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            geography,
            client,
            api_key: api_key.into(),
            source: source.into(),
            base_url: CENSUS_API_BASE.to_owned(),
        }
    }

    /// Points the fetcher at a different API base. Used by tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the endpoint URL for one (year, table) request.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the base URL does not parse.
    fn endpoint(&self, year: u16, table: &TableConfig) -> Result<Url, FetchError> {
        let raw = format!("{}/{}/acs/{}", self.base_url, year, self.source);
        let mut url = Url::parse(&raw).map_err(|_| FetchError::invalid_url(&raw))?;

        let mut variables = vec!["NAME".to_owned()];
        variables.extend(
            table
                .crosswalk
                .iter()
                .map(|(code, _)| format!("{}_{}", table.raw_table_name, code)),
        );
        url.query_pairs_mut()
            .append_pair("get", &variables.join(","))
            .append_pair("for", &format!("{}:*", self.geography.api_name()))
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Filename stem shared by the raw and processed artifacts.
    fn artifact_stem(&self, year: u16, table: &TableConfig) -> String {
        format!(
            "{}_{}_{}_{}",
            self.source,
            year,
            table.processed_table_name,
            self.geography.as_str()
        )
    }

    /// Rewrites the raw row-of-rows payload into the processed CSV.
    fn write_processed(
        table: &TableConfig,
        url: &Url,
        body: &str,
        processed_path: &Path,
    ) -> Result<(), FetchError> {
        let rows: Vec<Vec<Option<String>>> = serde_json::from_str(body)
            .map_err(|e| FetchError::malformed(url.as_str(), e.to_string()))?;
        let Some((header, data)) = rows.split_first() else {
            return Err(FetchError::malformed(url.as_str(), "empty response table"));
        };
        let header: Vec<&str> = header
            .iter()
            .map(|cell| cell.as_deref().unwrap_or_default())
            .collect();

        // Column plan: `name`, crosswalk fields in declared order, then the
        // geography id columns the API appends, in API order.
        let mut indices: Vec<usize> = Vec::new();
        let mut out_header: Vec<String> = Vec::new();

        let name_idx = header
            .iter()
            .position(|h| *h == "NAME")
            .ok_or_else(|| FetchError::malformed(url.as_str(), "missing NAME column"))?;
        indices.push(name_idx);
        out_header.push("name".to_owned());

        for (code, field_name) in table.crosswalk.iter() {
            let variable = format!("{}_{}", table.raw_table_name, code);
            let idx = header.iter().position(|h| *h == variable).ok_or_else(|| {
                FetchError::malformed(url.as_str(), format!("missing column {variable}"))
            })?;
            indices.push(idx);
            out_header.push(field_name.to_owned());
        }

        for (idx, column) in header.iter().enumerate() {
            if !indices.contains(&idx) {
                indices.push(idx);
                out_header.push((*column).to_owned());
            }
        }

        let mut writer = csv::Writer::from_path(processed_path)
            .map_err(|e| FetchError::io(processed_path, std::io::Error::other(e)))?;
        writer
            .write_record(&out_header)
            .map_err(|e| FetchError::io(processed_path, std::io::Error::other(e)))?;
        for row in data {
            let record: Vec<&str> = indices
                .iter()
                .map(|&idx| row.get(idx).and_then(Option::as_deref).unwrap_or_default())
                .collect();
            writer
                .write_record(&record)
                .map_err(|e| FetchError::io(processed_path, std::io::Error::other(e)))?;
        }
        writer
            .flush()
            .map_err(|e| FetchError::io(processed_path, e))?;
        Ok(())
    }
}

#[async_trait]
impl GeoFetcher for ApiFetcher {
    fn geography(&self) -> Geography {
        self.geography
    }

    async fn fetch(
        &self,
        year: u16,
        table: &TableConfig,
        paths: &OutputPaths,
        force: bool,
    ) -> Result<FetchOutcome, FetchError> {
        let stem = self.artifact_stem(year, table);
        let raw_path: PathBuf = paths.raw_dir.join(format!("{stem}.json"));
        let processed_path: PathBuf = paths.processed_dir.join(format!("{stem}.csv"));

        if !force && raw_path.exists() && processed_path.exists() {
            debug!(artifact = %stem, "artifacts exist, skipping fetch");
            return Ok(FetchOutcome {
                raw_path,
                processed_path,
                skipped: true,
            });
        }

        let url = self.endpoint(year, table)?;
        debug!(
            geography = %self.geography,
            table = %table.processed_table_name,
            year,
            "requesting Census API"
        );

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url.as_str(), status.as_u16()));
        }
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;

        tokio::fs::write(&raw_path, &body)
            .await
            .map_err(|e| FetchError::io(&raw_path, e))?;

        Self::write_processed(table, &url, &body, &processed_path)?;

        info!(
            raw = %raw_path.display(),
            processed = %processed_path.display(),
            "wrote artifacts"
        );
        Ok(FetchOutcome {
            raw_path,
            processed_path,
            skipped: false,
        })
    }
}
