//! Declarative ACS table configuration.
//!
//! A [`TableConfig`] binds a short processed table name (e.g. `mobility`) to
//! the raw Census table identifier it is fetched from (e.g. `B07003`) and a
//! [`Crosswalk`] mapping raw column codes to semantic field names. Configs
//! are built once at startup, registered in a [`TableRegistry`], and never
//! mutated.
//!
//! Specialized tables (the race iterations of a table, for instance) are
//! derived from a base config with [`TableConfig::derive`], inheriting the
//! crosswalk by value instead of duplicating it.

mod catalog;
mod registry;

pub use registry::{RegistryError, TableRegistry};

use thiserror::Error;

/// Error raised while building a crosswalk.
#[derive(Debug, Error)]
pub enum CrosswalkError {
    /// The same raw column code appeared twice.
    #[error("duplicate raw field code in crosswalk: {code}")]
    DuplicateCode {
        /// The repeated code.
        code: String,
    },
}

/// Ordered mapping from raw API column codes (e.g. `001E`) to semantic field
/// names (e.g. `same_house`).
///
/// Order is significant: it is the output column order of the processed
/// artifact. Codes are unique; the downstream rename is a direct key
/// substitution, never a computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crosswalk {
    entries: Vec<(String, String)>,
}

impl Crosswalk {
    /// Builds a crosswalk from `(raw_code, field_name)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::DuplicateCode`] if a raw code repeats.
    pub fn new<I, S>(pairs: I) -> Result<Self, CrosswalkError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (code, name) in pairs {
            let code = code.into();
            if entries.iter().any(|(existing, _)| *existing == code) {
                return Err(CrosswalkError::DuplicateCode { code });
            }
            entries.push((code, name.into()));
        }
        Ok(Self { entries })
    }

    /// Looks up the semantic name for a raw column code.
    #[must_use]
    pub fn rename(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == code)
            .map(|(_, name)| name.as_str())
    }

    /// Iterates `(raw_code, field_name)` pairs in output column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(code, name)| (code.as_str(), name.as_str()))
    }

    /// Number of mapped columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no columns are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable declarative configuration for one processed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Unique short name of the processed table, the registry key.
    pub processed_table_name: String,
    /// Census API table identifier, e.g. `B07003`.
    pub raw_table_name: String,
    /// The population subset the table describes. Informational only.
    pub universe: String,
    /// Raw-code to field-name mapping applied to fetched data.
    pub crosswalk: Crosswalk,
}

impl TableConfig {
    /// Starts a builder for a new table config.
    #[must_use]
    pub fn builder(
        processed_table_name: impl Into<String>,
        raw_table_name: impl Into<String>,
    ) -> TableConfigBuilder {
        TableConfigBuilder {
            processed_table_name: processed_table_name.into(),
            raw_table_name: raw_table_name.into(),
            universe: String::new(),
            crosswalk: None,
        }
    }

    /// Starts a builder seeded from `base`, inheriting its universe and
    /// crosswalk unless overridden.
    ///
    /// This replaces subclass-style reuse: a derived table usually changes
    /// only the name and raw table id.
    #[must_use]
    pub fn derive(base: &TableConfig) -> TableConfigBuilder {
        TableConfigBuilder {
            processed_table_name: base.processed_table_name.clone(),
            raw_table_name: base.raw_table_name.clone(),
            universe: base.universe.clone(),
            crosswalk: Some(base.crosswalk.clone()),
        }
    }

    /// URL of the Census Reporter page documenting the raw table.
    ///
    /// Human reference only; nothing downstream depends on it.
    #[must_use]
    pub fn documentation_url(&self) -> String {
        format!("https://censusreporter.org/tables/{}/", self.raw_table_name)
    }
}

/// Builder for [`TableConfig`], used for both fresh and derived configs.
#[derive(Debug, Clone)]
pub struct TableConfigBuilder {
    processed_table_name: String,
    raw_table_name: String,
    universe: String,
    crosswalk: Option<Crosswalk>,
}

impl TableConfigBuilder {
    /// Overrides the processed table name.
    #[must_use]
    pub fn processed_name(mut self, name: impl Into<String>) -> Self {
        self.processed_table_name = name.into();
        self
    }

    /// Overrides the raw Census table identifier.
    #[must_use]
    pub fn raw_table(mut self, name: impl Into<String>) -> Self {
        self.raw_table_name = name.into();
        self
    }

    /// Sets the universe description.
    #[must_use]
    pub fn universe(mut self, universe: impl Into<String>) -> Self {
        self.universe = universe.into();
        self
    }

    /// Sets the crosswalk from `(raw_code, field_name)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::DuplicateCode`] if a raw code repeats.
    pub fn crosswalk<I, S>(mut self, pairs: I) -> Result<Self, CrosswalkError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.crosswalk = Some(Crosswalk::new(pairs)?);
        Ok(self)
    }

    /// Finalizes the config. A builder without a crosswalk produces an empty
    /// one, which is valid for tables that only exist as derivation bases.
    #[must_use]
    pub fn build(self) -> TableConfig {
        TableConfig {
            processed_table_name: self.processed_table_name,
            raw_table_name: self.raw_table_name,
            universe: self.universe,
            crosswalk: self.crosswalk.unwrap_or(Crosswalk { entries: Vec::new() }),
        }
    }
}
