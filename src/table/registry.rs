//! Single source of truth mapping processed table names to their configs.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::{CrosswalkError, TableConfig};

/// Errors raised by the table registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A table was registered twice under the same processed name.
    #[error("table already registered: {name}")]
    Duplicate {
        /// The repeated processed table name.
        name: String,
    },

    /// A lookup named a table that was never registered.
    #[error("unknown table: {name}")]
    Unknown {
        /// The processed table name that failed to resolve.
        name: String,
    },

    /// A catalog entry declared an invalid crosswalk.
    #[error("invalid crosswalk for table {name}: {source}")]
    InvalidCrosswalk {
        /// The processed table name being declared.
        name: String,
        /// The underlying crosswalk error.
        #[source]
        source: CrosswalkError,
    },
}

impl RegistryError {
    /// Creates a duplicate-registration error.
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::Duplicate { name: name.into() }
    }

    /// Creates an unknown-table error.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::Unknown { name: name.into() }
    }
}

/// In-memory registry of [`TableConfig`]s keyed by processed table name.
///
/// Populated exactly once at startup via explicit [`register`] calls; the
/// built-in catalog lives in [`TableRegistry::builtin`]. No I/O.
///
/// [`register`]: TableRegistry::register
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<String, Arc<TableConfig>>,
}

impl TableRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry populated with the built-in table catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] if the catalog declares a duplicate table
    /// or an invalid crosswalk. Either is a defect in the catalog itself and
    /// surfaces at load time.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        super::catalog::register_all(&mut registry)?;
        Ok(registry)
    }

    /// Registers a table config under its processed name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is already taken.
    pub fn register(&mut self, config: TableConfig) -> Result<(), RegistryError> {
        let name = config.processed_table_name.clone();
        if self.tables.contains_key(&name) {
            return Err(RegistryError::duplicate(name));
        }
        debug!(table = %name, raw = %config.raw_table_name, "registering table");
        self.tables.insert(name, Arc::new(config));
        Ok(())
    }

    /// Resolves a processed table name to its config.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unknown`] if the name was never registered.
    pub fn resolve(&self, name: &str) -> Result<Arc<TableConfig>, RegistryError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::unknown(name))
    }

    /// Registered processed table names, sorted for stable listings.
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
