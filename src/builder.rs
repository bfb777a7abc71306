//! Store builder for flexible configuration
//!
//! This module provides a builder pattern for creating fact stores with
//! explicit backend and configuration choices.

use crate::error::Result;
use crate::store::FactStore;
use crate::types::{Config, IndexBackend};

/// Builder for [`FactStore`] construction.
///
/// ```rust
/// use factum::{FactStore, IndexBackend};
///
/// let store = FactStore::builder()
///     .backend(IndexBackend::List)
///     .build()
///     .unwrap();
/// assert_eq!(store.config().backend, IndexBackend::List);
/// ```
#[derive(Debug, Default)]
pub struct StoreBuilder {
    config: Config,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Select the index backend for every relation in the store.
    pub fn backend(mut self, backend: IndexBackend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Suppress the warning emitted for zero-count changes.
    pub fn warn_on_zero_count(mut self, warn: bool) -> Self {
        self.config.warn_on_zero_count = warn;
        self
    }

    /// Validate the configuration and build the store.
    pub fn build(self) -> Result<FactStore> {
        FactStore::with_config(self.config)
    }
}
