//! # Registry Configuration
//!
//! Sizing knobs for a [`Registry`](crate::Registry), loaded once at startup
//! from TOML:
//!
//! ```toml
//! max_entities = 100000
//! initial_sparse_capacity = 4096
//! store_capacity_hint = 256
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use std::path::Path;

use serde::Deserialize;

use crate::error::{RegistryError, RegistryResult};

/// Default exclusive upper bound on entity ids.
pub const DEFAULT_MAX_ENTITIES: u32 = 1_000_000;

/// Default number of sparse slots reserved by a new store.
pub const DEFAULT_SPARSE_CAPACITY: usize = 1024;

/// Default number of dense slots reserved by a new store.
pub const DEFAULT_STORE_CAPACITY: usize = 64;

/// Configuration for a registry and the stores it creates.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Exclusive upper bound on entity ids a store accepts. Storable ids are
    /// `1..max_entities`; allocation is not limited by it.
    pub max_entities: u32,
    /// Sparse table slots reserved when a store is created.
    pub initial_sparse_capacity: usize,
    /// Dense slots reserved when a store is created.
    pub store_capacity_hint: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            initial_sparse_capacity: DEFAULT_SPARSE_CAPACITY,
            store_capacity_hint: DEFAULT_STORE_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a configuration from TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] on malformed TOML, unknown
    /// keys, or values rejected by [`RegistryConfig::validate`].
    pub fn from_toml_str(source: &str) -> RegistryResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| RegistryError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if the file cannot be read or
    /// its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            RegistryError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks that the values describe a usable registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if `max_entities` leaves no
    /// room for a single non-null entity.
    pub fn validate(&self) -> RegistryResult<()> {
        if self.max_entities < 2 {
            return Err(RegistryError::InvalidConfig(format!(
                "max_entities must be at least 2, got {}",
                self.max_entities
            )));
        }
        Ok(())
    }

    /// Sparse capacity clamped to the id space.
    #[must_use]
    pub(crate) fn effective_sparse_capacity(&self) -> usize {
        let bound = self.max_entities as usize;
        if self.initial_sparse_capacity > bound {
            tracing::warn!(
                initial_sparse_capacity = self.initial_sparse_capacity,
                max_entities = self.max_entities,
                "initial_sparse_capacity exceeds max_entities, clamping"
            );
            bound
        } else {
            self.initial_sparse_capacity
        }
    }
}
