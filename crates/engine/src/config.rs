//! Store configuration.
//!
//! Loaded from TOML. Every field is optional:
//!
//! ```toml
//! initial_capacity = 100000
//! shard_amount = 64
//! reference_time = 1503695452
//! ```

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use visitdb_core::{Error, Result, Timestamp};

use crate::clock::{Clock, FixedClock, SystemClock};

/// Configuration for a [`Database`](crate::Database).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Entities to pre-allocate in each store.
    pub initial_capacity: usize,
    /// Shard count for every table. Power of two, greater than 1.
    pub shard_amount: Option<usize>,
    /// Freeze "now" for age filters at this epoch second.
    pub reference_time: Option<Timestamp>,
}

impl StoreConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(s).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Check field constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(shards) = self.shard_amount {
            if shards <= 1 || !shards.is_power_of_two() {
                return Err(Error::config(format!(
                    "shard_amount must be a power of two greater than 1, got {}",
                    shards
                )));
            }
        }
        if let Some(ts) = self.reference_time {
            if FixedClock::from_timestamp(ts).is_none() {
                return Err(Error::config(format!("reference_time {} is out of range", ts)));
            }
        }
        Ok(())
    }

    pub(crate) fn clock(&self) -> Arc<dyn Clock> {
        match self.reference_time.and_then(FixedClock::from_timestamp) {
            Some(fixed) => Arc::new(fixed),
            None => Arc::new(SystemClock),
        }
    }
}
