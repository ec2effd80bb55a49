//! Name-keyed registry of shared striped indexes
//!
//! Call sites that must share one cursor (e.g. every iteration reading the
//! same data table) ask the registry for an index by name. The first request
//! for a name builds the index from the caller's striping source; every
//! later request, from any thread, gets the same `Arc`.
//!
//! The registry is an ordinary owned value. Keep one per run (or per test)
//! and drop it to tear everything down.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use segment::{ExecutionOptions, SharedIndexRegistry};
//!
//! let registry = SharedIndexRegistry::new();
//! let options = ExecutionOptions::default();
//!
//! let a = registry.get_or_create(&options, "users").unwrap();
//! let b = registry.get_or_create(&options, "users").unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//!
//! a.advance();
//! assert_eq!(b.position().scaled, 1);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::execution_segment::SegmentError;
use crate::options::StripingSource;
use crate::striped_index::StripedIndex;

/// Errors that can occur when requesting a shared index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("empty name provided to the shared striped index constructor")]
    EmptyName,

    #[error("cannot build shared striped index {name:?}: {source}")]
    Striping {
        name: String,
        #[source]
        source: SegmentError,
    },
}

/// Process- or run-scoped cache of `StripedIndex` instances, one per name
///
/// Instances are never replaced or removed once created.
#[derive(Debug, Default)]
pub struct SharedIndexRegistry {
    indexes: RwLock<HashMap<String, Arc<StripedIndex>>>,
}

impl SharedIndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the index registered under `name`, building it on first use
    ///
    /// `source` is only consulted when `name` has no index yet. Concurrent
    /// first requests for the same name build exactly one index.
    ///
    /// # Errors
    ///
    /// - `RegistryError::EmptyName` if `name` is empty
    /// - `RegistryError::Striping` if the index has to be built and `source`
    ///   cannot produce striping parameters; nothing is registered then
    pub fn get_or_create<S: StripingSource + ?Sized>(
        &self,
        source: &S,
        name: &str,
    ) -> Result<Arc<StripedIndex>, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        if let Some(index) = self.indexes.read().get(name) {
            return Ok(Arc::clone(index));
        }

        let mut indexes = self.indexes.write();
        // Another caller may have built it between the two locks.
        if let Some(index) = indexes.get(name) {
            return Ok(Arc::clone(index));
        }

        let striping = source.striping().map_err(|err| RegistryError::Striping {
            name: name.to_string(),
            source: err,
        })?;
        debug!(
            name,
            start = striping.start,
            cycle_length = striping.cycle_length,
            "created shared striped index"
        );
        let index = Arc::new(StripedIndex::from_striping(striping));
        indexes.insert(name.to_string(), Arc::clone(&index));
        Ok(index)
    }

    /// Returns the number of registered indexes
    pub fn len(&self) -> usize {
        self.indexes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.read().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indexes.read().contains_key(name)
    }
}
