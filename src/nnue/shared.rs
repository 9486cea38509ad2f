//! Weights shared between evaluating threads, replaceable at runtime.
//!
//! Readers take a snapshot (`Arc`) and evaluate against it without holding
//! the lock. A reload parses into a fresh store first and only swaps the
//! pointer on success, so no reader ever sees a half-filled store.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{LoadReport, WeightStore};
use crate::error::WeightError;

#[derive(Debug, Default)]
pub struct SharedWeights {
    current: RwLock<Arc<WeightStore>>,
    loaded: AtomicBool,
}

impl SharedWeights {
    /// Wrap an already loaded store.
    #[must_use]
    pub fn new(store: WeightStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
            loaded: AtomicBool::new(true),
        }
    }

    /// Load the initial store from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WeightError> {
        WeightStore::load(path).map(Self::new)
    }

    /// Current store. Cheap; the lock is released before returning.
    #[must_use]
    pub fn snapshot(&self) -> Arc<WeightStore> {
        Arc::clone(&*self.current.read())
    }

    /// Whether a store has been installed (by `new`, `load`, `reload` or `replace`).
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Replace the whole store.
    pub fn replace(&self, store: WeightStore) {
        let store = Arc::new(store);
        *self.current.write() = store;
        self.loaded.store(true, Ordering::Release);
    }

    /// Load a new store from `path` and swap it in.
    ///
    /// On error the previous store stays in place.
    pub fn reload<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport, WeightError> {
        let (store, report) = WeightStore::load_with_report(path)?;
        self.replace(store);
        Ok(report)
    }
}
