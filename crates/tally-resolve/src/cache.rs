//! Shared dimension snapshot.

use crate::error::Result;
use std::sync::{Arc, PoisonError, RwLock};
use tally_store::{Dimensions, FactStore};
use tracing::info;

/// Read-mostly cache of every reference dimension.
///
/// Readers take an [`Arc`] to a complete snapshot. A reload builds the new
/// snapshot first and then swaps the pointer, so a reader never observes a
/// half-loaded state.
#[derive(Debug, Default)]
pub struct DimensionCache {
    snapshot: RwLock<Arc<Dimensions>>,
}

impl DimensionCache {
    /// Wrap an existing snapshot.
    pub fn new(dims: Dimensions) -> Self {
        Self { snapshot: RwLock::new(Arc::new(dims)) }
    }

    /// Load a snapshot from the store.
    pub fn load<S: FactStore + ?Sized>(store: &S) -> Result<Self> {
        let dims = store.load_dimensions()?;
        Ok(Self::new(dims))
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Dimensions> {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Replace the snapshot.
    pub fn replace(&self, dims: Dimensions) {
        let fresh = Arc::new(dims);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = fresh;
    }

    /// Reload every dimension from the store and swap it in. On error the
    /// previous snapshot stays in place.
    pub fn reload<S: FactStore + ?Sized>(&self, store: &S) -> Result<()> {
        let dims = store.load_dimensions()?;
        info!(companies = dims.companies.len(), "dimension cache reloaded");
        self.replace(dims);
        Ok(())
    }
}
