//! Data access facade used by the client.
//!
//! The store client is constructed explicitly and injected; until that
//! happens every operation fails with [`DataAccessError::StoreUnavailable`].
//! Failures are never retried here and never partially applied; callers
//! decide how to report them.

use core::fmt;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use pantry_core::{DomainError, PantryItemId};
use pantry_inventory::{NewPantryItem, PantryItem, PantryItemPatch};

use crate::store::{PantryStore, StoreError};

#[derive(Debug, Error)]
pub enum DataAccessError {
    /// No store client has been connected yet. Retry once it is.
    #[error("pantry store is not initialized")]
    StoreUnavailable,

    #[error("pantry item not found: {0}")]
    NotFound(PantryItemId),

    /// Network or store-side failure.
    #[error("remote operation failed: {0}")]
    RemoteOperationFailed(#[source] StoreError),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

impl From<StoreError> for DataAccessError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => DataAccessError::NotFound(id),
            other => DataAccessError::RemoteOperationFailed(other),
        }
    }
}

/// Connection state of the store client.
#[derive(Clone, Default)]
pub enum StoreHandle {
    #[default]
    NotConnected,
    Connected(Arc<dyn PantryStore>),
}

impl StoreHandle {
    pub fn connected(store: impl PantryStore + 'static) -> Self {
        StoreHandle::Connected(Arc::new(store))
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, StoreHandle::Connected(_))
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreHandle::NotConnected => f.write_str("NotConnected"),
            StoreHandle::Connected(_) => f.write_str("Connected"),
        }
    }
}

/// Create/read/update/delete against the pantry collection.
///
/// Cheap to clone; clones share the same handle, so connecting one connects all.
#[derive(Debug, Clone, Default)]
pub struct PantryDataAccess {
    handle: Arc<RwLock<StoreHandle>>,
}

impl PantryDataAccess {
    pub fn new(handle: StoreHandle) -> Self {
        Self {
            handle: Arc::new(RwLock::new(handle)),
        }
    }

    /// Install a store client (or disconnect with `StoreHandle::NotConnected`).
    pub fn connect(&self, handle: StoreHandle) {
        if let Ok(mut guard) = self.handle.write() {
            *guard = handle;
        }
    }

    pub fn is_connected(&self) -> bool {
        self.handle.read().map(|h| h.is_connected()).unwrap_or(false)
    }

    fn store(&self) -> Result<Arc<dyn PantryStore>, DataAccessError> {
        let guard = self
            .handle
            .read()
            .map_err(|_| DataAccessError::StoreUnavailable)?;
        match &*guard {
            StoreHandle::Connected(store) => Ok(store.clone()),
            StoreHandle::NotConnected => Err(DataAccessError::StoreUnavailable),
        }
    }

    /// Persist a new item; returns the id assigned by the store.
    pub async fn create(&self, item: NewPantryItem) -> Result<PantryItemId, DataAccessError> {
        let store = self.store()?;
        item.validate()?;

        let id = store.create(&item).await?;
        tracing::info!(%id, name = %item.name, "pantry item created");
        Ok(id)
    }

    pub async fn delete(&self, id: &PantryItemId) -> Result<(), DataAccessError> {
        let store = self.store()?;
        store.delete(id).await?;
        tracing::info!(%id, "pantry item deleted");
        Ok(())
    }

    /// Merge `patch` into the stored item.
    pub async fn update(
        &self,
        id: &PantryItemId,
        patch: PantryItemPatch,
    ) -> Result<(), DataAccessError> {
        let store = self.store()?;
        patch.validate()?;

        store.update(id, &patch).await?;
        tracing::info!(%id, fields = ?patch.field_paths(), "pantry item updated");
        Ok(())
    }

    /// All items in the name range starting at `prefix`; filtering for
    /// display happens client-side.
    pub async fn fetch_all(&self, prefix: &str) -> Result<Vec<PantryItem>, DataAccessError> {
        let store = self.store()?;
        let items = store.fetch_all(prefix).await?;
        tracing::debug!(count = items.len(), "pantry items fetched");
        Ok(items)
    }
}
