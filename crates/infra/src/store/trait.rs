use std::sync::Arc;

use thiserror::Error;

use pantry_core::PantryItemId;
use pantry_inventory::{NewPantryItem, PantryItem, PantryItemPatch};

/// Upper sentinel of the name-prefix range read (`name <= prefix + '\u{f8ff}'`).
pub const NAME_RANGE_END: char = '\u{f8ff}';

/// Whether `name` falls in the range read for `prefix`.
///
/// Mirrors the remote query `name >= prefix AND name <= prefix + '\u{f8ff}'`.
/// An empty prefix is no filter at all: every name is in range.
pub fn name_in_range(name: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    let mut upper = String::with_capacity(prefix.len() + NAME_RANGE_END.len_utf8());
    upper.push_str(prefix);
    upper.push(NAME_RANGE_END);
    name >= prefix && name <= upper.as_str()
}

/// Document store operation error.
///
/// These are **infrastructure errors** (network, remote service, payload
/// shape) as opposed to domain errors (validation).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pantry item not found: {0}")]
    NotFound(PantryItemId),

    #[error("store rejected request ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode stored document: {0}")]
    Decode(String),
}

/// CRUD contract over the `pantryItems` collection.
///
/// Implementations must:
/// - assign a fresh, unique id on `create`
/// - merge only the fields present in a patch on `update`, failing with
///   `NotFound` when the record does not exist
/// - fail `delete` with `NotFound` when the record does not exist
/// - return every record whose name lies in the prefix range from `fetch_all`
///   (every record for an empty prefix)
#[async_trait::async_trait]
pub trait PantryStore: Send + Sync {
    /// Persist a new item and return the id the store assigned.
    async fn create(&self, item: &NewPantryItem) -> Result<PantryItemId, StoreError>;

    /// Remove a single item.
    async fn delete(&self, id: &PantryItemId) -> Result<(), StoreError>;

    /// Merge `patch` into an existing item.
    async fn update(&self, id: &PantryItemId, patch: &PantryItemPatch) -> Result<(), StoreError>;

    /// Read all items whose name starts the range at `prefix` (empty = all).
    async fn fetch_all(&self, prefix: &str) -> Result<Vec<PantryItem>, StoreError>;
}

#[async_trait::async_trait]
impl<S> PantryStore for Arc<S>
where
    S: PantryStore + ?Sized,
{
    async fn create(&self, item: &NewPantryItem) -> Result<PantryItemId, StoreError> {
        (**self).create(item).await
    }

    async fn delete(&self, id: &PantryItemId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn update(&self, id: &PantryItemId, patch: &PantryItemPatch) -> Result<(), StoreError> {
        (**self).update(id, patch).await
    }

    async fn fetch_all(&self, prefix: &str) -> Result<Vec<PantryItem>, StoreError> {
        (**self).fetch_all(prefix).await
    }
}
