use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use pantry_core::PantryItemId;
use pantry_inventory::{NewPantryItem, PantryItem, PantryItemPatch};

use super::r#trait::{PantryStore, StoreError, name_in_range};

/// In-memory pantry collection.
///
/// Intended for tests/dev. Ids are UUIDv7 strings; reads come back ordered by
/// name (then id), as the remote range query would return them.
#[derive(Debug, Default)]
pub struct InMemoryPantryStore {
    items: RwLock<HashMap<PantryItemId, PantryItem>>,
}

impl InMemoryPantryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records (ids kept as given).
    pub fn with_items(items: impl IntoIterator<Item = PantryItem>) -> Self {
        let map = items.into_iter().map(|i| (i.id().clone(), i)).collect();
        Self {
            items: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &PantryItemId) -> Option<PantryItem> {
        self.items.read().ok()?.get(id).cloned()
    }

    fn poisoned() -> StoreError {
        StoreError::Transport("lock poisoned".to_string())
    }
}

#[async_trait::async_trait]
impl PantryStore for InMemoryPantryStore {
    async fn create(&self, item: &NewPantryItem) -> Result<PantryItemId, StoreError> {
        let id: PantryItemId = Uuid::now_v7()
            .simple()
            .to_string()
            .parse()
            .map_err(|e| StoreError::Decode(format!("generated id rejected: {e}")))?;

        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        items.insert(id.clone(), PantryItem::new(id.clone(), item.clone()));
        Ok(id)
    }

    async fn delete(&self, id: &PantryItemId) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        items
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update(&self, id: &PantryItemId, patch: &PantryItemPatch) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        let item = items
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        item.apply_patch(patch);
        Ok(())
    }

    async fn fetch_all(&self, prefix: &str) -> Result<Vec<PantryItem>, StoreError> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        let mut out: Vec<PantryItem> = items
            .values()
            .filter(|i| name_in_range(i.name(), prefix))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn new_item(name: &str, quantity: u32) -> NewPantryItem {
        NewPantryItem {
            name: name.to_string(),
            category: "Pantry".to_string(),
            quantity,
            expiry_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            added_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            user_id: "dev".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_ids() {
        let store = InMemoryPantryStore::new();
        let a = store.create(&new_item("Rice", 1)).await.unwrap();
        let b = store.create(&new_item("Rice", 1)).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn update_merges_and_missing_ids_fail() {
        let store = InMemoryPantryStore::new();
        let id = store.create(&new_item("Oats", 3)).await.unwrap();

        store.update(&id, &PantryItemPatch::quantity_only(2)).await.unwrap();
        let item = store.get(&id).unwrap();
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.name(), "Oats");

        let missing: PantryItemId = "nope".parse().unwrap();
        let err = store.update(&missing, &PantryItemPatch::quantity_only(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let store = InMemoryPantryStore::new();
        let id = store.create(&new_item("Salt", 1)).await.unwrap();
        store.delete(&id).await.unwrap();
        assert!(store.is_empty());
        assert!(matches!(store.delete(&id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_all_applies_prefix_range_in_name_order() {
        let store = InMemoryPantryStore::new();
        for name in ["Milk", "Eggs", "Mint", "Apples"] {
            store.create(&new_item(name, 1)).await.unwrap();
        }

        let all = store.fetch_all("").await.unwrap();
        let names: Vec<_> = all.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Apples", "Eggs", "Milk", "Mint"]);

        let mi = store.fetch_all("Mi").await.unwrap();
        let names: Vec<_> = mi.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Milk", "Mint"]);
    }

    #[tokio::test]
    async fn empty_prefix_lists_names_beyond_the_range_sentinel() {
        let store = InMemoryPantryStore::new();
        for name in ["\u{1F34E} Apples", "\u{FF2D}ilk", "Milk"] {
            store.create(&new_item(name, 1)).await.unwrap();
        }

        let all = store.fetch_all("").await.unwrap();
        for name in ["\u{1F34E} Apples", "\u{FF2D}ilk", "Milk"] {
            assert_eq!(all.iter().filter(|i| i.name() == name).count(), 1, "{name}");
        }
        assert!(store.fetch_all("M").await.unwrap().iter().all(|i| i.name() == "Milk"));
    }
}
