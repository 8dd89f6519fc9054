use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, DomainResult, PantryItemId};

/// Render a timestamp the way pantry documents store it
/// (`2024-01-01T00:00:00.000Z`).
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A pantry item as persisted in the document store.
///
/// `id` and `added_date` are fixed once the store has accepted the item; the
/// only way to change the other fields is through a [`PantryItemPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryItem {
    id: PantryItemId,
    name: String,
    category: String,
    quantity: u32,
    expiry_date: DateTime<Utc>,
    added_date: DateTime<Utc>,
    user_id: String,
}

impl PantryItem {
    /// Materialize a stored item from the id the store assigned and the
    /// fields it was created with.
    pub fn new(id: PantryItemId, item: NewPantryItem) -> Self {
        Self {
            id,
            name: item.name,
            category: item.category,
            quantity: item.quantity,
            expiry_date: item.expiry_date,
            added_date: item.added_date,
            user_id: item.user_id,
        }
    }

    pub fn id(&self) -> &PantryItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.expiry_date
    }

    pub fn added_date(&self) -> DateTime<Utc> {
        self.added_date
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Merge a patch into this item. Absent patch fields are left untouched.
    pub fn apply_patch(&mut self, patch: &PantryItemPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(expiry_date) = patch.expiry_date {
            self.expiry_date = expiry_date;
        }
        if let Some(user_id) = &patch.user_id {
            self.user_id = user_id.clone();
        }
    }

    /// Copy of this item with `patch` merged in.
    pub fn patched(&self, patch: &PantryItemPatch) -> Self {
        let mut next = self.clone();
        next.apply_patch(patch);
        next
    }
}

/// Input of the add flow: every field except the store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPantryItem {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub expiry_date: DateTime<Utc>,
    pub added_date: DateTime<Utc>,
    pub user_id: String,
}

impl NewPantryItem {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_not_blank("name", &self.name)?;
        ensure_not_blank("category", &self.category)?;
        ensure_not_blank("userId", &self.user_id)?;
        Ok(())
    }
}

/// Partial update with merge semantics.
///
/// Has no `added_date`: the added date is written once by the add flow and
/// never replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl PantryItemPatch {
    /// Patch touching the quantity and nothing else (the decrement path).
    pub fn quantity_only(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field_paths().is_empty()
    }

    /// Stored field names this patch writes, in document order.
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.name.is_some() {
            paths.push("name");
        }
        if self.category.is_some() {
            paths.push("category");
        }
        if self.quantity.is_some() {
            paths.push("quantity");
        }
        if self.expiry_date.is_some() {
            paths.push("expiryDate");
        }
        if self.user_id.is_some() {
            paths.push("userId");
        }
        paths
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::EmptyPatch);
        }
        if let Some(name) = &self.name {
            ensure_not_blank("name", name)?;
        }
        if let Some(category) = &self.category {
            ensure_not_blank("category", category)?;
        }
        if let Some(user_id) = &self.user_id {
            ensure_not_blank("userId", user_id)?;
        }
        Ok(())
    }
}

fn ensure_not_blank(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
