//! "Remove one" policy: consume a single unit, delete the record at the last one.

use serde::{Deserialize, Serialize};

use pantry_core::PantryItemId;

use crate::item::{PantryItem, PantryItemPatch};

/// Store write decided by [`remove_one`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoveAction {
    /// Write `quantity` back to the item; every other field stays as is.
    Decrement { id: PantryItemId, quantity: u32 },
    /// Delete the item outright.
    Delete { id: PantryItemId },
}

/// Decide what consuming one unit of `item` means for the store.
pub fn remove_one(item: &PantryItem) -> RemoveAction {
    if item.quantity() > 1 {
        RemoveAction::Decrement {
            id: item.id().clone(),
            quantity: item.quantity() - 1,
        }
    } else {
        RemoveAction::Delete {
            id: item.id().clone(),
        }
    }
}

impl RemoveAction {
    pub fn id(&self) -> &PantryItemId {
        match self {
            RemoveAction::Decrement { id, .. } | RemoveAction::Delete { id } => id,
        }
    }

    /// Patch to send for a decrement (`None` for a delete).
    pub fn patch(&self) -> Option<PantryItemPatch> {
        match self {
            RemoveAction::Decrement { quantity, .. } => Some(PantryItemPatch::quantity_only(*quantity)),
            RemoveAction::Delete { .. } => None,
        }
    }

    /// State of `item` once the action has been written (`None` once deleted).
    pub fn apply_to(&self, item: &PantryItem) -> Option<PantryItem> {
        self.patch().map(|patch| item.patched(&patch))
    }

    /// Message shown to the user after the write succeeded.
    pub fn notice_text(&self) -> &'static str {
        match self {
            RemoveAction::Decrement { .. } => "Item quantity decremented by 1.",
            RemoveAction::Delete { .. } => "Item removed successfully!",
        }
    }
}
