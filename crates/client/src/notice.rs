use core::fmt;

use pantry_inventory::RemoveAction;

/// Confirmation shown to the user after a successful write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Notice {
    message: &'static str,
}

impl Notice {
    pub const ITEM_ADDED: Notice = Notice {
        message: "Item added successfully!",
    };
    pub const ITEM_UPDATED: Notice = Notice {
        message: "Item updated successfully!",
    };

    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl From<&RemoveAction> for Notice {
    fn from(action: &RemoveAction) -> Self {
        Notice {
            message: action.notice_text(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}
