//! Pantry inventory domain module.
//!
//! This crate contains the rules for pantry items, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): the item record
//! and its patches, the filter/sort view shown to users, and the
//! decrement-or-delete policy behind "remove one".

pub mod item;
pub mod policy;
pub mod query;

pub use item::{NewPantryItem, PantryItem, PantryItemPatch, format_timestamp};
pub use policy::{RemoveAction, remove_one};
pub use query::{
    MatchedField, SecondaryLabel, SortKey, capitalize, match_field, matches, secondary_label,
    sort_items, view,
};
