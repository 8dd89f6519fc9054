//! Document store boundary.
//!
//! The pantry collection is addressed by store-generated ids and supports
//! create, point delete, merge-style partial update, and a name-range read.
//! Nothing above this module depends on a particular wire protocol.

pub mod firestore;
pub mod in_memory;
pub mod r#trait;

pub use firestore::FirestoreStore;
pub use in_memory::InMemoryPantryStore;
pub use r#trait::{NAME_RANGE_END, PantryStore, StoreError, name_in_range};
