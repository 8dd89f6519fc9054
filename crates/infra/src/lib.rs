//! Infrastructure layer: document store adapters, configuration, and the
//! data access facade the client talks to.

pub mod config;
pub mod data_access;
pub mod store;

pub use config::{ConfigError, StoreBackend, StoreConfig};
pub use data_access::{DataAccessError, PantryDataAccess, StoreHandle};
pub use store::{FirestoreStore, InMemoryPantryStore, PantryStore, StoreError};
