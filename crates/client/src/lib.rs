//! Pantry list front end.
//!
//! [`PantryList`] owns what the user sees: the current query and sort key,
//! the filtered view, and the edit state. It talks to the store only through
//! [`PantryDataAccess`](pantry_infra::PantryDataAccess) and never crashes the
//! view on a store failure; errors are logged and the previous items stay.

pub mod cli;
pub mod controller;
pub mod debounce;
pub mod form;
pub mod notice;

pub use controller::{ListRow, PantryList, RefreshOutcome, SubmitError};
pub use debounce::Debouncer;
pub use form::{FormError, ItemForm};
pub use notice::Notice;
