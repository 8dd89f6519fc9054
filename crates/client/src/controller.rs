//! List controller behind the pantry screen.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use pantry_core::PantryItemId;
use pantry_infra::{DataAccessError, PantryDataAccess};
use pantry_inventory::{PantryItem, SortKey, capitalize, remove_one, secondary_label, view};

use crate::debounce::Debouncer;
use crate::form::{FormError, ItemForm};
use crate::notice::Notice;

/// One rendered line of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: PantryItemId,
    pub title: String,
    pub secondary: String,
}

/// What a refresh did with its response.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The view now shows `count` items.
    Applied { count: usize },
    /// A newer refresh was started while this one was in flight; the response
    /// was dropped.
    Stale,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Store(#[from] DataAccessError),
}

#[derive(Debug, Default)]
struct ListState {
    items: Vec<PantryItem>,
    query: String,
    sort_key: SortKey,
    loading: bool,
    editing: Option<PantryItem>,
    generation: u64,
}

/// State reachable from scheduled refreshes. Holds no reference back to the
/// debouncer, so dropping the last [`PantryList`] cancels what is pending.
#[derive(Debug)]
struct Shared {
    data: PantryDataAccess,
    state: Mutex<ListState>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn refresh(&self) -> Result<RefreshOutcome, DataAccessError> {
        let generation = {
            let mut state = self.state();
            state.generation += 1;
            state.loading = true;
            state.generation
        };

        let fetched = self.data.fetch_all("").await;

        let mut state = self.state();
        if state.generation != generation {
            tracing::debug!(generation, latest = state.generation, "dropping stale pantry response");
            return Ok(RefreshOutcome::Stale);
        }
        state.loading = false;

        match fetched {
            Ok(all) => {
                state.items = view(&all, &state.query, state.sort_key);
                Ok(RefreshOutcome::Applied {
                    count: state.items.len(),
                })
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to refresh pantry items");
                Err(err)
            }
        }
    }
}

/// Controller for the pantry list: search, sort, add/edit and "remove one".
///
/// Cheap to clone; clones drive the same list. Store failures never clear
/// what is on screen: they are logged, returned, and the previous items stay.
#[derive(Debug, Clone)]
pub struct PantryList {
    shared: Arc<Shared>,
    debouncer: Arc<Debouncer>,
}

impl PantryList {
    pub fn new(data: PantryDataAccess, debounce: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                data,
                state: Mutex::new(ListState::default()),
            }),
            debouncer: Arc::new(Debouncer::new(debounce)),
        }
    }

    pub fn query(&self) -> String {
        self.shared.state().query.clone()
    }

    pub fn sort_key(&self) -> SortKey {
        self.shared.state().sort_key
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state().loading
    }

    /// Items currently shown, in display order.
    pub fn items(&self) -> Vec<PantryItem> {
        self.shared.state().items.clone()
    }

    /// The item being edited, if the form is in edit mode.
    pub fn editing(&self) -> Option<PantryItem> {
        self.shared.state().editing.clone()
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.shared.state().query = query.into();
        self.schedule_refresh();
    }

    pub fn set_sort_key(&self, sort_key: SortKey) {
        self.shared.state().sort_key = sort_key;
        self.schedule_refresh();
    }

    /// Refresh once the debounce delay passes without further input.
    pub fn schedule_refresh(&self) {
        let shared = self.shared.clone();
        self.debouncer.schedule(async move {
            // Failures are logged by `refresh`; the view keeps its items.
            let _ = shared.refresh().await;
        });
    }

    /// Drop a scheduled refresh. Returns whether one was waiting.
    pub fn cancel_pending(&self) -> bool {
        self.debouncer.cancel()
    }

    pub fn has_pending_refresh(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Fetch now and rebuild the view from the current query and sort key.
    pub async fn refresh(&self) -> Result<RefreshOutcome, DataAccessError> {
        self.shared.refresh().await
    }

    pub fn rows(&self) -> Vec<ListRow> {
        let state = self.shared.state();
        state
            .items
            .iter()
            .map(|item| ListRow {
                id: item.id().clone(),
                title: capitalize(item.name()),
                secondary: secondary_label(item, &state.query, state.sort_key).to_string(),
            })
            .collect()
    }

    /// Details of an item in the current view.
    pub fn select(&self, id: &PantryItemId) -> Option<PantryItem> {
        self.shared
            .state()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// Enter edit mode for `id`; returns the pre-filled form.
    pub fn begin_edit(&self, id: &PantryItemId) -> Option<ItemForm> {
        let mut state = self.shared.state();
        let item = state.items.iter().find(|item| item.id() == id)?.clone();
        let form = ItemForm::from_item(&item);
        state.editing = Some(item);
        Some(form)
    }

    pub fn cancel_edit(&self) {
        self.shared.state().editing = None;
    }

    /// Save the form: an update of the edited item in edit mode, otherwise a
    /// new item added now.
    ///
    /// Edit mode is left only once the write succeeded.
    pub async fn submit(&self, form: ItemForm) -> Result<Notice, SubmitError> {
        let data = &self.shared.data;

        let notice = match self.editing() {
            Some(item) => {
                let patch = form.into_patch()?;
                data.update(item.id(), patch)
                    .await
                    .inspect_err(|err| tracing::error!(id = %item.id(), error = %err, "failed to update pantry item"))?;
                Notice::ITEM_UPDATED
            }
            None => {
                let item = form.into_new_item(Utc::now())?;
                data.create(item)
                    .await
                    .inspect_err(|err| tracing::error!(error = %err, "failed to add pantry item"))?;
                Notice::ITEM_ADDED
            }
        };

        self.shared.state().editing = None;
        self.schedule_refresh();
        Ok(notice)
    }

    /// Consume one unit of the item: decrement its quantity, or delete it at
    /// the last unit.
    ///
    /// `Ok(None)` when the item is not in the current view.
    pub async fn remove_one(&self, id: &PantryItemId) -> Result<Option<Notice>, DataAccessError> {
        let Some(item) = self.select(id) else {
            tracing::debug!(%id, "remove-one ignored: item not in view");
            return Ok(None);
        };

        let data = &self.shared.data;
        let action = remove_one(&item);
        let written = match action.patch() {
            Some(patch) => data.update(action.id(), patch).await,
            None => data.delete(action.id()).await,
        };
        if let Err(err) = &written {
            tracing::error!(%id, error = %err, "failed to remove pantry item");
        }
        written?;

        self.schedule_refresh();
        Ok(Some(Notice::from(&action)))
    }
}
