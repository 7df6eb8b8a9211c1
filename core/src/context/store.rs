use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use brokerlens_types::{FilterState, FilterValue};
use tokio::sync::watch;

use super::error::ContextError;

struct StoreInner {
    tx: watch::Sender<FilterState>,
    version: AtomicU64,
}

/// Session-wide filter state.
///
/// Cloning yields another handle to the same state; every clone and every
/// subscriber observes the same value. Each mutation is a whole-value
/// replacement published as exactly one notification.
#[derive(Clone)]
pub struct FilterStore {
    inner: Arc<StoreInner>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::with_filters(FilterState::default())
    }

    pub fn with_filters(filters: FilterState) -> Self {
        let (tx, _) = watch::channel(filters);
        Self {
            inner: Arc::new(StoreInner {
                tx,
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Current snapshot
    pub fn get_filters(&self) -> FilterState {
        self.inner.tx.borrow().clone()
    }

    /// Replace exactly one field and notify subscribers
    pub fn update_filter(&self, value: FilterValue) {
        let key = value.key();
        self.publish(|filters| filters.apply(value));
        tracing::debug!(?key, "filter updated");
    }

    /// Restore every field to its default in a single notification
    pub fn reset_filters(&self) {
        self.publish(|filters| *filters = FilterState::default());
        tracing::debug!("filters reset");
    }

    /// Number of dimensions currently differing from their defaults
    pub fn active_filter_count(&self) -> usize {
        self.inner.tx.borrow().active_count()
    }

    /// Receiver that wakes on every filter notification
    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.inner.tx.subscribe()
    }

    /// Number of notifications published since the store was created
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    fn publish(&self, modify: impl FnOnce(&mut FilterState)) {
        // send_modify holds the channel lock for the whole edit, so readers
        // never see a partially applied change.
        self.inner.tx.send_modify(|filters| {
            modify(filters);
            self.inner.version.fetch_add(1, Ordering::SeqCst);
        });
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Root context created once at application start and handed by reference
/// to every consumer. Shared state must be provided before it is used.
#[derive(Clone, Default)]
pub struct DashboardContext {
    filters: Option<FilterStore>,
}

impl DashboardContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the session's filter store
    pub fn provide_filters(&mut self, store: FilterStore) {
        self.filters = Some(store);
    }

    /// Handle to the filter store, or a configuration error when none was provided
    pub fn use_filters(&self) -> Result<FilterStore, ContextError> {
        self.filters.clone().ok_or(ContextError::FilterStoreMissing)
    }
}
