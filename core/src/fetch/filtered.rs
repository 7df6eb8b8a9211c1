//! Fetcher bound to the shared filter store.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::FetchState;
use super::engine::ResourceFetcher;
use super::transport::{HttpTransport, Transport};
use crate::context::FilterStore;
use crate::query::resource_url;

/// Fetches `base` with the current filters appended, re-deriving the URL on
/// every filter notification. A changed URL cancels the pending request and
/// fetches again; an unchanged one is a no-op.
pub struct FilteredFetcher<T, C = HttpTransport> {
    base: String,
    fetcher: ResourceFetcher<T, C>,
    follow: JoinHandle<()>,
}

impl<T, C> FilteredFetcher<T, C>
where
    T: DeserializeOwned + Send + Sync + 'static,
    C: Transport,
{
    pub fn mount(
        store: &FilterStore,
        transport: C,
        base: impl Into<String>,
        refresh: Option<Duration>,
    ) -> Self {
        let base = base.into();

        // Subscribe before reading so no change between the two is missed
        let mut filters = store.subscribe();
        let initial = resource_url(&base, &filters.borrow_and_update());
        let fetcher = ResourceFetcher::mount(transport, initial, refresh);

        let handle = fetcher.handle();
        let follow_base = base.clone();
        let follow = tokio::spawn(async move {
            while filters.changed().await.is_ok() {
                let url = resource_url(&follow_base, &filters.borrow_and_update());
                if !handle.is_alive() {
                    break;
                }
                handle.set_resource(url);
            }
        });

        Self {
            base,
            fetcher,
            follow,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// URL of the current request, filters included
    pub fn resource(&self) -> String {
        self.fetcher.resource()
    }

    pub fn refetch(&self) {
        self.fetcher.refetch();
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.fetcher.subscribe()
    }

    pub fn unmount(self) {}
}

impl<T: Clone, C> FilteredFetcher<T, C> {
    pub fn state(&self) -> FetchState<T> {
        self.fetcher.state()
    }
}

impl<T, C> Drop for FilteredFetcher<T, C> {
    fn drop(&mut self) {
        self.follow.abort();
    }
}
