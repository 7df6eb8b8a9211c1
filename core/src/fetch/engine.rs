//! Single-flight request lifecycle for one resource.
//!
//! A `ResourceFetcher` owns at most one "current" request. Every dispatch
//! (mount, resource change, refresh tick, manual refetch) cancels the
//! previous token and bumps a generation counter under the same lock that
//! completions take before writing state, so a superseded request can never
//! overwrite the outcome of a newer one regardless of completion order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::FetchState;
use super::envelope::decode_response;
use super::error::FetchError;
use super::transport::{HttpTransport, RawResponse, Transport};

/// Why a request was dispatched (logged only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mount,
    ResourceChanged,
    Interval,
    Manual,
}

struct Flight {
    resource: String,
    generation: u64,
    token: Option<CancellationToken>,
    closed: bool,
}

struct Shared<T, C> {
    transport: C,
    state: watch::Sender<FetchState<T>>,
    flight: Mutex<Flight>,
}

impl<T, C> Shared<T, C> {
    fn lock_flight(&self) -> MutexGuard<'_, Flight> {
        self.flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) {
        let mut flight = self.lock_flight();
        flight.closed = true;
        if let Some(token) = flight.token.take() {
            token.cancel();
        }
    }
}

impl<T, C> Shared<T, C>
where
    T: DeserializeOwned + Send + Sync + 'static,
    C: Transport,
{
    fn dispatch(self: &Arc<Self>, trigger: Trigger) {
        let mut flight = self.lock_flight();
        self.start(&mut flight, trigger);
    }

    /// Supersede the current request and spawn a new one. Runs under the
    /// flight lock so the resource, generation and `loading` flip together.
    fn start(self: &Arc<Self>, flight: &mut Flight, trigger: Trigger) {
        if flight.closed {
            return;
        }
        if let Some(previous) = flight.token.take() {
            previous.cancel();
            tracing::debug!(
                resource = %flight.resource,
                generation = flight.generation,
                "superseded in-flight request"
            );
        }

        flight.generation += 1;
        let generation = flight.generation;
        let token = CancellationToken::new();
        flight.token = Some(token.clone());

        let resource = flight.resource.clone();
        self.state.send_modify(|state| {
            state.resource.clone_from(&resource);
            state.loading = true;
            state.error = None;
        });

        tracing::debug!(%resource, generation, ?trigger, "dispatching request");

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                outcome = shared.transport.get(&resource, token.clone()) => outcome,
            };
            shared.settle(generation, outcome);
        });
    }

    fn settle(&self, generation: u64, outcome: Result<RawResponse, FetchError>) {
        let mut flight = self.lock_flight();
        if flight.closed || flight.generation != generation {
            tracing::trace!(generation, "discarding stale completion");
            return;
        }

        match outcome.and_then(decode_response::<T>) {
            Ok(data) => {
                flight.token = None;
                self.state.send_modify(|state| {
                    state.data = Some(data);
                    state.last_updated = Some(Utc::now());
                    state.loading = false;
                });
            }
            Err(err) if err.is_cancelled() => {
                tracing::trace!(generation, "request cancelled");
            }
            Err(err) => {
                flight.token = None;
                tracing::warn!(resource = %flight.resource, error = %err, "request failed");
                self.state.send_modify(|state| {
                    state.error = Some(err.to_string());
                    state.loading = false;
                });
            }
        }
    }

    fn set_resource(self: &Arc<Self>, resource: String) {
        let mut flight = self.lock_flight();
        if flight.closed || flight.resource == resource {
            return;
        }
        flight.resource = resource;
        self.start(&mut flight, Trigger::ResourceChanged);
    }
}

/// Fetch lifecycle bound to one resource URL.
///
/// Must be mounted inside a tokio runtime. Dropping the fetcher tears it
/// down: the in-flight request is cancelled and the refresh timer stops.
pub struct ResourceFetcher<T, C = HttpTransport> {
    shared: Arc<Shared<T, C>>,
    refresh: Option<JoinHandle<()>>,
}

impl<T, C> ResourceFetcher<T, C>
where
    T: DeserializeOwned + Send + Sync + 'static,
    C: Transport,
{
    /// Start fetching `resource` now, and every `refresh` interval if given
    pub fn mount(transport: C, resource: impl Into<String>, refresh: Option<Duration>) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        let shared = Arc::new(Shared {
            transport,
            state,
            flight: Mutex::new(Flight {
                resource: resource.into(),
                generation: 0,
                token: None,
                closed: false,
            }),
        });

        let refresh = refresh
            .filter(|every| !every.is_zero())
            .map(|every| spawn_refresh(Arc::downgrade(&shared), every));

        shared.dispatch(Trigger::Mount);

        Self { shared, refresh }
    }

    /// Point the fetcher at a new resource; cancels and refetches when it changed
    pub fn set_resource(&self, resource: impl Into<String>) {
        self.shared.set_resource(resource.into());
    }

    /// Cancel whatever is in flight and fetch again immediately
    pub fn refetch(&self) {
        self.shared.dispatch(Trigger::Manual);
    }

    pub fn resource(&self) -> String {
        self.shared.lock_flight().resource.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.state.subscribe()
    }

    /// Weak handle usable from other tasks without keeping the fetcher alive
    pub fn handle(&self) -> FetchHandle<T, C> {
        FetchHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Tear down explicitly (same as dropping)
    pub fn unmount(self) {}
}

impl<T, C> ResourceFetcher<T, C>
where
    T: Clone,
{
    /// Snapshot of the current fetch state
    pub fn state(&self) -> FetchState<T> {
        self.shared.state.borrow().clone()
    }
}

impl<T, C> Drop for ResourceFetcher<T, C> {
    fn drop(&mut self) {
        self.shared.close();
        if let Some(timer) = self.refresh.take() {
            timer.abort();
        }
        tracing::trace!("fetcher torn down");
    }
}

/// Non-owning handle to a mounted fetcher; calls after teardown are no-ops.
pub struct FetchHandle<T, C = HttpTransport> {
    shared: Weak<Shared<T, C>>,
}

impl<T, C> Clone for FetchHandle<T, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<T, C> FetchHandle<T, C>
where
    T: DeserializeOwned + Send + Sync + 'static,
    C: Transport,
{
    pub fn set_resource(&self, resource: impl Into<String>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.set_resource(resource.into());
        }
    }

    pub fn refetch(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.dispatch(Trigger::Manual);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| !shared.lock_flight().closed)
    }
}

fn spawn_refresh<T, C>(shared: Weak<Shared<T, C>>, every: Duration) -> JoinHandle<()>
where
    T: DeserializeOwned + Send + Sync + 'static,
    C: Transport,
{
    tokio::spawn(async move {
        // First tick one interval after mount; the mount itself already fetched
        let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(shared) = shared.upgrade() else {
                break;
            };
            if shared.lock_flight().closed {
                break;
            }
            shared.dispatch(Trigger::Interval);
        }
    })
}
