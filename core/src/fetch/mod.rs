//! Filtered data fetching against the analytics API.
//!
//! - `ResourceFetcher`: single-flight fetch of one resource with optional polling
//! - `FilteredFetcher`: binds a fetcher to the filter store so filter changes refetch
//! - `Transport` / `HttpTransport`: the network seam

mod engine;
mod envelope;
pub mod error;
mod filtered;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

use chrono::{DateTime, Utc};

pub use engine::{FetchHandle, ResourceFetcher, Trigger};
pub use envelope::{Payload, decode_response, unwrap_envelope};
pub use error::FetchError;
pub use filtered::FilteredFetcher;
pub use transport::{HttpTransport, RawResponse, Transport};

/// Observable state of one fetcher.
///
/// `data` survives a later failure; an absent `data` renders the same
/// "no data" fallback whether the cause was an error or an empty result.
/// `resource` is the URL of the latest dispatched request; it changes in the
/// same notification that sets `loading`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub resource: String,
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            resource: String::new(),
            data: None,
            loading: false,
            error: None,
            last_updated: None,
        }
    }
}

impl<T> FetchState<T> {
    /// Settled with nothing to show (error or no payload)
    pub fn is_empty(&self) -> bool {
        !self.loading && self.data.is_none()
    }

    /// Settled on the request for `resource`
    pub fn is_settled_for(&self, resource: &str) -> bool {
        !self.loading && self.resource == resource
    }
}
