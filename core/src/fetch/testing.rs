//! In-memory transport whose requests are answered by the test body

use std::future::Future;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use super::FetchState;
use super::error::FetchError;
use super::transport::{RawResponse, Transport};

/// One request waiting for the test to answer it
pub(crate) struct PendingRequest {
    pub url: String,
    pub cancel: CancellationToken,
    reply: oneshot::Sender<Result<RawResponse, FetchError>>,
}

impl PendingRequest {
    pub fn respond_json(self, body: Value) {
        let _ = self.reply.send(Ok(RawResponse::ok(body.to_string())));
    }

    pub fn respond_status(self, status: u16, status_text: &str) {
        let _ = self.reply.send(Ok(RawResponse {
            status,
            status_text: status_text.to_string(),
            body: String::new(),
        }));
    }

    pub fn fail(self, message: &str) {
        let _ = self.reply.send(Err(FetchError::Network(message.to_string())));
    }
}

pub(crate) struct ScriptedTransport {
    requests: mpsc::UnboundedSender<PendingRequest>,
}

impl ScriptedTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PendingRequest>) {
        let (requests, rx) = mpsc::unbounded_channel();
        (Self { requests }, rx)
    }
}

impl Transport for ScriptedTransport {
    fn get(
        &self,
        resource: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<RawResponse, FetchError>> + Send {
        let (reply, answer) = oneshot::channel();
        let _ = self.requests.send(PendingRequest {
            url: resource.to_string(),
            cancel,
            reply,
        });
        async move { answer.await.unwrap_or(Err(FetchError::Cancelled)) }
    }
}

/// Wait until the fetch state has settled (not loading)
pub(crate) async fn settled<T: Clone>(rx: &mut watch::Receiver<FetchState<T>>) -> FetchState<T> {
    rx.wait_for(|state| !state.loading)
        .await
        .expect("fetcher dropped while waiting")
        .clone()
}
