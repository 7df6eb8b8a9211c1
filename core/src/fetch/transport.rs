//! HTTP transport for the analytics API
//!
//! The fetch engine only needs "GET this resource, abort when told to";
//! `Transport` is that seam, `HttpTransport` the reqwest-backed implementation.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::error::FetchError;

const USER_AGENT: &str = concat!("brokerlens/", env!("CARGO_PKG_VERSION"));

/// Status line and body of a settled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests that stop early once `cancel` fires.
pub trait Transport: Send + Sync + 'static {
    fn get(
        &self,
        resource: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<RawResponse, FetchError>> + Send;
}

/// reqwest client rooted at the API base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resource paths are joined to the base; absolute URLs pass through
    pub fn absolute(&self, resource: &str) -> String {
        if resource.starts_with("http://") || resource.starts_with("https://") {
            resource.to_string()
        } else if resource.starts_with('/') {
            format!("{}{}", self.base_url, resource)
        } else {
            format!("{}/{}", self.base_url, resource)
        }
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        resource: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<RawResponse, FetchError>> + Send {
        let url = self.absolute(resource);
        let request = self.client.get(url.clone());

        async move {
            let send = async {
                let response = request
                    .send()
                    .await
                    .map_err(|e| FetchError::Network(e.to_string()))?;

                let status = response.status();
                let status_text = status.canonical_reason().unwrap_or_default().to_string();

                // Error bodies are never parsed
                if !status.is_success() {
                    return Ok(RawResponse {
                        status: status.as_u16(),
                        status_text,
                        body: String::new(),
                    });
                }

                let body = response
                    .text()
                    .await
                    .map_err(|e| FetchError::Network(e.to_string()))?;

                Ok(RawResponse {
                    status: status.as_u16(),
                    status_text,
                    body,
                })
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::trace!(%url, "request aborted");
                    Err(FetchError::Cancelled)
                }
                result = send => result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_joins_paths_to_base() {
        let transport = HttpTransport::with_client(reqwest::Client::new(), "http://bi.local:3001/");
        assert_eq!(transport.base_url(), "http://bi.local:3001");
        assert_eq!(
            transport.absolute("/api/kpis?date_range=all_time"),
            "http://bi.local:3001/api/kpis?date_range=all_time"
        );
        assert_eq!(transport.absolute("api/kpis"), "http://bi.local:3001/api/kpis");
        assert_eq!(
            transport.absolute("https://other.host/api"),
            "https://other.host/api"
        );
    }

    #[test]
    fn test_success_range() {
        assert!(RawResponse::ok("{}").is_success());
        let not_found = RawResponse {
            status: 404,
            status_text: "Not Found".into(),
            body: String::new(),
        };
        assert!(!not_found.is_success());
    }
}
