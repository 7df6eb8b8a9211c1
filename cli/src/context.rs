use std::sync::Arc;
use std::time::Duration;

use brokerlens_core::context::{AppConfigExt, DashboardContext, FilterStore};
use brokerlens_core::lookups::FilterOptions;
use brokerlens_core::table::TableView;
use brokerlens_core::{AppConfig, FetchState, FilteredFetcher, HttpTransport};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

/// A resource opened with `open`: its live fetcher plus the table view over it.
pub struct OpenResource {
    pub fetcher: FilteredFetcher<Value>,
    pub view: TableView,
}

impl OpenResource {
    pub fn state(&self) -> FetchState<Value> {
        self.fetcher.state()
    }
}

/// Holds all shared state for the CLI application.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    pub dashboard: DashboardContext,
    transport: Arc<RwLock<HttpTransport>>,
    pub options: Arc<RwLock<FilterOptions>>,
    /// The opened resource. None until `open` is used.
    pub open: Arc<Mutex<Option<OpenResource>>>,
}

impl CliContext {
    pub fn new() -> Result<Self, String> {
        let config = AppConfig::load();
        let transport = HttpTransport::new(config.api_base_url.clone()).map_err(|e| e.to_string())?;

        let mut dashboard = DashboardContext::new();
        dashboard.provide_filters(FilterStore::new());

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            dashboard,
            transport: Arc::new(RwLock::new(transport)),
            options: Arc::new(RwLock::new(FilterOptions::default())),
            open: Arc::new(Mutex::new(None)),
        })
    }

    pub fn filters(&self) -> Result<FilterStore, String> {
        self.dashboard.use_filters().map_err(|e| e.to_string())
    }

    pub async fn transport(&self) -> HttpTransport {
        self.transport.read().await.clone()
    }

    /// Point new requests at another API host. An already opened resource
    /// keeps the transport it was mounted with.
    pub async fn replace_transport(&self, base_url: &str) -> Result<(), String> {
        let transport = HttpTransport::new(base_url).map_err(|e| e.to_string())?;
        *self.transport.write().await = transport;
        Ok(())
    }

    pub async fn refresh_interval(&self) -> Option<Duration> {
        self.config.read().await.refresh_interval()
    }
}
