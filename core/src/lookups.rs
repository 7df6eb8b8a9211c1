//! Filter option lists loaded once at startup.
//!
//! Both lookups are best-effort: any failure leaves that list at its `all`
//! placeholder and is only logged.

use brokerlens_types::ALL;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::fetch::{FetchError, Transport, decode_response};
use crate::query::lookup_url;

/// Field names tried, in order, when a lookup returns records instead of strings
const NAME_FIELDS: &[&str] = &["state", "broker", "broker_name", "name"];

/// Choices offered by the state and broker filters; each starts with `all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub states: Vec<String>,
    pub brokers: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            states: vec![ALL.to_string()],
            brokers: vec![ALL.to_string()],
        }
    }
}

impl FilterOptions {
    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    pub fn has_broker(&self, broker: &str) -> bool {
        self.brokers.iter().any(|b| b == broker)
    }
}

pub async fn load_filter_options<C: Transport>(
    transport: &C,
    states_path: &str,
    brokers_path: &str,
) -> FilterOptions {
    let (states, brokers) = tokio::join!(
        load_options(transport, states_path),
        load_options(transport, brokers_path),
    );
    FilterOptions { states, brokers }
}

async fn load_options<C: Transport>(transport: &C, path: &str) -> Vec<String> {
    let url = lookup_url(path);
    match fetch_names(transport, &url).await {
        Ok(names) => {
            tracing::debug!(%url, count = names.len(), "loaded filter options");
            let mut options = Vec::with_capacity(names.len() + 1);
            options.push(ALL.to_string());
            options.extend(names.into_iter().filter(|name| name != ALL));
            options
        }
        Err(e) => {
            tracing::warn!(%url, error = %e, "filter options unavailable, keeping placeholder");
            vec![ALL.to_string()]
        }
    }
}

async fn fetch_names<C: Transport>(transport: &C, url: &str) -> Result<Vec<String>, FetchError> {
    let response = transport.get(url, CancellationToken::new()).await?;
    let payload: Value = decode_response(response)?;
    Ok(option_names(&payload))
}

/// Names from a lookup payload: an array of strings, or of records
pub fn option_names(payload: &Value) -> Vec<String> {
    let Some(items) = payload.as_array() else {
        return Vec::new();
    };

    let mut names: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let name = match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(record) => NAME_FIELDS
                .iter()
                .find_map(|field| record.get(*field).and_then(Value::as_str))
                .or_else(|| record.values().find_map(Value::as_str))
                .map(str::to_string),
            _ => None,
        };
        if let Some(name) = name.filter(|n| !n.is_empty())
            && !names.contains(&name)
        {
            names.push(name);
        }
    }
    names
}
