//! Shared filter and configuration types for brokerlens
//!
//! This crate contains the serializable types that are shared between the
//! fetch/table core (brokerlens-core) and every consumer that renders it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder token meaning "no filter on this dimension".
pub const ALL: &str = "all";

/// One backend row: string keys mapped to string/number/null values.
pub type Record = serde_json::Map<String, serde_json::Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Filter Dimensions
// ─────────────────────────────────────────────────────────────────────────────

/// Reporting window selected in the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_3_months")]
    Last3Months,
    #[default]
    #[serde(rename = "last_6_months")]
    Last6Months,
    #[serde(rename = "last_12_months")]
    Last12Months,
    AllTime,
}

impl DateRange {
    /// Wire token sent as the `date_range` query parameter
    pub fn as_token(&self) -> &'static str {
        match self {
            DateRange::Last30Days => "last_30_days",
            DateRange::Last3Months => "last_3_months",
            DateRange::Last6Months => "last_6_months",
            DateRange::Last12Months => "last_12_months",
            DateRange::AllTime => "all_time",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::Last30Days => "Last 30 Days",
            DateRange::Last3Months => "Last 3 Months",
            DateRange::Last6Months => "Last 6 Months",
            DateRange::Last12Months => "Last 12 Months",
            DateRange::AllTime => "All Time",
        }
    }

    pub fn all() -> &'static [DateRange] {
        &[
            DateRange::Last30Days,
            DateRange::Last3Months,
            DateRange::Last6Months,
            DateRange::Last12Months,
            DateRange::AllTime,
        ]
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Returned when a date range token is not one of the known windows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDateRange(pub String);

impl fmt::Display for UnknownDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown date range '{}' (expected one of: {})",
            self.0,
            DateRange::all()
                .iter()
                .map(DateRange::as_token)
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for UnknownDateRange {}

impl FromStr for DateRange {
    type Err = UnknownDateRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateRange::all()
            .iter()
            .copied()
            .find(|range| range.as_token() == s)
            .ok_or_else(|| UnknownDateRange(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filter State
// ─────────────────────────────────────────────────────────────────────────────

/// The four active filter dimensions shared by every page of the dashboard.
///
/// `brokers` is a sequence but the filter bar only ever sets one element;
/// an empty list means "all brokers".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub brokers: Vec<String>,
    #[serde(default = "default_all")]
    pub product: String,
    #[serde(default = "default_all")]
    pub state: String,
}

fn default_all() -> String {
    ALL.to_string()
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            date_range: DateRange::default(),
            brokers: Vec::new(),
            product: default_all(),
            state: default_all(),
        }
    }
}

impl FilterState {
    /// Broker actually sent to the backend (only the first one is representable)
    pub fn broker(&self) -> Option<&str> {
        self.brokers.first().map(String::as_str)
    }

    /// Whether `key` differs from its default value
    pub fn is_active(&self, key: FilterKey) -> bool {
        match key {
            FilterKey::DateRange => self.date_range != DateRange::default(),
            FilterKey::Brokers => !self.brokers.is_empty(),
            FilterKey::Product => self.product != ALL,
            FilterKey::State => self.state != ALL,
        }
    }

    /// Number of dimensions that differ from their defaults (0..=4)
    pub fn active_count(&self) -> usize {
        FilterKey::all()
            .iter()
            .filter(|key| self.is_active(**key))
            .count()
    }

    /// Replace exactly one field
    pub fn apply(&mut self, value: FilterValue) {
        match value {
            FilterValue::DateRange(range) => self.date_range = range,
            FilterValue::Brokers(brokers) => self.brokers = brokers,
            FilterValue::Product(product) => self.product = product,
            FilterValue::State(state) => self.state = state,
        }
    }
}

/// Names one of the four filter dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    DateRange,
    Brokers,
    Product,
    State,
}

impl FilterKey {
    pub fn all() -> &'static [FilterKey] {
        &[
            FilterKey::DateRange,
            FilterKey::Brokers,
            FilterKey::Product,
            FilterKey::State,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterKey::DateRange => "Date Range",
            FilterKey::Brokers => "Broker",
            FilterKey::Product => "Product",
            FilterKey::State => "State",
        }
    }
}

/// A whole-field replacement for one filter dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    DateRange(DateRange),
    Brokers(Vec<String>),
    Product(String),
    State(String),
}

impl FilterValue {
    pub fn key(&self) -> FilterKey {
        match self {
            FilterValue::DateRange(_) => FilterKey::DateRange,
            FilterValue::Brokers(_) => FilterKey::Brokers,
            FilterValue::Product(_) => FilterKey::Product,
            FilterValue::State(_) => FilterKey::State,
        }
    }

    /// Single-broker selection as set by the broker dropdown; `all` clears it.
    pub fn broker(name: &str) -> Self {
        if name == ALL || name.is_empty() {
            FilterValue::Brokers(Vec::new())
        } else {
            FilterValue::Brokers(vec![name.to_string()])
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Config
// ─────────────────────────────────────────────────────────────────────────────

fn default_api_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_states_path() -> String {
    "/api/filters/states".to_string()
}

fn default_brokers_path() -> String {
    "/api/filters/brokers".to_string()
}

fn default_page() -> String {
    "/api/brokers/performance".to_string()
}

/// Persisted application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scheme and host of the analytics API (paths are appended to it)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Auto-refresh interval for opened resources; 0 disables polling
    #[serde(default)]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Distinct-states lookup used to populate the state filter
    #[serde(default = "default_states_path")]
    pub states_path: String,
    /// Distinct-brokers lookup used to populate the broker filter
    #[serde(default = "default_brokers_path")]
    pub brokers_path: String,
    /// Resource opened when no path is given
    #[serde(default = "default_page")]
    pub default_page: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            refresh_interval_secs: 0,
            page_size: default_page_size(),
            states_path: default_states_path(),
            brokers_path: default_brokers_path(),
            default_page: default_page(),
        }
    }
}
