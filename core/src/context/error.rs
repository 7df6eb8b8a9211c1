//! Error types for context operations

use thiserror::Error;

/// Errors when reading shared state from the dashboard context
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("filter store read before it was provided to the dashboard context")]
    FilterStoreMissing,
}

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("invalid api url '{url}'")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Errors when interpreting user-entered filter values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error(transparent)]
    UnknownDateRange(#[from] brokerlens_types::UnknownDateRange),

    #[error("'{value}' is not an available {dimension} option")]
    UnknownOption {
        dimension: &'static str,
        value: String,
    },
}
