mod config;
pub mod error;
mod store;

pub use config::{API_URL_ENV, AppConfig, AppConfigExt};
pub use error::{ConfigError, ContextError, FilterError};
pub use store::{DashboardContext, FilterStore};
