//! Application configuration
//!
//! Re-exports the shared `AppConfig` from brokerlens-types and provides
//! persistence plus the environment override for the API location.

pub use brokerlens_types::AppConfig;

use super::error::ConfigError;

const APP_NAME: &str = "brokerlens";
const CONFIG_NAME: &str = "config";

/// Overrides `api_base_url` for the current process when set
pub const API_URL_ENV: &str = "BROKERLENS_API_URL";

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence
pub trait AppConfigExt: Sized {
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn with_env_overrides(self) -> Self;
    fn set_api_base_url(&mut self, url: &str) -> Result<(), ConfigError>;
    fn refresh_interval(&self) -> Option<std::time::Duration>;
}

impl AppConfigExt for AppConfig {
    /// Load the stored config, falling back to defaults when it is unreadable
    fn load() -> Self {
        Self::try_load()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "using default configuration");
                AppConfig::default()
            })
            .with_env_overrides()
    }

    fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    fn set_api_base_url(&mut self, url: &str) -> Result<(), ConfigError> {
        url::Url::parse(url).map_err(|source| ConfigError::InvalidApiUrl {
            url: url.to_string(),
            source,
        })?;
        self.api_base_url = url.trim_end_matches('/').to_string();
        Ok(())
    }

    fn refresh_interval(&self) -> Option<std::time::Duration> {
        (self.refresh_interval_secs > 0)
            .then(|| std::time::Duration::from_secs(self.refresh_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_api_base_url_validates_and_trims() {
        let mut config = AppConfig::default();
        config.set_api_base_url("https://bi.example.com/").unwrap();
        assert_eq!(config.api_base_url, "https://bi.example.com");

        let err = config.set_api_base_url("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiUrl { .. }));
        assert_eq!(config.api_base_url, "https://bi.example.com");
    }

    #[test]
    fn test_refresh_interval_zero_disables_polling() {
        let mut config = AppConfig::default();
        assert_eq!(config.refresh_interval(), None);
        config.refresh_interval_secs = 30;
        assert_eq!(
            config.refresh_interval(),
            Some(std::time::Duration::from_secs(30))
        );
    }
}
