//! Provider configuration.
//!
//! A `ProviderConfig` is immutable after load and owned by the registry.
//! The credential is held as a [`SecretString`] so `Debug` output, logs and
//! telemetry can never leak it.

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(20_000);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(1_000);

/// Configuration for one provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// API credential. Redacted in `Debug`, never logged or emitted.
    pub api_key: SecretString,
    /// Base URL of the provider API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Default model identifier for this provider.
    pub model: String,
    /// Per-attempt time budget.
    #[serde(default = "default_timeout", with = "duration_ms")]
    pub timeout: Duration,
    /// Total attempt budget.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry; doubles per attempt.
    #[serde(default = "default_base_backoff", with = "duration_ms")]
    pub base_backoff: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_base_backoff() -> Duration {
    DEFAULT_BASE_BACKOFF
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

impl ProviderConfig {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: base_url.into(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff: DEFAULT_BASE_BACKOFF,
        }
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub const fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    /// Load a provider's configuration from the environment.
    ///
    /// Reads `<ID>_API_KEY` (required), `<ID>_BASE_URL` (required),
    /// `<ID>_MODEL` (required), and optional `<ID>_TIMEOUT_MS`,
    /// `<ID>_MAX_RETRIES`, `<ID>_BASE_BACKOFF_MS`, where `<ID>` is the
    /// upper-cased provider id. Returns `None` when a required variable is
    /// absent.
    pub fn from_env(provider_id: &str) -> Option<Self> {
        let prefix = provider_id.to_uppercase().replace('-', "_");
        let var = |suffix: &str| std::env::var(format!("{prefix}_{suffix}")).ok();

        let mut config = Self::new(var("API_KEY")?, var("BASE_URL")?, var("MODEL")?);

        if let Some(ms) = var("TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(n) = var("MAX_RETRIES").and_then(|v| v.parse::<u32>().ok()) {
            config.max_retries = n;
        }
        if let Some(ms) = var("BASE_BACKOFF_MS").and_then(|v| v.parse::<u64>().ok()) {
            config.base_backoff = Duration::from_millis(ms);
        }

        Some(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = ProviderConfig::new("sk-test", "https://api.example.com", "m");
        assert_eq!(config.timeout, Duration::from_millis(20_000));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_backoff, Duration::from_millis(1_000));
    }

    #[test]
    fn debug_output_redacts_credential() {
        let config = ProviderConfig::new("sk-very-secret", "https://api.example.com", "m");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
    }

    #[test]
    #[allow(unsafe_code)]
    fn from_env_reads_overrides() {
        // SAFETY: test-local env mutation; keys are unique to this test.
        unsafe {
            std::env::set_var("ACME_TEST_API_KEY", "sk-env");
            std::env::set_var("ACME_TEST_BASE_URL", "https://acme.example.com/v1");
            std::env::set_var("ACME_TEST_MODEL", "acme-large");
            std::env::set_var("ACME_TEST_MAX_RETRIES", "5");
        }

        let config = ProviderConfig::from_env("acme-test").expect("required vars are set");
        assert_eq!(config.base_url, "https://acme.example.com/v1");
        assert_eq!(config.model, "acme-large");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn from_env_missing_required_yields_none() {
        assert!(ProviderConfig::from_env("nonexistent-provider").is_none());
    }
}
