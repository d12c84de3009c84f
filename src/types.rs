//! Core data types shared across the call path.
//!
//! Requests and results are plain immutable data; attempt bookkeeping is
//! request-scoped and only surfaces through the terminal error or telemetry.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temperature range accepted by `CallRequest`.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// A single text-generation request, immutable once built.
#[derive(Debug, Clone)]
pub struct CallRequest {
    /// Prompt text sent to the provider. Never logged or emitted as telemetry.
    pub prompt: String,
    /// Model identifier, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Sampling temperature, 0.0..=2.0.
    pub temperature: f32,
    /// Maximum output tokens, must be positive.
    pub max_tokens: u32,
    /// Per-request overrides of the provider's timeout/retry settings.
    pub overrides: CallOverrides,
}

impl CallRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            temperature: 1.0,
            max_tokens: 1024,
            overrides: CallOverrides::default(),
        }
    }

    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_overrides(mut self, overrides: CallOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Optional per-request overrides of the configured timeout/retry settings.
#[derive(Debug, Clone, Default)]
pub struct CallOverrides {
    pub timeout: Option<Duration>,
    pub max_retries: Option<u32>,
    pub base_backoff: Option<Duration>,
}

impl CallOverrides {
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub const fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = Some(base_backoff);
        self
    }
}

/// Token usage counters reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Successful outcome of one adapter call.
///
/// `text` is guaranteed non-empty; a 2xx response without usable content is
/// classified `Malformed` and never reaches the caller as a result.
#[derive(Debug, Clone)]
pub struct CallResult {
    /// Generated text, non-empty.
    pub text: String,
    /// Token usage counters for the successful attempt.
    pub usage: TokenUsage,
    /// Total attempts consumed, including the successful one.
    pub attempts: u32,
    /// Wall-clock duration of the whole call, backoff included.
    pub elapsed: Duration,
}

/// Failure classification for a single attempt.
///
/// `Timeout`, `RateLimited` and `ServerError` are retryable; `ClientError`
/// and `Malformed` are terminal because retrying cannot change the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureLabel {
    Timeout,
    RateLimited,
    ServerError,
    ClientError,
    Malformed,
}

impl FailureLabel {
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimited | Self::ServerError
        )
    }
}

impl std::fmt::Display for FailureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::ClientError => "client_error",
            Self::Malformed => "malformed",
        };
        f.write_str(s)
    }
}

/// Terminal label attached to a failed call: either the attempt label that
/// stopped the loop, or `ExhaustedRetries` when every attempt was retryable
/// but the budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalLabel {
    Timeout,
    RateLimited,
    ServerError,
    ClientError,
    Malformed,
    ExhaustedRetries,
}

impl From<FailureLabel> for FinalLabel {
    fn from(label: FailureLabel) -> Self {
        match label {
            FailureLabel::Timeout => Self::Timeout,
            FailureLabel::RateLimited => Self::RateLimited,
            FailureLabel::ServerError => Self::ServerError,
            FailureLabel::ClientError => Self::ClientError,
            FailureLabel::Malformed => Self::Malformed,
        }
    }
}

impl std::fmt::Display for FinalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::RateLimited => f.write_str("rate_limited"),
            Self::ServerError => f.write_str("server_error"),
            Self::ClientError => f.write_str("client_error"),
            Self::Malformed => f.write_str("malformed"),
            Self::ExhaustedRetries => f.write_str("exhausted_retries"),
        }
    }
}

/// Outcome of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded,
    Failed(FailureLabel),
}

/// Bookkeeping for one request/response cycle within a call.
///
/// Records are appended in attempt order and live only for the duration of
/// the call; they ride along on the terminal error and telemetry events.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    /// 0-indexed attempt number.
    pub index: u32,
    pub started_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
    #[serde(with = "duration_millis")]
    pub latency: Duration,
}

pub(crate) mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}
