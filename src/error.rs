//! Error types raised by the adapter and the registry.
//!
//! Classification and retry decisions are total functions and never raise;
//! every error a caller can see comes from this enum and carries the
//! structured context (label, attempt count, provider id) needed to log or
//! alert without re-deriving it.

use crate::types::{AttemptRecord, FinalLabel};

#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// The request failed local validation; no attempt was issued.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The remote call stopped on a non-retryable label or exhausted its
    /// retry budget. Carries the full attempt history.
    #[error("provider call failed: provider={provider_id} label={label} attempts={}", .attempts.len())]
    ProviderCallFailed {
        provider_id: String,
        label: FinalLabel,
        attempts: Vec<AttemptRecord>,
    },

    /// The registry has no configuration for the requested provider id.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The caller's cancellation signal fired mid-call.
    #[error("call cancelled by caller")]
    Cancelled,
}

impl CallError {
    /// Attempts consumed before the error was raised.
    pub fn attempt_count(&self) -> u32 {
        match self {
            Self::ProviderCallFailed { attempts, .. } => attempts.len() as u32,
            _ => 0,
        }
    }

    /// Terminal label, when the error is a failed provider call.
    pub fn final_label(&self) -> Option<FinalLabel> {
        match self {
            Self::ProviderCallFailed { label, .. } => Some(*label),
            _ => None,
        }
    }
}

/// Failure of a single transport-level request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The attempt exceeded its deadline.
    #[error("attempt deadline exceeded")]
    Timeout,

    /// Connection-level failure (refused, reset, DNS, TLS).
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}
