//! callguard
//!
//! Resilient call adapter for remote reasoning providers. The single
//! [`ProviderAdapter::call`] contract wraps an injectable HTTP transport
//! with per-attempt time budgets, classified retries with exponential
//! backoff, caller-driven cancellation, and per-attempt telemetry. A
//! [`ProviderRegistry`] hands out one shared adapter per configured
//! provider id.
//!
//! ```rust,no_run
//! use callguard::{CallRequest, ProviderConfig, ProviderRegistry};
//!
//! # async fn example() -> Result<(), callguard::CallError> {
//! let registry = ProviderRegistry::builder()
//!     .register(
//!         "acme",
//!         ProviderConfig::new("sk-...", "https://api.acme.dev/v1", "acme-large"),
//!     )
//!     .build();
//!
//! let adapter = registry.get("acme")?;
//! let result = adapter
//!     .call(CallRequest::new("Summarize this release note.", "acme-large"))
//!     .await?;
//! println!("{} ({} attempts)", result.text, result.attempts);
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]

pub mod adapter;
pub mod classify;
pub mod codec;
pub mod config;
pub mod error;
pub mod registry;
pub mod retry;
pub mod telemetry;
pub mod transport;
pub mod types;

pub use adapter::ProviderAdapter;
pub use classify::{AttemptFailure, classify};
pub use codec::{Decoded, OpenAiCompatibleCodec, ProviderCodec};
pub use config::ProviderConfig;
pub use error::{CallError, TransportError};
pub use registry::{CodecFactory, ProviderRegistry, RegistryBuilder, global_registry};
pub use retry::RetryPolicy;
pub use telemetry::{AttemptEvent, NoopSink, TelemetrySink, TracingSink};
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
pub use types::{
    AttemptOutcome, AttemptRecord, CallOverrides, CallRequest, CallResult, FailureLabel,
    FinalLabel, TokenUsage,
};
