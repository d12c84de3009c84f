//! Provider adapter: one resilient call over transport, codec, classifier
//! and retry policy.
//!
//! The adapter is request-scoped and shares no mutable state; the only
//! suspension points are the outbound call and the backoff sleep, and both
//! observe the caller's cancellation token.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::classify::{AttemptFailure, classify};
use crate::codec::{Decoded, ProviderCodec};
use crate::config::ProviderConfig;
use crate::error::{CallError, TransportError};
use crate::retry::RetryPolicy;
use crate::telemetry::{AttemptEvent, TelemetrySink};
use crate::transport::HttpTransport;
use crate::types::{
    AttemptOutcome, AttemptRecord, CallRequest, CallResult, FinalLabel, TEMPERATURE_RANGE,
    TokenUsage,
};

/// A configured provider behind the resilient call contract.
pub struct ProviderAdapter {
    id: String,
    config: ProviderConfig,
    transport: Arc<dyn HttpTransport>,
    codec: Arc<dyn ProviderCodec>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl std::fmt::Debug for ProviderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAdapter")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ProviderAdapter {
    pub fn new(
        id: impl Into<String>,
        config: ProviderConfig,
        transport: Arc<dyn HttpTransport>,
        codec: Arc<dyn ProviderCodec>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            id: id.into(),
            config,
            transport,
            codec,
            telemetry,
        }
    }

    /// Provider identifier this adapter was registered under.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Issue one resilient call with no external cancellation.
    pub async fn call(&self, request: CallRequest) -> Result<CallResult, CallError> {
        self.call_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Issue one resilient call, aborting as soon as `cancel` fires.
    ///
    /// Cancellation interrupts both an in-flight attempt and a pending
    /// backoff sleep and surfaces as [`CallError::Cancelled`]. A per-attempt
    /// deadline expiring is independent of this signal: it counts as a
    /// retryable `Timeout` for that attempt only.
    pub async fn call_with_cancellation(
        &self,
        request: CallRequest,
        cancel: CancellationToken,
    ) -> Result<CallResult, CallError> {
        validate(&request)?;

        let timeout = request.overrides.timeout.unwrap_or(self.config.timeout);
        let policy = self.retry_policy(&request);
        let call_started = Instant::now();
        let mut attempts: Vec<AttemptRecord> = Vec::new();

        for attempt_index in 0..policy.max_retries {
            let started_at = Utc::now();
            let attempt_started = Instant::now();

            let outcome = self.run_attempt(&request, timeout, &cancel).await?;
            let latency = attempt_started.elapsed();

            match outcome {
                Ok(decoded) => {
                    attempts.push(AttemptRecord {
                        index: attempt_index,
                        started_at,
                        outcome: AttemptOutcome::Succeeded,
                        latency,
                    });
                    self.emit(attempt_index, AttemptOutcome::Succeeded, latency, Some(decoded.usage));

                    return Ok(CallResult {
                        text: decoded.text,
                        usage: decoded.usage,
                        attempts: attempt_index + 1,
                        elapsed: call_started.elapsed(),
                    });
                }
                Err(failure) => {
                    let label = classify(&failure);
                    attempts.push(AttemptRecord {
                        index: attempt_index,
                        started_at,
                        outcome: AttemptOutcome::Failed(label),
                        latency,
                    });
                    self.emit(attempt_index, AttemptOutcome::Failed(label), latency, None);

                    if !policy.should_retry(label, attempt_index) {
                        let final_label = if label.is_retryable() {
                            // Retryable failure with no budget left.
                            FinalLabel::ExhaustedRetries
                        } else {
                            FinalLabel::from(label)
                        };
                        return Err(CallError::ProviderCallFailed {
                            provider_id: self.id.clone(),
                            label: final_label,
                            attempts,
                        });
                    }

                    let delay = policy.backoff_delay(attempt_index);
                    tracing::debug!(
                        provider_id = %self.id,
                        attempt_index,
                        label = %label,
                        backoff_ms = delay.as_millis() as u64,
                        "retrying after backoff"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(CallError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        // Unreachable with max_retries >= 1: the loop always returns from
        // its final iteration. A zero-attempt policy lands here.
        Err(CallError::ProviderCallFailed {
            provider_id: self.id.clone(),
            label: FinalLabel::ExhaustedRetries,
            attempts,
        })
    }

    /// One attempt: encode, send under the deadline, decode.
    ///
    /// Outer `Err` is external cancellation; the inner result is the
    /// attempt outcome fed to the classifier.
    async fn run_attempt(
        &self,
        request: &CallRequest,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Result<Decoded, AttemptFailure>, CallError> {
        let wire_request = self.codec.encode(request, &self.config);

        let send = tokio::time::timeout(timeout, self.transport.send(wire_request, timeout));
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(CallError::Cancelled),
            result = send => match result {
                Ok(inner) => inner,
                Err(_elapsed) => Err(TransportError::Timeout),
            },
        };

        Ok(match response {
            Ok(response) if response.is_success() => match self.codec.decode(&response.body) {
                Some(decoded) if !decoded.text.is_empty() => Ok(decoded),
                _ => Err(AttemptFailure::MissingContent),
            },
            Ok(response) => Err(AttemptFailure::Status(response.status)),
            Err(err) => Err(AttemptFailure::Transport(err)),
        })
    }

    fn retry_policy(&self, request: &CallRequest) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_retries(
                request
                    .overrides
                    .max_retries
                    .unwrap_or(self.config.max_retries),
            )
            .with_base_backoff(
                request
                    .overrides
                    .base_backoff
                    .unwrap_or(self.config.base_backoff),
            )
    }

    fn emit(
        &self,
        attempt_index: u32,
        outcome: AttemptOutcome,
        latency: Duration,
        usage: Option<TokenUsage>,
    ) {
        let event = AttemptEvent {
            provider_id: self.id.clone(),
            model: self.config.model.clone(),
            attempt_index,
            outcome,
            latency,
            usage,
        };
        if let Err(err) = self.telemetry.record(&event) {
            tracing::warn!(provider_id = %self.id, "failed to record attempt event: {err}");
        }
    }
}

fn validate(request: &CallRequest) -> Result<(), CallError> {
    if request.prompt.is_empty() {
        return Err(CallError::InvalidRequest("prompt must not be empty".into()));
    }
    if !TEMPERATURE_RANGE.contains(&request.temperature) {
        return Err(CallError::InvalidRequest(format!(
            "temperature {} outside 0.0..=2.0",
            request.temperature
        )));
    }
    if request.max_tokens == 0 {
        return Err(CallError::InvalidRequest(
            "max_tokens must be positive".into(),
        ));
    }
    Ok(())
}
