//! Attempt-level telemetry.
//!
//! The adapter emits one event per attempt to a caller-supplied sink.
//! Emission is fire-and-forget: a failing sink is logged at `warn` and
//! swallowed, it can never fail or block the call path. Events carry no
//! prompt content and no credential.

use std::time::Duration;

use serde::Serialize;

use crate::types::{AttemptOutcome, TokenUsage, duration_millis};

/// Structured record of one attempt's outcome.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptEvent {
    pub provider_id: String,
    pub model: String,
    pub attempt_index: u32,
    pub outcome: AttemptOutcome,
    #[serde(with = "duration_millis", rename = "latency_ms")]
    pub latency: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Destination for attempt events.
///
/// Implementations should return quickly; hand off to a channel or spawned
/// task for anything that can stall.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: &AttemptEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Sink that emits each event as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, event: &AttemptEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match event.outcome {
            AttemptOutcome::Succeeded => tracing::info!(
                provider_id = %event.provider_id,
                model = %event.model,
                attempt_index = event.attempt_index,
                outcome = "success",
                latency_ms = event.latency.as_millis() as u64,
                total_tokens = event.usage.map(|u| u.total_tokens),
                "provider attempt succeeded"
            ),
            AttemptOutcome::Failed(label) => tracing::warn!(
                provider_id = %event.provider_id,
                model = %event.model,
                attempt_index = event.attempt_index,
                outcome = %label,
                latency_ms = event.latency.as_millis() as u64,
                "provider attempt failed"
            ),
        }
        Ok(())
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn record(&self, _event: &AttemptEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureLabel;

    #[test]
    fn event_serializes_without_usage_field_when_absent() {
        let event = AttemptEvent {
            provider_id: "acme".into(),
            model: "acme-large".into(),
            attempt_index: 1,
            outcome: AttemptOutcome::Failed(FailureLabel::RateLimited),
            latency: Duration::from_millis(42),
            usage: None,
        };
        let json = serde_json::to_value(&event).expect("event should serialize");
        assert_eq!(json["latency_ms"], 42);
        assert!(json.get("usage").is_none());
    }

    #[test]
    fn event_serializes_usage_on_success() {
        let event = AttemptEvent {
            provider_id: "acme".into(),
            model: "acme-large".into(),
            attempt_index: 0,
            outcome: AttemptOutcome::Succeeded,
            latency: Duration::from_millis(7),
            usage: Some(TokenUsage {
                prompt_tokens: 1,
                completion_tokens: 2,
                total_tokens: 3,
            }),
        };
        let json = serde_json::to_value(&event).expect("event should serialize");
        assert_eq!(json["usage"]["total_tokens"], 3);
    }
}
