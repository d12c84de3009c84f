//! Wire-format seam between the adapter and a concrete provider API.
//!
//! The adapter never inspects response bytes itself; a codec builds the
//! outbound request and extracts text plus usage counters from the body.
//! A decode returning `None` (or empty text) is reported upstream as a
//! malformed response.

use std::collections::HashMap;

use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::transport::TransportRequest;
use crate::types::{CallRequest, TokenUsage};

/// Decoded payload of a successful response.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub usage: TokenUsage,
}

/// Translates between [`CallRequest`]s and a provider's wire format.
pub trait ProviderCodec: Send + Sync {
    /// Build the transport request for one attempt.
    fn encode(&self, request: &CallRequest, config: &ProviderConfig) -> TransportRequest;

    /// Extract content and usage from a success-status body.
    ///
    /// `None` means the expected content field is absent or unreadable.
    fn decode(&self, body: &[u8]) -> Option<Decoded>;
}

/// Codec for the widely-cloned OpenAI chat-completions shape
/// (`choices[0].message.content` plus `usage` counters).
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiCompatibleCodec;

#[derive(Deserialize)]
struct ChatCompletionBody {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageBody>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct UsageBody {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl ProviderCodec for OpenAiCompatibleCodec {
    fn encode(&self, request: &CallRequest, config: &ProviderConfig) -> TransportRequest {
        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        let mut headers = HashMap::new();
        headers.insert(
            "authorization".to_string(),
            format!("Bearer {}", config.api_key.expose_secret()),
        );

        let body = serde_json::json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        TransportRequest { url, headers, body }
    }

    fn decode(&self, body: &[u8]) -> Option<Decoded> {
        let parsed: ChatCompletionBody = serde_json::from_slice(body).ok()?;
        let text = parsed.choices.first()?.message.content.clone()?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Some(Decoded { text, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn config() -> ProviderConfig {
        ProviderConfig::new("sk-test", "https://api.example.com/v1", "test-model")
    }

    #[test]
    fn encode_builds_chat_completions_request() {
        let req = CallRequest::new("hi", "test-model")
            .with_temperature(0.2)
            .with_max_tokens(16);
        let encoded = OpenAiCompatibleCodec.encode(&req, &config());

        assert_eq!(encoded.url, "https://api.example.com/v1/chat/completions");
        assert_eq!(
            encoded.headers.get("authorization").map(String::as_str),
            Some("Bearer sk-test")
        );
        assert_eq!(encoded.body["model"], "test-model");
        assert_eq!(encoded.body["max_tokens"], 16);
    }

    #[test]
    fn decode_extracts_content_and_usage() {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "hello" } }],
            "usage": { "prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5 }
        });
        let decoded = OpenAiCompatibleCodec
            .decode(body.to_string().as_bytes())
            .expect("well-formed body should decode");

        assert_eq!(decoded.text, "hello");
        assert_eq!(decoded.usage.total_tokens, 5);
    }

    #[test]
    fn decode_rejects_missing_content_field() {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant" } }]
        });
        assert!(OpenAiCompatibleCodec.decode(body.to_string().as_bytes()).is_none());
    }

    #[test]
    fn decode_rejects_non_json_body() {
        assert!(OpenAiCompatibleCodec.decode(b"<html>bad gateway</html>").is_none());
    }

    #[test]
    fn decode_tolerates_absent_usage() {
        let body = serde_json::json!({
            "choices": [{ "message": { "content": "ok" } }]
        });
        let decoded = OpenAiCompatibleCodec
            .decode(body.to_string().as_bytes())
            .expect("body without usage should still decode");
        assert_eq!(decoded.usage, TokenUsage::default());
    }
}
