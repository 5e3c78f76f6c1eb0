//! Gateway client for the chat-completion endpoint.
//!
//! Speaks the OpenAI-compatible chat-completions wire format against the
//! configured AI gateway, in both buffered and streaming modes. One attempt
//! per call, no automatic retries: failed calls are mapped to user-facing
//! fallback content upstream, and retry is always an explicit fresh send.

use futures::StreamExt;
use serde_json::Value;
use thiserror::Error;

use crate::chat::WireMessage;

use super::streaming::{parse_sse_line, ChannelStreamReceiver, SseFrame, StreamChunk};

/// Gateway connection settings, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bearer token for the gateway. Calls fail fast when absent.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: f64,
}

impl GatewayConfig {
    /// Load from environment variables.
    ///
    /// - `AI_GATEWAY_API_KEY` — bearer token
    /// - `AI_GATEWAY_URL` — base URL (default: the Lovable gateway)
    /// - `AI_GATEWAY_MODEL` — model id (default: gemini flash preview)
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("AI_GATEWAY_API_KEY").ok(),
            base_url: std::env::var("AI_GATEWAY_URL")
                .unwrap_or_else(|_| "https://ai.gateway.lovable.dev/v1".into()),
            model: std::env::var("AI_GATEWAY_MODEL")
                .unwrap_or_else(|_| "google/gemini-3-flash-preview".into()),
            timeout_secs: 30.0,
        }
    }
}

/// Transport failure taxonomy. `user_message` carries the Chinese text shown
/// to the end user; raw errors are never surfaced directly.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway API key is not configured")]
    MissingApiKey,

    /// 429 from the gateway.
    #[error("rate limited by the AI gateway")]
    RateLimited,

    /// 402 from the gateway.
    #[error("AI gateway quota exhausted")]
    QuotaExhausted,

    /// Any other non-2xx status or a response missing the reply text.
    #[error("AI gateway unavailable: {0}")]
    Unavailable(String),

    #[error("AI gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GatewayError {
    /// The user-facing message for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            GatewayError::RateLimited => "请求过于频繁，请稍后再试",
            GatewayError::QuotaExhausted => "AI 服务额度不足",
            _ => "AI 服务暂时不可用",
        }
    }
}

/// Client for the completion endpoint.
pub struct GatewayClient {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs_f64(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Buffered call: send the full history and await one JSON payload.
    /// Returns the trimmed reply text.
    pub async fn complete(
        &self,
        system_prompt: &str,
        messages: &[WireMessage],
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, GatewayError> {
        let response = self
            .send_request(system_prompt, messages, max_tokens, temperature, false)
            .await?;

        let body: Value = response.json().await?;
        let content = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| GatewayError::Unavailable("reply text missing from response".into()))?;

        Ok(content.trim().to_string())
    }

    /// Streaming call: returns a chunk receiver fed by a background reader
    /// task. Dropping the receiver closes the channel and tears the reader
    /// down on its next send.
    pub async fn stream(
        &self,
        system_prompt: &str,
        messages: &[WireMessage],
        max_tokens: u32,
        temperature: f64,
    ) -> Result<ChannelStreamReceiver, GatewayError> {
        let response = self
            .send_request(system_prompt, messages, max_tokens, temperature, true)
            .await?;

        let (tx, rx) = ChannelStreamReceiver::pair(32);
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut buffer = String::new();
            let mut assembled = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        log::warn!("gateway stream read failed: {}", e);
                        let _ = tx.send(StreamChunk::Error { message: e.to_string() }).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline) = buffer.find('\n') {
                    let line: String = buffer.drain(..=newline).collect();
                    match parse_sse_line(&line) {
                        Some(SseFrame::Delta(text)) => {
                            assembled.push_str(&text);
                            if tx.send(StreamChunk::TextDelta { text }).await.is_err() {
                                // Receiver dropped; consumer went away.
                                return;
                            }
                        }
                        Some(SseFrame::Done) => {
                            let _ = tx.send(StreamChunk::Done { content: assembled }).await;
                            return;
                        }
                        None => {}
                    }
                }
            }

            // Connection closed without a terminal frame; what arrived still
            // counts as the reply.
            let _ = tx.send(StreamChunk::Done { content: assembled }).await;
        });

        Ok(rx)
    }

    async fn send_request(
        &self,
        system_prompt: &str,
        messages: &[WireMessage],
        max_tokens: u32,
        temperature: f64,
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let api_key = self.config.api_key.as_ref().ok_or(GatewayError::MissingApiKey)?;

        let mut api_messages = vec![serde_json::json!({
            "role": "system",
            "content": system_prompt,
        })];
        for message in messages {
            api_messages.push(serde_json::to_value(message).unwrap_or_default());
        }

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": api_messages,
            "max_tokens": max_tokens,
            "temperature": temperature,
            "stream": stream,
        });

        log::debug!(
            "gateway call: model={}, messages={}, stream={}",
            self.config.model,
            api_messages.len(),
            stream,
        );

        let endpoint = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GatewayError::RateLimited);
        }
        if status == reqwest::StatusCode::PAYMENT_REQUIRED {
            return Err(GatewayError::QuotaExhausted);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::error!("gateway error: {} {}", status, text);
            return Err(GatewayError::Unavailable(format!("status {}", status)));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> GatewayConfig {
        GatewayConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".into(),
            model: "test-model".into(),
            timeout_secs: 1.0,
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast() {
        let client = GatewayClient::new(offline_config()).unwrap();
        let err = client
            .complete("system", &[], 100, 0.7)
            .await
            .expect_err("must fail without an api key");
        assert!(matches!(err, GatewayError::MissingApiKey));
        assert_eq!(err.user_message(), "AI 服务暂时不可用");
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_a_transport_error() {
        let mut config = offline_config();
        config.api_key = Some("test-key".into());
        let client = GatewayClient::new(config).unwrap();
        let err = client
            .complete("system", &[WireMessage::user("hi")], 100, 0.7)
            .await
            .expect_err("nothing listens on port 9");
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(GatewayError::RateLimited.user_message(), "请求过于频繁，请稍后再试");
        assert_eq!(GatewayError::QuotaExhausted.user_message(), "AI 服务额度不足");
        assert_eq!(
            GatewayError::Unavailable("status 500".into()).user_message(),
            "AI 服务暂时不可用"
        );
    }
}
