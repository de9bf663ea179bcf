//! Anthropic streaming adapter.
//!
//! Talks to the messages API with `stream: true`. The system prompt moves
//! to the top-level `system` field and only user/assistant turns go in the
//! message list. This adapter does not participate in tool-calling; it
//! only ever emits text deltas, taken from `content_block_delta` events.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::constants::{ANTHROPIC_BASE_URL, ANTHROPIC_VERSION, MAX_TOKENS};
use crate::error::ChatError;
use crate::message::{Message, Role};
use crate::plugins::ToolDefinition;
use crate::stream::StreamEvent;

use super::sse::{parse_line, SseLine, SseLineBuffer};
use super::{EventStream, ProviderAdapter};

/// Adapter for the Anthropic messages API.
pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u64,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct StreamPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    delta: Option<PayloadDelta>,
}

#[derive(Deserialize)]
struct PayloadDelta {
    #[serde(rename = "type")]
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicAdapter {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

/// Splits history into the top-level system prompt and the wire messages.
fn to_wire(history: &[Message]) -> (Option<String>, Vec<WireMessage>) {
    let system = history
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.text().to_string());
    let messages = history
        .iter()
        .filter_map(|m| match m.role {
            Role::User => Some(WireMessage {
                role: "user",
                content: m.text().to_string(),
            }),
            Role::Assistant => Some(WireMessage {
                role: "assistant",
                content: m.text().to_string(),
            }),
            // System becomes the top-level field; this vendor never
            // produces tool-call or tool-result turns.
            Role::System | Role::Function => None,
        })
        .collect();
    (system, messages)
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn supports_tools(&self) -> bool {
        false
    }

    async fn send_turn(
        &self,
        history: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<EventStream, ChatError> {
        let (system, messages) = to_wire(history);
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            stream: true,
            system,
            messages,
        };

        let url = format!("{ANTHROPIC_BASE_URL}/v1/messages");
        let client = self.client.clone();
        let api_key = self.api_key.clone();

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let response = client
                .post(&url)
                .header("x-api-key", &api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    let _ = tx.send(Err(ChatError::adapter(e.to_string())));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<no body>".to_string());
                let _ = tx.send(Err(ChatError::adapter_status(status.as_u16(), body)));
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut lines = SseLineBuffer::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(Err(ChatError::adapter(e.to_string())));
                        return;
                    }
                };
                lines.push(&chunk);

                while let Some(line) = lines.next_line() {
                    let data = match parse_line(&line) {
                        SseLine::Data(data) => data,
                        _ => continue,
                    };
                    let payload: StreamPayload = match serde_json::from_str(&data) {
                        Ok(p) => p,
                        Err(_) => continue,
                    };
                    match payload.kind.as_str() {
                        "content_block_delta" => {
                            let text = payload
                                .delta
                                .filter(|d| d.kind.as_deref() == Some("text_delta"))
                                .and_then(|d| d.text);
                            if let Some(text) = text {
                                if tx.send(Ok(StreamEvent::TextDelta(text))).is_err() {
                                    return;
                                }
                            }
                        }
                        "message_stop" => return,
                        "error" => {
                            let _ = tx.send(Err(ChatError::adapter(data)));
                            return;
                        }
                        _ => {}
                    }
                }
            }
        });

        Ok(rx)
    }
}
