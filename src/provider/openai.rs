//! OpenAI-compatible streaming adapter.
//!
//! Covers OpenAI, DeepSeek, and OpenRouter, which share one wire protocol
//! and differ only in base endpoint. Responses arrive as SSE `data:` lines
//! terminated by `[DONE]`; each line carries a delta with either a text
//! fragment or a function-call fragment (legacy `functions` API), which
//! map one-to-one onto [`StreamEvent`]s.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ChatError;
use crate::message::Message;
use crate::plugins::ToolDefinition;
use crate::stream::StreamEvent;

use super::sse::{parse_line, SseLine, SseLineBuffer};
use super::{EventStream, ProviderAdapter};

/// Adapter for the OpenAI-compatible chat completions wire protocol.
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<Vec<ToolDefinition>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    delta: ChatDelta,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ChatDelta {
    content: Option<String>,
    function_call: Option<FunctionCallDelta>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FunctionCallDelta {
    name: Option<String>,
    arguments: Option<String>,
}

impl OpenAiAdapter {
    pub fn new(api_key: String, model: String, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn supports_tools(&self) -> bool {
        true
    }

    async fn send_turn(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<EventStream, ChatError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: history.to_vec(),
            stream: true,
            functions: if tools.is_empty() {
                None
            } else {
                Some(tools.to_vec())
            },
        };

        let url = format!("{}/chat/completions", self.base_url);
        let client = self.client.clone();
        let api_key = self.api_key.clone();

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let response = client
                .post(&url)
                .bearer_auth(&api_key)
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
                    if data == "[DONE]" {
                        return;
                    }
                    let parsed: ChatResponse = match serde_json::from_str(&data) {
                        Ok(p) => p,
                        // Skip unparseable keepalive/diagnostic payloads.
                        Err(_) => continue,
                    };
                    let Some(choice) = parsed.choices.into_iter().next() else {
                        continue;
                    };
                    if let Some(content) = choice.delta.content {
                        if tx.send(Ok(StreamEvent::TextDelta(content))).is_err() {
                            return;
                        }
                    }
                    if let Some(fc) = choice.delta.function_call {
                        let event = StreamEvent::ToolCallDelta {
                            name: fc.name,
                            arguments: fc.arguments,
                        };
                        if tx.send(Ok(event)).is_err() {
                            return;
                        }
                    }
                }
            }
            // Connection closed without [DONE]; the drop of tx ends the turn.
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_legacy_functions_field() {
        let request = ChatRequest {
            model: "gpt-4".into(),
            messages: vec![Message::system("sys"), Message::user("hi")],
            stream: true,
            functions: Some(vec![ToolDefinition {
                name: "current_time".into(),
                description: "clock".into(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }]),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["functions"][0]["name"], "current_time");
    }

    #[test]
    fn request_omits_functions_when_none() {
        let request = ChatRequest {
            model: "gpt-4".into(),
            messages: vec![Message::user("hi")],
            stream: true,
            functions: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("functions").is_none());
    }

    #[test]
    fn delta_parses_text_and_function_call_fragments() {
        let data = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.choices[0].delta.content.as_deref(), Some("Hel"));

        let data = r#"{"choices":[{"delta":{"function_call":{"name":"fetch_","arguments":null}}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(data).unwrap();
        let fc = parsed.choices[0].delta.function_call.as_ref().unwrap();
        assert_eq!(fc.name.as_deref(), Some("fetch_"));
        assert!(fc.arguments.is_none());
    }
}
