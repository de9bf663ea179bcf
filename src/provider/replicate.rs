//! Replicate streaming adapter.
//!
//! Two-step protocol: create a prediction with `stream: true`, then follow
//! the SSE URL the prediction hands back. `output` events carry text
//! fragments; `done` ends the turn. This adapter does not participate in
//! tool-calling. The conversation is flattened into one instruction-tagged
//! prompt because the model endpoints here are plain text completers.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;

use crate::constants::{MAX_TOKENS, REPLICATE_BASE_URL};
use crate::error::ChatError;
use crate::message::{Message, Role};
use crate::plugins::ToolDefinition;
use crate::stream::StreamEvent;

use super::sse::SseEventBuffer;
use super::{EventStream, ProviderAdapter};

/// Adapter for Replicate prediction streaming.
pub struct ReplicateAdapter {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct PredictionResponse {
    urls: PredictionUrls,
}

#[derive(Deserialize)]
struct PredictionUrls {
    stream: Option<String>,
}

impl ReplicateAdapter {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

/// Flattens user/assistant turns into a single `[INST]`-tagged prompt.
fn build_prompt(history: &[Message]) -> String {
    history
        .iter()
        .filter_map(|m| match m.role {
            Role::User => Some(format!("[INST] {} [/INST]", m.text())),
            Role::Assistant => Some(m.text().to_string()),
            Role::System | Role::Function => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_input(prompt: String, system: Option<&str>) -> serde_json::Value {
    json!({
        "top_k": 10,
        "top_p": 0.95,
        "prompt": prompt,
        "max_tokens": MAX_TOKENS,
        "temperature": 0.8,
        "system_prompt": system.unwrap_or_default(),
        "repeat_penalty": 1.1,
        "presence_penalty": 0,
        "frequency_penalty": 0,
    })
}

#[async_trait]
impl ProviderAdapter for ReplicateAdapter {
    fn supports_tools(&self) -> bool {
        false
    }

    async fn send_turn(
        &self,
        history: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<EventStream, ChatError> {
        let system = history
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.text().to_string());
        let body = json!({
            "stream": true,
            "input": build_input(build_prompt(history), system.as_deref()),
        });

        let create_url = format!(
            "{REPLICATE_BASE_URL}/v1/models/{}/predictions",
            self.model
        );
        let client = self.client.clone();
        let api_key = self.api_key.clone();

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            // Step 1: create the prediction and learn its stream URL.
            let response = client
                .post(&create_url)
                .bearer_auth(&api_key)
                .header("Content-Type", "application/json")
                .json(&body)
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

            let prediction: PredictionResponse = match response.json().await {
                Ok(p) => p,
                Err(e) => {
                    let _ = tx.send(Err(ChatError::adapter(e.to_string())));
                    return;
                }
            };
            let Some(stream_url) = prediction.urls.stream else {
                let _ = tx.send(Err(ChatError::adapter(
                    "prediction did not offer a stream URL",
                )));
                return;
            };

            // Step 2: follow the SSE stream until `done`.
            let response = client
                .get(&stream_url)
                .bearer_auth(&api_key)
                .header("Accept", "text/event-stream")
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    let _ = tx.send(Err(ChatError::adapter(e.to_string())));
                    return;
                }
            };

            // The output tokens are raw text with significant whitespace,
            // so whole events are assembled before dispatch.
            let mut bytes = response.bytes_stream();
            let mut events = SseEventBuffer::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(Err(ChatError::adapter(e.to_string())));
                        return;
                    }
                };
                events.push(&chunk);

                while let Some(event) = events.next_event() {
                    match event.name.as_str() {
                        "output" => {
                            if tx.send(Ok(StreamEvent::TextDelta(event.data))).is_err() {
                                return;
                            }
                        }
                        "done" => return,
                        "error" => {
                            let _ = tx.send(Err(ChatError::adapter(event.data)));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_wraps_user_turns_in_inst_tags() {
        let history = vec![
            Message::system("be brief"),
            Message::user("hi"),
            Message::assistant("hello"),
            Message::user("bye"),
        ];
        assert_eq!(
            build_prompt(&history),
            "[INST] hi [/INST]\nhello\n[INST] bye [/INST]"
        );
    }

    #[test]
    fn input_carries_sampling_parameters_and_system_prompt() {
        let input = build_input("p".into(), Some("sys"));
        assert_eq!(input["prompt"], "p");
        assert_eq!(input["system_prompt"], "sys");
        assert_eq!(input["top_k"], 10);
        assert_eq!(input["temperature"], 0.8);
    }
}
