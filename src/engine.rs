//! Conversation engine for nicechat.
//!
//! Owns the ordered history, drives one provider adapter, feeds the
//! accumulator output into history, and on a tool-call turn dispatches to
//! the plugin registry and feeds the result back, looping into another
//! provider call without waiting for user input. Strictly turn-sequential:
//! one outstanding provider call, one tool execution at a time.

use crate::error::ChatError;
use crate::message::Message;
use crate::output::Renderer;
use crate::plugins::{PluginRegistry, Toolkit};
use crate::provider::ProviderAdapter;
use crate::stream::{FinalizedTurn, StreamAccumulator, StreamEvent};

/// Orchestrates one chat session against a single provider adapter.
pub struct ConversationEngine {
    adapter: Box<dyn ProviderAdapter>,
    plugins: PluginRegistry,
    history: Vec<Message>,
    debug: bool,
}

impl ConversationEngine {
    /// Creates an engine with history seeded with the single system turn.
    pub fn new(
        adapter: Box<dyn ProviderAdapter>,
        plugins: PluginRegistry,
        system_prompt: &str,
        debug: bool,
    ) -> Self {
        Self {
            adapter,
            plugins,
            history: vec![Message::system(system_prompt)],
            debug,
        }
    }

    /// The append-only conversation history.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Appends the user's next turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.history.push(Message::user(text));
    }

    /// Drives provider calls until the model produces a plain reply.
    ///
    /// Each iteration streams one turn through a fresh accumulator,
    /// rendering text deltas as they arrive. A tool-call turn dispatches
    /// the plugin and loops back with the result in history; a plain-text
    /// turn ends the exchange. An unregistered tool aborts the session; a
    /// plugin's own failure becomes a tool-result turn the model can see.
    pub async fn run_exchange(&mut self, renderer: &mut dyn Renderer) -> Result<(), ChatError> {
        loop {
            let definitions = if self.adapter.supports_tools() {
                self.plugins.definitions()
            } else {
                Vec::new()
            };

            let mut events = self.adapter.send_turn(&self.history, &definitions).await?;
            let mut accumulator = StreamAccumulator::new();

            // The channel delivers events FIFO and closes on end-of-turn.
            while let Some(event) = events.recv().await {
                let event = event?;
                if let StreamEvent::TextDelta(token) = &event {
                    renderer.render_token(token);
                }
                accumulator.push(&event)?;
            }

            match accumulator.finish() {
                FinalizedTurn::Text(text) => {
                    self.history.push(Message::assistant(text));
                    renderer.render_done();
                    return Ok(());
                }
                FinalizedTurn::ToolCall(invocation) => {
                    renderer.tool_call(&invocation.name, &invocation.arguments_raw);
                    self.history.push(Message::tool_call(invocation.clone()));

                    let toolkit = Toolkit::new(&invocation.name, self.debug);
                    let result = self
                        .plugins
                        .execute(&invocation.name, &invocation.arguments_raw, &toolkit)
                        .await;
                    let content = match result {
                        Ok(output) => output,
                        Err(ChatError::PluginExecution { name, source }) => {
                            // Recoverable: the model sees the failure and
                            // can route around it.
                            format!("Error executing {name}: {source:#}")
                        }
                        Err(fatal) => return Err(fatal),
                    };
                    self.history
                        .push(Message::tool_result(&invocation.name, content));
                    // A tool result immediately triggers another provider
                    // call; no user input in between.
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::plugins::{Plugin, ToolDefinition};
    use crate::provider::EventStream;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    /// Adapter that replays scripted turns and records what it was sent.
    struct ScriptedAdapter {
        supports_tools: bool,
        turns: Mutex<VecDeque<Vec<Result<StreamEvent, ChatError>>>>,
        /// (history len, tools len) per call, shared with the test body.
        seen: Arc<Mutex<Vec<(usize, usize)>>>,
    }

    impl ScriptedAdapter {
        fn new(supports_tools: bool, turns: Vec<Vec<Result<StreamEvent, ChatError>>>) -> Self {
            Self {
                supports_tools,
                turns: Mutex::new(turns.into()),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ProviderAdapter for ScriptedAdapter {
        fn supports_tools(&self) -> bool {
            self.supports_tools
        }

        async fn send_turn(
            &self,
            history: &[Message],
            tools: &[ToolDefinition],
        ) -> Result<EventStream, ChatError> {
            self.seen.lock().unwrap().push((history.len(), tools.len()));
            let turn = self
                .turns
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted");
            let (tx, rx) = mpsc::unbounded_channel();
            for event in turn {
                tx.send(event).unwrap();
            }
            Ok(rx)
        }
    }

    /// Renderer that captures everything instead of printing.
    #[derive(Default)]
    struct TestRenderer {
        tokens: Vec<String>,
        tool_calls: Vec<String>,
        done: usize,
    }

    impl Renderer for TestRenderer {
        fn render_token(&mut self, token: &str) {
            self.tokens.push(token.to_string());
        }
        fn tool_call(&mut self, name: &str, _arguments_raw: &str) {
            self.tool_calls.push(name.to_string());
        }
        fn render_done(&mut self) {
            self.done += 1;
        }
    }

    struct EchoPlugin {
        fail: bool,
    }

    #[async_trait]
    impl Plugin for EchoPlugin {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its arguments"
        }
        fn parameters(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, arguments_raw: &str, _toolkit: &Toolkit) -> anyhow::Result<String> {
            if self.fail {
                Err(anyhow!("malformed arguments"))
            } else {
                Ok(format!("echo: {arguments_raw}"))
            }
        }
    }

    fn text(s: &str) -> Result<StreamEvent, ChatError> {
        Ok(StreamEvent::TextDelta(s.to_string()))
    }

    fn tool(name: Option<&str>, args: Option<&str>) -> Result<StreamEvent, ChatError> {
        Ok(StreamEvent::ToolCallDelta {
            name: name.map(String::from),
            arguments: args.map(String::from),
        })
    }

    fn registry_with_echo(fail: bool) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(EchoPlugin { fail }));
        registry
    }

    #[tokio::test]
    async fn plain_reply_appends_one_assistant_turn() {
        let adapter = ScriptedAdapter::new(true, vec![vec![text("Hel"), text("lo")]]);
        let mut engine =
            ConversationEngine::new(Box::new(adapter), registry_with_echo(false), "sys", false);
        engine.push_user("hi");

        let mut renderer = TestRenderer::default();
        engine.run_exchange(&mut renderer).await.unwrap();

        let history = engine.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::System);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[2].role, Role::Assistant);
        assert_eq!(history[2].text(), "Hello");
        // Tokens reach the renderer in delivery order, before finalization.
        assert_eq!(renderer.tokens, ["Hel", "lo"]);
        assert_eq!(renderer.done, 1);
    }

    #[tokio::test]
    async fn tool_call_dispatches_and_loops_into_second_provider_call() {
        let adapter = ScriptedAdapter::new(
            true,
            vec![
                vec![
                    tool(Some("ec"), None),
                    tool(Some("ho"), Some(r#"{"x":"#)),
                    tool(None, Some("1}")),
                ],
                vec![text("done")],
            ],
        );
        let mut engine =
            ConversationEngine::new(Box::new(adapter), registry_with_echo(false), "sys", false);
        engine.push_user("use the tool");

        let mut renderer = TestRenderer::default();
        engine.run_exchange(&mut renderer).await.unwrap();

        let history = engine.history();
        assert_eq!(history.len(), 5);
        // assistant tool-call turn: content null, invocation reassembled.
        assert_eq!(history[2].role, Role::Assistant);
        assert!(history[2].content.is_none());
        let invocation = history[2].tool_call.as_ref().unwrap();
        assert_eq!(invocation.name, "echo");
        assert_eq!(invocation.arguments_raw, r#"{"x":1}"#);
        // tool result directly follows the call it answers.
        assert_eq!(history[3].role, Role::Function);
        assert_eq!(history[3].name.as_deref(), Some("echo"));
        assert_eq!(history[3].text(), r#"echo: {"x":1}"#);
        assert_eq!(history[4].text(), "done");
        assert_eq!(renderer.tool_calls, ["echo"]);
    }

    #[tokio::test]
    async fn second_call_sees_the_tool_result_in_history() {
        let adapter = ScriptedAdapter::new(
            true,
            vec![
                vec![tool(Some("echo"), Some("{}"))],
                vec![text("ok")],
            ],
        );
        let seen = Arc::clone(&adapter.seen);
        let mut engine =
            ConversationEngine::new(Box::new(adapter), registry_with_echo(false), "sys", false);
        engine.push_user("go");
        engine.run_exchange(&mut TestRenderer::default()).await.unwrap();

        // First call: [system, user]; second: + assistant tool-call + result.
        assert_eq!(*seen.lock().unwrap(), [(2, 1), (4, 1)]);
    }

    #[tokio::test]
    async fn unregistered_tool_aborts_without_a_result_turn() {
        let adapter = ScriptedAdapter::new(
            true,
            vec![vec![tool(Some("does_not_exist"), Some("{}"))]],
        );
        let mut engine =
            ConversationEngine::new(Box::new(adapter), registry_with_echo(false), "sys", false);
        engine.push_user("go");

        let err = engine
            .run_exchange(&mut TestRenderer::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::UnregisteredTool(name) if name == "does_not_exist"));

        // The assistant tool-call turn is in history, but no tool result.
        let history = engine.history();
        assert_eq!(history.last().unwrap().role, Role::Assistant);
        assert!(history.iter().all(|m| m.role != Role::Function));
    }

    #[tokio::test]
    async fn plugin_failure_becomes_a_result_turn_and_continues() {
        let adapter = ScriptedAdapter::new(
            true,
            vec![
                vec![tool(Some("echo"), Some("{not json"))],
                vec![text("recovered")],
            ],
        );
        let mut engine =
            ConversationEngine::new(Box::new(adapter), registry_with_echo(true), "sys", false);
        engine.push_user("go");

        engine
            .run_exchange(&mut TestRenderer::default())
            .await
            .unwrap();

        let history = engine.history();
        assert_eq!(history[3].role, Role::Function);
        assert!(history[3].text().contains("Error executing echo"));
        assert_eq!(history[4].text(), "recovered");
    }

    #[tokio::test]
    async fn non_tool_vendor_gets_no_advertisement() {
        let adapter = ScriptedAdapter::new(false, vec![vec![text("hi")]]);
        let seen = Arc::clone(&adapter.seen);
        let mut engine =
            ConversationEngine::new(Box::new(adapter), registry_with_echo(false), "sys", false);
        engine.push_user("hello");
        engine.run_exchange(&mut TestRenderer::default()).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), [(2, 0)]);
    }

    #[tokio::test]
    async fn in_band_adapter_error_is_fatal() {
        let adapter = ScriptedAdapter::new(
            true,
            vec![vec![text("par"), Err(ChatError::adapter("connection reset"))]],
        );
        let mut engine =
            ConversationEngine::new(Box::new(adapter), registry_with_echo(false), "sys", false);
        engine.push_user("hi");

        let err = engine
            .run_exchange(&mut TestRenderer::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Adapter { .. }));
    }

    #[tokio::test]
    async fn mixed_channels_surface_as_protocol_violation() {
        let adapter = ScriptedAdapter::new(
            true,
            vec![vec![text("hi"), tool(Some("echo"), None)]],
        );
        let mut engine =
            ConversationEngine::new(Box::new(adapter), registry_with_echo(false), "sys", false);
        engine.push_user("hi");

        let err = engine
            .run_exchange(&mut TestRenderer::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::ProtocolViolation));
    }
}
