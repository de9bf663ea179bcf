//! Message types for nicechat's conversation history.
//!
//! Provides a structured [`Message`] type with a [`Role`] enum representing
//! conversation turns. The serde attributes match the OpenAI-compatible
//! wire format (legacy `functions` API), so the OpenAI adapter serializes
//! history verbatim; the Anthropic and Replicate adapters translate.

use serde::{Deserialize, Serialize};

/// A tool invocation requested by the model.
///
/// Assembled incrementally from stream fragments; `arguments_raw` is the
/// concatenated raw argument text, expected to parse as JSON once the turn
/// ends. Parsing is deferred to the plugin so malformed arguments surface
/// as an execution failure, not an assembly failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Name of the tool to invoke.
    pub name: String,
    /// Raw JSON argument text, unparsed.
    #[serde(rename = "arguments")]
    pub arguments_raw: String,
}

/// A single turn in a conversation.
///
/// History is append-only; the first element is always the single system
/// turn created at session start. A `Function` turn directly follows the
/// assistant tool-call turn it answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    /// Present on assistant turns that are tool calls.
    #[serde(
        default,
        rename = "function_call",
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_call: Option<ToolInvocation>,
    /// Tool name on `Function` (tool-result) turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// A tool result fed back to the model.
    Function,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(text.into()),
            tool_call: None,
            name: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(text.into()),
            tool_call: None,
            name: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(text.into()),
            tool_call: None,
            name: None,
        }
    }

    /// An assistant turn carrying a tool invocation (content null).
    pub fn tool_call(invocation: ToolInvocation) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            tool_call: Some(invocation),
            name: None,
        }
    }

    /// A tool result associated with the named tool.
    pub fn tool_result(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: Some(content.into()),
            tool_call: None,
            name: Some(name.into()),
        }
    }

    /// The turn's text, or empty for content-less tool-call turns.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_tool_call_serializes_with_null_content() {
        let msg = Message::tool_call(ToolInvocation {
            name: "fetch_website".into(),
            arguments_raw: r#"{"url":"http://x.io"}"#.into(),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json["content"].is_null());
        assert_eq!(json["function_call"]["name"], "fetch_website");
        assert_eq!(json["function_call"]["arguments"], r#"{"url":"http://x.io"}"#);
    }

    #[test]
    fn tool_result_serializes_with_function_role_and_name() {
        let msg = Message::tool_result("current_time", "It is noon");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "function");
        assert_eq!(json["name"], "current_time");
        assert_eq!(json["content"], "It is noon");
        assert!(json.get("function_call").is_none());
    }

    #[test]
    fn plain_turns_omit_tool_fields() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");
        assert!(json.get("name").is_none());
        assert!(json.get("function_call").is_none());
    }
}
