//! Stream event normalization and per-turn reassembly.
//!
//! Providers deliver a response as partial chunks with no guarantee that a
//! chunk boundary aligns with any semantic boundary; a JSON argument string
//! can be split anywhere, even mid-token. [`StreamAccumulator`] buffers one
//! turn's events in arrival order and only decides on stream end whether
//! the turn was a plain reply or a tool call. FIFO delivery from the
//! adapter into the accumulator is load-bearing: dropping or reordering a
//! fragment corrupts the call silently.

use crate::error::ChatError;
use crate::message::ToolInvocation;

/// One normalized unit from a provider adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of assistant text.
    TextDelta(String),
    /// A fragment of a tool invocation. Either field may be absent;
    /// fragments concatenate per channel in arrival order.
    ToolCallDelta {
        name: Option<String>,
        arguments: Option<String>,
    },
}

/// The outcome of one fully consumed turn stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizedTurn {
    /// A plain assistant reply.
    Text(String),
    /// A tool call, arguments still raw and unparsed.
    ToolCall(ToolInvocation),
}

/// Which channel the accumulator has committed to for this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Text,
    Tool,
}

/// Reassembles one turn's event sequence into a [`FinalizedTurn`].
///
/// The first non-empty event commits the turn to text or tool mode; a
/// later non-empty event on the other channel is a
/// [`ChatError::ProtocolViolation`]. Buffers are never parsed here;
/// malformed tool arguments surface later, at plugin dispatch.
#[derive(Debug)]
pub struct StreamAccumulator {
    mode: Mode,
    text: String,
    tool_name: String,
    tool_arguments: String,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self {
            mode: Mode::Idle,
            text: String::new(),
            tool_name: String::new(),
            tool_arguments: String::new(),
        }
    }

    /// Feeds the next event, in delivery order.
    pub fn push(&mut self, event: &StreamEvent) -> Result<(), ChatError> {
        match event {
            StreamEvent::TextDelta(fragment) => {
                if fragment.is_empty() {
                    return Ok(());
                }
                match self.mode {
                    Mode::Tool => Err(ChatError::ProtocolViolation),
                    Mode::Idle | Mode::Text => {
                        self.mode = Mode::Text;
                        self.text.push_str(fragment);
                        Ok(())
                    }
                }
            }
            StreamEvent::ToolCallDelta { name, arguments } => {
                let name = name.as_deref().unwrap_or_default();
                let arguments = arguments.as_deref().unwrap_or_default();
                if name.is_empty() && arguments.is_empty() {
                    return Ok(());
                }
                match self.mode {
                    Mode::Text => Err(ChatError::ProtocolViolation),
                    Mode::Idle | Mode::Tool => {
                        self.mode = Mode::Tool;
                        self.tool_name.push_str(name);
                        self.tool_arguments.push_str(arguments);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Finalizes the turn once the stream has ended.
    ///
    /// An empty stream finalizes to empty text.
    pub fn finish(self) -> FinalizedTurn {
        match self.mode {
            Mode::Idle | Mode::Text => FinalizedTurn::Text(self.text),
            Mode::Tool => FinalizedTurn::ToolCall(ToolInvocation {
                name: self.tool_name,
                arguments_raw: self.tool_arguments,
            }),
        }
    }
}

impl Default for StreamAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> StreamEvent {
        StreamEvent::TextDelta(s.to_string())
    }

    fn tool(name: Option<&str>, args: Option<&str>) -> StreamEvent {
        StreamEvent::ToolCallDelta {
            name: name.map(String::from),
            arguments: args.map(String::from),
        }
    }

    fn run(events: &[StreamEvent]) -> FinalizedTurn {
        let mut acc = StreamAccumulator::new();
        for ev in events {
            acc.push(ev).unwrap();
        }
        acc.finish()
    }

    #[test]
    fn concatenates_text_deltas_in_delivery_order() {
        let result = run(&[text("Hel"), text("lo")]);
        assert_eq!(result, FinalizedTurn::Text("Hello".into()));
    }

    #[test]
    fn preserves_order_across_many_fragments() {
        let fragments = ["a", "b", "c", "d", "e"];
        let events: Vec<_> = fragments.iter().map(|f| text(f)).collect();
        assert_eq!(run(&events), FinalizedTurn::Text("abcde".into()));
    }

    #[test]
    fn reassembles_tool_call_split_mid_json() {
        let result = run(&[
            tool(Some("fetch_"), None),
            tool(Some("website"), Some(r#"{"url":"http"#)),
            tool(None, Some(r#"://x.io"}"#)),
        ]);
        assert_eq!(
            result,
            FinalizedTurn::ToolCall(ToolInvocation {
                name: "fetch_website".into(),
                arguments_raw: r#"{"url":"http://x.io"}"#.into(),
            })
        );
        // The reassembled buffer parses as JSON once complete.
        if let FinalizedTurn::ToolCall(inv) = run(&[
            tool(Some("fetch_website"), Some(r#"{"url":"http"#)),
            tool(None, Some(r#"://x.io"}"#)),
        ]) {
            let parsed: serde_json::Value = serde_json::from_str(&inv.arguments_raw).unwrap();
            assert_eq!(parsed["url"], "http://x.io");
        }
    }

    #[test]
    fn name_and_argument_channels_interleave_independently() {
        let result = run(&[
            tool(Some("n1"), Some("g1")),
            tool(None, Some("g2")),
            tool(Some("n2"), None),
            tool(None, Some("g3")),
        ]);
        assert_eq!(
            result,
            FinalizedTurn::ToolCall(ToolInvocation {
                name: "n1n2".into(),
                arguments_raw: "g1g2g3".into(),
            })
        );
    }

    #[test]
    fn replay_of_same_sequence_is_idempotent() {
        let events = [text("one "), text("two "), text("three")];
        assert_eq!(run(&events), run(&events));

        let tool_events = [tool(Some("clock"), None), tool(None, Some("{}"))];
        assert_eq!(run(&tool_events), run(&tool_events));
    }

    #[test]
    fn empty_stream_finalizes_to_empty_text() {
        assert_eq!(run(&[]), FinalizedTurn::Text(String::new()));
    }

    #[test]
    fn empty_fragments_do_not_commit_a_mode() {
        // An empty text delta followed by a tool call is fine: only
        // non-empty fragments commit the channel.
        let result = run(&[text(""), tool(None, None), tool(Some("clock"), Some("{}"))]);
        assert_eq!(
            result,
            FinalizedTurn::ToolCall(ToolInvocation {
                name: "clock".into(),
                arguments_raw: "{}".into(),
            })
        );
    }

    #[test]
    fn mixing_channels_is_a_protocol_violation() {
        let mut acc = StreamAccumulator::new();
        acc.push(&text("hello")).unwrap();
        let err = acc.push(&tool(Some("clock"), None)).unwrap_err();
        assert!(matches!(err, ChatError::ProtocolViolation));

        let mut acc = StreamAccumulator::new();
        acc.push(&tool(Some("clock"), None)).unwrap();
        let err = acc.push(&text("hello")).unwrap_err();
        assert!(matches!(err, ChatError::ProtocolViolation));
    }
}
