//! Minimal server-sent-events scanning shared by the adapters.
//!
//! Network chunks do not align with event boundaries, so bytes are
//! buffered until a full line is available. Data payloads are kept
//! byte-exact: the JSON dialects would not care, but the raw-text
//! Replicate dialect carries significant whitespace, so only the line
//! terminator (and at most one space after a field name) is stripped.

use memchr::memchr;

/// Accumulates response bytes and yields complete lines.
#[derive(Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a network chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Pops the next complete line, if one is buffered.
    ///
    /// The terminating `\n` (and a `\r` before it) is removed; nothing
    /// else is trimmed. Invalid UTF-8 lines are discarded; a later line
    /// resynchronizes the scanner.
    pub fn next_line(&mut self) -> Option<String> {
        while let Some(newline_pos) = memchr(b'\n', &self.buffer) {
            let mut end = newline_pos;
            if end > 0 && self.buffer[end - 1] == b'\r' {
                end -= 1;
            }
            let line = std::str::from_utf8(&self.buffer[..end])
                .ok()
                .map(str::to_string);
            self.buffer.drain(..=newline_pos);
            if let Some(line) = line {
                return Some(line);
            }
        }
        None
    }
}

/// A parsed SSE line.
pub enum SseLine {
    /// `event: <name>`
    Event(String),
    /// `data: <payload>`, payload preserved exactly past one optional
    /// space after the colon.
    Data(String),
    /// Comments, `id:`/`retry:` fields.
    Other,
}

/// Classifies one line of an SSE stream.
pub fn parse_line(line: &str) -> SseLine {
    if let Some(rest) = line.strip_prefix("data:") {
        SseLine::Data(rest.strip_prefix(' ').unwrap_or(rest).to_string())
    } else if let Some(rest) = line.strip_prefix("event:") {
        let name = rest.strip_prefix(' ').unwrap_or(rest);
        SseLine::Event(name.trim_end().to_string())
    } else {
        SseLine::Other
    }
}

/// One dispatched SSE event: its name and the joined data payload.
pub struct SseEvent {
    pub name: String,
    pub data: String,
}

/// Assembles whole events for dialects that spread a payload over
/// multiple `data:` lines.
///
/// Per the SSE framing rules, an event is dispatched at the blank line
/// and its `data:` lines are joined with `\n`. A payload that is itself
/// a newline therefore arrives as two empty `data:` lines and must not
/// be dropped.
#[derive(Default)]
pub struct SseEventBuffer {
    lines: SseLineBuffer,
    name: String,
    data: String,
    has_data: bool,
}

impl SseEventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a network chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.lines.push(chunk);
    }

    /// Pops the next fully framed event, if one is buffered.
    pub fn next_event(&mut self) -> Option<SseEvent> {
        while let Some(line) = self.lines.next_line() {
            if line.is_empty() {
                if self.name.is_empty() && !self.has_data {
                    continue;
                }
                self.has_data = false;
                return Some(SseEvent {
                    name: std::mem::take(&mut self.name),
                    data: std::mem::take(&mut self.data),
                });
            }
            match parse_line(&line) {
                SseLine::Event(name) => self.name = name,
                SseLine::Data(payload) => {
                    if self.has_data {
                        self.data.push('\n');
                    }
                    self.data.push_str(&payload);
                    self.has_data = true;
                }
                SseLine::Other => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_lines_across_chunk_boundaries() {
        let mut buf = SseLineBuffer::new();
        buf.push(b"data: hel");
        assert!(buf.next_line().is_none());
        buf.push(b"lo\r\ndata: world\n");
        assert_eq!(buf.next_line().unwrap(), "data: hello");
        assert_eq!(buf.next_line().unwrap(), "data: world");
        assert!(buf.next_line().is_none());
    }

    #[test]
    fn classifies_event_and_data_lines() {
        assert!(matches!(parse_line("event: output"), SseLine::Event(e) if e == "output"));
        assert!(matches!(parse_line("data: {\"a\":1}"), SseLine::Data(d) if d == "{\"a\":1}"));
        assert!(matches!(parse_line(""), SseLine::Other));
        assert!(matches!(parse_line(": keepalive"), SseLine::Other));
    }

    #[test]
    fn data_payloads_keep_whitespace_past_one_space() {
        assert!(matches!(parse_line("data: Hello "), SseLine::Data(d) if d == "Hello "));
        assert!(matches!(parse_line("data:  indented"), SseLine::Data(d) if d == " indented"));
        assert!(matches!(parse_line("data: "), SseLine::Data(d) if d.is_empty()));
        assert!(matches!(parse_line("data:"), SseLine::Data(d) if d.is_empty()));
    }

    #[test]
    fn events_join_multi_line_data_with_newlines() {
        let mut buf = SseEventBuffer::new();
        buf.push(b"event: output\ndata: line one\ndata: line two\n\n");
        let event = buf.next_event().unwrap();
        assert_eq!(event.name, "output");
        assert_eq!(event.data, "line one\nline two");
        assert!(buf.next_event().is_none());
    }

    #[test]
    fn whitespace_only_tokens_survive_reassembly() {
        // Tokens "Hello ", "\n", "world": the middle one frames as two
        // empty data lines and the first keeps its trailing space.
        let mut buf = SseEventBuffer::new();
        buf.push(b"event: output\ndata: Hello \n\n");
        buf.push(b"event: output\ndata: \ndata: \n\n");
        buf.push(b"event: output\ndata: world\n\nevent: done\ndata: {}\n\n");

        let mut text = String::new();
        let mut names = Vec::new();
        while let Some(event) = buf.next_event() {
            if event.name == "output" {
                text.push_str(&event.data);
            }
            names.push(event.name);
        }
        assert_eq!(text, "Hello \nworld");
        assert_eq!(names, ["output", "output", "output", "done"]);
    }
}
