//! Incremental decoder for the SSE-framed push channel.
//!
//! The backend delivers one JSON frame per event in `data:` lines. The
//! decoder is transport-agnostic: feed it raw byte chunks as they arrive
//! and collect completed event payloads.

use std::mem;

/// Accumulates byte chunks into complete SSE event payloads.
///
/// Chunk boundaries carry no meaning: a single event may span several
/// chunks and one chunk may complete several events.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes of the current, not-yet-terminated line.
    partial: Vec<u8>,
    /// `data:` lines of the event currently being assembled.
    data: Vec<String>,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk and return any completed event payloads.
    ///
    /// Multi-line `data:` fields are joined with `\n` per the SSE spec.
    /// Comment lines and non-`data` fields (`event:`, `id:`, `retry:`)
    /// are consumed without affecting the payload.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut events = Vec::new();
        for byte in chunk {
            if *byte != b'\n' {
                self.partial.push(*byte);
                continue;
            }
            let line_bytes = mem::take(&mut self.partial);
            let mut line = String::from_utf8_lossy(&line_bytes).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Some(payload) = self.consume_line(&line) {
                events.push(payload);
            }
        }
        events
    }

    /// Process one complete line; a blank line dispatches the event.
    fn consume_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            return Some(mem::take(&mut self.data).join("\n"));
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::SseDecoder;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: {\"type\":\"ping\"}\n\n");
        assert_eq!(events, vec!["{\"type\":\"ping\"}".to_string()]);
    }

    #[test]
    fn reassembles_events_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.feed(b"data: {\"type\":"), Vec::<String>::new());
        assert_eq!(decoder.feed(b"\"ping\"}\n"), Vec::<String>::new());
        let events = decoder.feed(b"\n");
        assert_eq!(events, vec!["{\"type\":\"ping\"}".to_string()]);
    }

    #[test]
    fn joins_multi_line_data_fields() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: first\ndata: second\n\n");
        assert_eq!(events, vec!["first\nsecond".to_string()]);
    }

    #[test]
    fn skips_comments_and_non_data_fields() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b": keep-alive\nevent: notification\nid: 42\nretry: 5000\ndata: payload\n\n");
        assert_eq!(events, vec!["payload".to_string()]);
    }

    #[test]
    fn blank_lines_without_data_are_ignored() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.feed(b"\n\n\n"), Vec::<String>::new());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: payload\r\n\r\n");
        assert_eq!(events, vec!["payload".to_string()]);
    }

    #[test]
    fn one_chunk_can_complete_multiple_events() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: one\n\ndata: two\n\n");
        assert_eq!(events, vec!["one".to_string(), "two".to_string()]);
    }
}
