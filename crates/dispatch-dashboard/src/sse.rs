//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes are fed as they arrive from the network; chunk boundaries may
//! fall anywhere, including inside a UTF-8 sequence or between `\r` and
//! `\n`. Complete lines are interpreted per the server-sent events
//! format and yield [`SseFrame`]s.

use tracing::debug;

/// One decoded item from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// The data of a default (`message`) event, lines joined with `\n`.
    Message(String),
    /// A comment line, without the leading `:` and optional space.
    Comment(String),
}

/// Stateful event-stream decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
    event: Option<String>,
    last_event_id: Option<String>,
}

impl SseDecoder {
    /// Create a decoder with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes and return every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=end).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// The most recent `id:` field seen, if any.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if let Some(comment) = line.strip_prefix(':') {
            let comment = comment.strip_prefix(' ').unwrap_or(comment);
            return Some(SseFrame::Comment(comment.to_owned()));
        }

        let (field, value) = line
            .split_once(':')
            .map_or((line, ""), |(f, v)| (f, v.strip_prefix(' ').unwrap_or(v)));
        match field {
            "data" => self.data.push(value.to_owned()),
            "event" => self.event = Some(value.to_owned()),
            "id" => self.last_event_id = Some(value.to_owned()),
            other => debug!(field = other, "ignoring event-stream field"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = self.data.join("\n");
        self.data.clear();

        match event.as_deref() {
            None | Some("" | "message") => Some(SseFrame::Message(data)),
            Some(name) => {
                debug!(event = name, "ignoring named event");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_relay_framing() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b": connected\n\ndata: {\"type\":\"fire\"}\n\n");
        assert_eq!(
            frames,
            vec![
                SseFrame::Comment("connected".to_owned()),
                SseFrame::Message("{\"type\":\"fire\"}".to_owned()),
            ]
        );
    }

    #[test]
    fn frames_may_span_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"da").is_empty());
        assert!(decoder.feed(b"ta: {\"a\"").is_empty());
        assert!(decoder.feed(b":1}\n").is_empty());
        assert_eq!(
            decoder.feed(b"\n"),
            vec![SseFrame::Message("{\"a\":1}".to_owned())]
        );
    }

    #[test]
    fn utf8_split_across_chunks_survives() {
        let payload = "data: Café\n\n".as_bytes();
        let (head, tail) = payload.split_at(10);
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(head).is_empty());
        assert_eq!(decoder.feed(tail), vec![SseFrame::Message("Café".to_owned())]);
    }

    #[test]
    fn crlf_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: one\r\ndata: two\r\n\r\n");
        assert_eq!(frames, vec![SseFrame::Message("one\ntwo".to_owned())]);
    }

    #[test]
    fn keep_alive_comment_and_blank_lines_are_harmless() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b":\n\n\n\n");
        assert_eq!(frames, vec![SseFrame::Comment(String::new())]);
    }

    #[test]
    fn named_events_are_skipped_but_id_is_tracked() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"event: ping\ndata: x\nid: 7\n\ndata: y\n\n");
        assert_eq!(frames, vec![SseFrame::Message("y".to_owned())]);
        assert_eq!(decoder.last_event_id(), Some("7"));
    }
}
