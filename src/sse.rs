//! Incremental Server-Sent-Events decoding for chat completion streams
//!
//! The inference endpoint answers a streamed chat request with a
//! `text/event-stream` body: events separated by a blank line, each carrying
//! one or more `data:` lines, closed by the reserved `data: [DONE]` payload.
//! [`SseDecoder`] consumes that body chunk by chunk, in whatever pieces the
//! transport delivers them, and yields the text fragments a caller appends
//! to the assistant's reply.
//!
//! One decoder instance serves exactly one response stream. Feed raw bytes
//! with [`SseDecoder::feed`] as they arrive; call [`SseDecoder::finish`]
//! when the body ends so a trailing unterminated event is still delivered.
//!
//! Bytes are buffered and only complete events are converted to text, so a
//! multi-byte UTF-8 character split across chunk boundaries is reassembled
//! before decoding. The event boundary itself is ASCII and cannot fall
//! inside a multi-byte sequence.

use tracing::warn;

use crate::api::ChatChunk;

/// Reserved payload literal marking normal end of stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Field marker of an SSE data line
const DATA_MARKER: &str = "data:";

/// Incremental decoder for one chat completion event stream
///
/// Two states: streaming and finished. The transition is one-way and is
/// triggered by the `[DONE]` sentinel, an upstream error payload, or
/// [`finish`](Self::finish). Once finished, remaining input is discarded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes received but not yet resolved into a complete event
    buf: Vec<u8>,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the stream has terminated; no further fragments will be produced
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume a chunk of the response body
    ///
    /// Returns the fragments produced by every event completed by this
    /// chunk, in arrival order. A trailing partial event stays buffered
    /// until a later chunk closes it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut fragments = Vec::new();
        if self.finished {
            return fragments;
        }
        self.buf.extend_from_slice(chunk);
        self.drain_events(&mut fragments, false);
        fragments
    }

    /// Signal end of input
    ///
    /// Whatever remains buffered is treated as if closed by a trailing
    /// event boundary, then the decoder transitions to finished. Safe to
    /// call more than once.
    pub fn finish(&mut self) -> Vec<String> {
        let mut fragments = Vec::new();
        if self.finished {
            return fragments;
        }
        self.drain_events(&mut fragments, true);
        self.finished = true;
        self.buf.clear();
        fragments
    }

    fn drain_events(&mut self, fragments: &mut Vec<String>, final_flush: bool) {
        while !self.finished {
            let (event_end, resume_at) = match find_event_boundary(&self.buf) {
                Some(boundary) => boundary,
                None => break,
            };
            let event: Vec<u8> = self.buf.drain(..resume_at).collect();
            self.handle_event(&event[..event_end], fragments);
        }
        if final_flush && !self.finished && !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            self.handle_event(&rest, fragments);
        }
    }

    fn handle_event(&mut self, event: &[u8], fragments: &mut Vec<String>) {
        let text = String::from_utf8_lossy(event);
        let data_lines: Vec<&str> = text
            .lines()
            .filter_map(|line| line.strip_prefix(DATA_MARKER))
            .map(str::trim)
            .collect();

        // Comment and keep-alive events carry no data lines
        if data_lines.is_empty() {
            return;
        }

        let payload = data_lines.join("\n");
        if payload == DONE_SENTINEL {
            self.terminate();
            return;
        }

        let chunk: ChatChunk = match serde_json::from_str(&payload) {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!(%err, payload = %payload, "skipping undecodable stream event");
                return;
            }
        };

        if let Some(content) = chunk.content() {
            if !content.is_empty() {
                fragments.push(content.to_owned());
            }
        }

        if let Some(message) = chunk.error_message() {
            if !message.is_empty() {
                fragments.push(format!("\nError: {message}"));
                self.terminate();
            }
        }
    }

    /// One-way transition; pending input is dropped
    fn terminate(&mut self) {
        self.finished = true;
        self.buf.clear();
    }
}

/// Locate the next blank-line event boundary
///
/// Returns the end of the event's bytes and the position after the
/// boundary. Accepts `\n\n` as well as the CRLF form, where the blank line
/// is `\r\n`.
fn find_event_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    for (i, byte) in buf.iter().enumerate() {
        if *byte != b'\n' {
            continue;
        }
        match (buf.get(i + 1), buf.get(i + 2)) {
            (Some(&b'\n'), _) => return Some((i, i + 2)),
            (Some(&b'\r'), Some(&b'\n')) => return Some((i, i + 3)),
            _ => {}
        }
    }
    None
}
