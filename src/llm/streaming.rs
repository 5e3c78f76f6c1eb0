//! Streaming response support.
//!
//! The gateway streams replies as newline-delimited SSE frames:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"我"}}]}
//! data: {"content":"在"}
//! data: [DONE]
//! ```
//!
//! Both frame bodies are accepted — the flat `{"content": ...}` shape this
//! service emits to its own clients and the `choices[].delta` shape the
//! upstream gateway emits. Malformed frames are skipped silently; a parse
//! error is never fatal to the stream.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StreamChunk
// ---------------------------------------------------------------------------

/// A single chunk delivered to the stream consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    /// A text fragment to append to the in-progress assistant message.
    TextDelta { text: String },

    /// The stream is done. Carries the full assembled reply.
    Done { content: String },

    /// The transport failed mid-stream.
    Error { message: String },
}

// ---------------------------------------------------------------------------
// SSE frame parsing
// ---------------------------------------------------------------------------

/// A decoded SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// An incremental text fragment.
    Delta(String),
    /// The `[DONE]` terminal frame.
    Done,
}

/// Decode one line of an SSE body.
///
/// Returns `None` for blank lines, comments, non-`data:` lines, and
/// malformed or fragment-less payloads — callers skip those and keep
/// reading.
pub fn parse_sse_line(line: &str) -> Option<SseFrame> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let payload = line.strip_prefix("data:")?.trim();
    if payload == "[DONE]" {
        return Some(SseFrame::Done);
    }

    let value: serde_json::Value = serde_json::from_str(payload).ok()?;
    let fragment = value
        .get("content")
        .and_then(|c| c.as_str())
        .or_else(|| {
            value
                .get("choices")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("delta"))
                .and_then(|d| d.get("content"))
                .and_then(|c| c.as_str())
        })?;

    if fragment.is_empty() {
        None
    } else {
        Some(SseFrame::Delta(fragment.to_string()))
    }
}

// ---------------------------------------------------------------------------
// StreamReceiver
// ---------------------------------------------------------------------------

/// Receiver for streaming chunks.
///
/// A finite sequence: yields `None` after the terminal chunk. Not
/// restartable — retrying means issuing a fresh request.
#[async_trait]
pub trait StreamReceiver: Send {
    /// Next chunk, or `None` when the stream is exhausted.
    async fn next(&mut self) -> Option<StreamChunk>;
}

/// A [`StreamReceiver`] backed by a tokio mpsc channel.
///
/// The producing task holds the sender; dropping this receiver closes the
/// channel, which the producer observes as a failed send and uses as its
/// teardown signal.
pub struct ChannelStreamReceiver {
    rx: tokio::sync::mpsc::Receiver<StreamChunk>,
}

impl ChannelStreamReceiver {
    pub fn new(rx: tokio::sync::mpsc::Receiver<StreamChunk>) -> Self {
        Self { rx }
    }

    /// Create a matched sender + receiver pair.
    pub fn pair(buffer: usize) -> (tokio::sync::mpsc::Sender<StreamChunk>, Self) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (tx, Self { rx })
    }
}

#[async_trait]
impl StreamReceiver for ChannelStreamReceiver {
    async fn next(&mut self) -> Option<StreamChunk> {
        self.rx.recv().await
    }
}

// ---------------------------------------------------------------------------
// StreamAccumulator
// ---------------------------------------------------------------------------

/// Assembles text fragments into the complete reply.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    complete: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a chunk, returning `true` once the stream has terminated.
    pub fn push(&mut self, chunk: &StreamChunk) -> bool {
        match chunk {
            StreamChunk::TextDelta { text } => {
                self.text.push_str(text);
                false
            }
            StreamChunk::Done { content } => {
                if !content.is_empty() {
                    self.text = content.clone();
                }
                self.complete = true;
                true
            }
            StreamChunk::Error { .. } => {
                self.complete = true;
                true
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_content_frame() {
        let frame = parse_sse_line("data: {\"content\":\"你好\"}").unwrap();
        assert_eq!(frame, SseFrame::Delta("你好".into()));
    }

    #[test]
    fn test_parse_delta_frame() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}";
        assert_eq!(parse_sse_line(line).unwrap(), SseFrame::Delta("A".into()));
    }

    #[test]
    fn test_parse_done_frame() {
        assert_eq!(parse_sse_line("data: [DONE]").unwrap(), SseFrame::Done);
    }

    #[test]
    fn test_malformed_and_empty_lines_skipped() {
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("event: ping").is_none());
        assert!(parse_sse_line("data: {not json").is_none());
        assert!(parse_sse_line("data: {\"choices\":[]}").is_none());
        assert!(parse_sse_line("data: {\"content\":\"\"}").is_none());
    }

    #[test]
    fn test_accumulator_concatenates_in_order() {
        let mut acc = StreamAccumulator::new();
        assert!(!acc.push(&StreamChunk::TextDelta { text: "A".into() }));
        assert!(!acc.push(&StreamChunk::TextDelta { text: "B".into() }));
        assert!(acc.push(&StreamChunk::Done { content: String::new() }));
        assert_eq!(acc.text(), "AB");
        assert!(acc.is_complete());
    }

    #[test]
    fn test_malformed_frame_does_not_corrupt_concatenation() {
        // The documented property: a malformed frame between valid ones is
        // skipped and the remaining fragments still concatenate cleanly.
        let lines = [
            "data: {\"content\":\"A\"}",
            "data: {oops",
            "data: {\"content\":\"B\"}",
            "data: [DONE]",
        ];
        let mut acc = StreamAccumulator::new();
        for line in lines {
            match parse_sse_line(line) {
                Some(SseFrame::Delta(text)) => {
                    acc.push(&StreamChunk::TextDelta { text });
                }
                Some(SseFrame::Done) => {
                    acc.push(&StreamChunk::Done { content: String::new() });
                }
                None => {}
            }
        }
        assert_eq!(acc.text(), "AB");
        assert!(acc.is_complete());
    }

    #[test]
    fn test_terminal_content_overrides_accumulation() {
        let mut acc = StreamAccumulator::new();
        acc.push(&StreamChunk::TextDelta { text: "partial".into() });
        acc.push(&StreamChunk::Done { content: "final".into() });
        assert_eq!(acc.text(), "final");
    }

    #[tokio::test]
    async fn test_channel_stream_receiver() {
        let (tx, mut rx) = ChannelStreamReceiver::pair(8);
        tx.send(StreamChunk::TextDelta { text: "hi".into() }).await.unwrap();
        tx.send(StreamChunk::Done { content: "hi".into() }).await.unwrap();
        drop(tx);

        assert!(matches!(rx.next().await, Some(StreamChunk::TextDelta { .. })));
        assert!(matches!(rx.next().await, Some(StreamChunk::Done { .. })));
        assert!(rx.next().await.is_none());
    }
}
