//! AI gateway transport.
//!
//! Two supported consumption modes, the streaming one being canonical:
//!
//! - buffered: one JSON payload per call, optionally replayed locally with
//!   the [`typewriter`] reveal;
//! - streaming: newline-delimited `data:` frames consumed as a structured
//!   async chunk receiver, terminated by `data: [DONE]`.
//!
//! Every failure mode degrades to canned fallback content (see
//! [`fallback`]); retry is user-initiated only, so the client makes exactly
//! one attempt per call.

pub mod client;
pub mod fallback;
pub mod streaming;
pub mod typewriter;
pub mod watchdog;

pub use client::{GatewayClient, GatewayConfig, GatewayError};
pub use streaming::{
    parse_sse_line, ChannelStreamReceiver, SseFrame, StreamAccumulator, StreamChunk,
    StreamReceiver,
};
pub use typewriter::Typewriter;
pub use watchdog::ResponseWatchdog;
