//! MindMate: a guided CBT self-help service.
//!
//! The crate backs a three-step wellness flow (name the emotion,
//! restructure the thought, commit to a micro-action) with an AI
//! counseling companion:
//!
//! - [`catalog`] — fixed emotion, distortion, micro-action and crisis data
//! - [`detect`] — keyword detectors for distortions and crisis language
//! - [`prompt`] — layered system-prompt assembly for the AI companion
//! - [`chat`] — conversation transcript and wire message types
//! - [`llm`] — AI gateway client, SSE streaming, fallbacks
//! - [`session`] — the wizard state machine
//! - [`history`] — completed-session storage and trend summaries
//! - [`server`] — the axum HTTP surface

pub mod catalog;
pub mod chat;
pub mod detect;
pub mod history;
pub mod llm;
pub mod prompt;
pub mod server;
pub mod session;
pub mod utilities;

pub use catalog::{Emotion, GENERIC_EMOTION_LABEL};
pub use chat::{ChatMessage, Role, Transcript, WireMessage};
pub use llm::{GatewayClient, GatewayConfig, GatewayError};
pub use server::{app_router, AppState};
pub use session::{SessionState, Step};

/// Crate version, reported by the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
