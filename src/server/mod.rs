//! HTTP server for the MindMate service.
//!
//! Exposes the AI-prompted functions (counseling chat, Socratic questions)
//! and the session-history store over HTTP. See [`routes`] for the
//! endpoint list.

pub mod routes;

pub use routes::{app_router, AppState};
