//! Completed-session history.
//!
//! The store is append-only from the client's perspective: one insert per
//! finished wizard run, queried by owner and date range for the calendar
//! and trend views.

pub mod store;
pub mod trend;

pub use store::{CompletedSession, NewSession, SessionStore};
pub use trend::{daily_summaries, session_dates, trend_of, DailySummary, Trend};
