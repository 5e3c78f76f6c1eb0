//! First-response watchdog.
//!
//! A client-side timer that flips a "no response — retry" signal when the
//! first chunk has not arrived in time. It deliberately does NOT cancel the
//! underlying I/O: a late reply is still rendered, and the retry affordance
//! is only resolved by a fresh explicit send.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Default wait before offering a retry.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Armed timer for one request. Call [`satisfy`](Self::satisfy) when the
/// first byte arrives; check [`timed_out`](Self::timed_out) to decide
/// whether to show the retry affordance.
pub struct ResponseWatchdog {
    fired: Arc<AtomicBool>,
    satisfied: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ResponseWatchdog {
    pub fn arm(timeout: Duration) -> Self {
        let fired = Arc::new(AtomicBool::new(false));
        let satisfied = Arc::new(AtomicBool::new(false));

        let fired_clone = Arc::clone(&fired);
        let satisfied_clone = Arc::clone(&satisfied);
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if !satisfied_clone.load(Ordering::SeqCst) {
                fired_clone.store(true, Ordering::SeqCst);
            }
        });

        Self { fired, satisfied, task }
    }

    /// Record that a response arrived. Does not clear an already-fired
    /// timeout: once the retry affordance is shown it stays until the user
    /// sends again.
    pub fn satisfy(&self) {
        self.satisfied.store(true, Ordering::SeqCst);
    }

    /// Whether the timeout fired before the response arrived.
    pub fn timed_out(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Drop for ResponseWatchdog {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_without_response() {
        let dog = ResponseWatchdog::arm(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(dog.timed_out());
    }

    #[tokio::test(start_paused = true)]
    async fn test_satisfied_in_time_does_not_fire() {
        let dog = ResponseWatchdog::arm(Duration::from_millis(10));
        dog.satisfy();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!dog.timed_out());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_does_not_revoke_timeout() {
        let dog = ResponseWatchdog::arm(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(20)).await;
        dog.satisfy();
        assert!(dog.timed_out(), "retry affordance stays once shown");
    }
}
