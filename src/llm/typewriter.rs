//! Local typewriter replay for buffered replies.
//!
//! Reveals an already-complete text at a fixed interval, a configurable
//! number of characters per tick, yielding fragments over a channel like a
//! real stream would. Fully client-side and cancellable: dropping the handle
//! aborts the reveal task so a stale reveal never writes into a newer
//! render target.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to a running reveal. Yields the newly revealed fragment each tick.
pub struct Typewriter {
    rx: mpsc::Receiver<String>,
    task: JoinHandle<()>,
}

impl Typewriter {
    /// Default reveal cadence: one character every 30 ms.
    pub const DEFAULT_TICK: Duration = Duration::from_millis(30);

    /// Start revealing `text`, `chars_per_tick` characters every `tick`.
    /// A zero rate is clamped to one character per tick.
    pub fn spawn(text: String, chars_per_tick: usize, tick: Duration) -> Self {
        let step = chars_per_tick.max(1);
        let (tx, rx) = mpsc::channel(32);

        let task = tokio::spawn(async move {
            let chars: Vec<char> = text.chars().collect();
            let mut interval = tokio::time::interval(tick);
            let mut cursor = 0;

            while cursor < chars.len() {
                interval.tick().await;
                let end = (cursor + step).min(chars.len());
                let fragment: String = chars[cursor..end].iter().collect();
                cursor = end;
                if tx.send(fragment).await.is_err() {
                    // Consumer gone; stop revealing.
                    return;
                }
            }
        });

        Self { rx, task }
    }

    /// Next revealed fragment, or `None` when the full text has been
    /// delivered.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_reveals_full_text_in_order() {
        let mut tw = Typewriter::spawn("心灵伙伴陪着你".into(), 2, Duration::from_millis(10));
        let mut assembled = String::new();
        while let Some(fragment) = tw.next().await {
            assembled.push_str(&fragment);
        }
        assert_eq!(assembled, "心灵伙伴陪着你");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rate_clamped() {
        let mut tw = Typewriter::spawn("ab".into(), 0, Duration::from_millis(1));
        assert_eq!(tw.next().await.as_deref(), Some("a"));
        assert_eq!(tw.next().await.as_deref(), Some("b"));
        assert!(tw.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_completes_immediately() {
        let mut tw = Typewriter::spawn(String::new(), 3, Duration::from_millis(1));
        assert!(tw.next().await.is_none());
    }
}
