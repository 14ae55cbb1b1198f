// Debounce and last-request-wins primitives for the explore loop.
//
// Parameter edits arrive in bursts (typing a year, toggling several flags).
// A `Debouncer` coalesces a burst into one recompute once input has been
// quiet for the window. Each recompute is stamped with a `Generation`
// token; when results come back out of order, only the newest is shown.

use std::future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Quiet period before a burst of edits triggers a recompute.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(120);

/// Monotonic request counter shared between the loop and its workers.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token; every earlier token becomes stale.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.current()
    }
}

/// Trailing-edge debouncer driven from a `tokio::select!` loop.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Register an edit, pushing the deadline out by a full window.
    pub fn trigger(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves once the window has passed since the last `trigger`, then
    /// disarms. Never resolves while disarmed. Cancel-safe: dropping the
    /// future keeps the deadline.
    pub async fn ready(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => future::pending::<()>().await,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_generation_is_current() {
        let generation = Generation::new();
        let first = generation.advance();
        let second = generation.advance();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));

        let shared = generation.clone();
        let third = shared.advance();
        assert!(generation.is_current(third));
    }

    #[tokio::test]
    async fn burst_fires_once_after_quiet_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(30));
        let start = Instant::now();
        debouncer.trigger();
        tokio::time::sleep(Duration::from_millis(10)).await;
        debouncer.trigger();

        debouncer.ready().await;
        assert!(start.elapsed() >= Duration::from_millis(40));
        assert!(!debouncer.is_armed());
    }

    #[tokio::test]
    async fn fires_once_then_disarms() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.trigger();
        debouncer.ready().await;
        let fired = tokio::time::timeout(Duration::from_millis(200), debouncer.ready()).await;
        assert!(fired.is_err());
    }
}
