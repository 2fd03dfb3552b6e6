//! Trailing-edge search debounce.
//!
//! Keystrokes update the raw query immediately; the settled copy that
//! drives filtering only advances once input has been quiet for the
//! debounce interval. Built on `tokio::time` so tests run under paused
//! time.

use std::time::Duration;
use tokio::time::Instant;

/// Delay before a quiet query participates in filtering.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Coalesces rapid search input into a settled query.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<String>,
    deadline: Option<Instant>,
    settled: String,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

impl SearchDebouncer {
    /// Creates a debouncer with the given trailing-edge delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
            settled: String::new(),
        }
    }

    /// Records a keystroke, restarting the quiet-period timer.
    pub fn input(&mut self, text: &str) {
        self.pending = Some(text.to_string());
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Applies any pending input immediately, skipping the delay. Used
    /// when state is restored from a URL or cleared.
    pub fn flush(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.settled = pending;
        }
        self.deadline = None;
    }

    /// Applies pending input if the quiet period has elapsed. Returns
    /// whether the settled query changed.
    pub fn poll(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                let before = self.settled.clone();
                self.flush();
                self.settled != before
            }
            _ => false,
        }
    }

    /// Waits out any remaining quiet period, then applies pending input.
    pub async fn settle(&mut self) {
        if let Some(deadline) = self.deadline {
            tokio::time::sleep_until(deadline).await;
        }
        self.flush();
    }

    /// The settled query currently driving filtering.
    #[must_use]
    pub fn settled(&self) -> &str {
        &self.settled
    }

    /// True when input is waiting out its quiet period.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops pending and settled state back to empty.
    pub fn clear(&mut self) {
        self.pending = None;
        self.deadline = None;
        self.settled.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_settles_only_after_quiet_period() {
        let mut debouncer = SearchDebouncer::default();
        debouncer.input("pir");

        assert!(!debouncer.poll());
        assert_eq!(debouncer.settled(), "");

        tokio::time::advance(DEBOUNCE_DELAY).await;
        assert!(debouncer.poll());
        assert_eq!(debouncer.settled(), "pir");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_keeps_last_value() {
        let mut debouncer = SearchDebouncer::default();
        debouncer.input("p");
        tokio::time::advance(Duration::from_millis(100)).await;
        debouncer.input("pi");
        tokio::time::advance(Duration::from_millis(100)).await;
        debouncer.input("pirate");

        // First keystroke's deadline has long passed, but input kept
        // restarting the timer.
        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(!debouncer.poll());

        debouncer.settle().await;
        assert_eq!(debouncer.settled(), "pirate");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_applies_immediately() {
        let mut debouncer = SearchDebouncer::default();
        debouncer.input("query");
        debouncer.flush();

        assert_eq!(debouncer.settled(), "query");
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_resets_everything() {
        let mut debouncer = SearchDebouncer::default();
        debouncer.input("query");
        debouncer.settle().await;
        debouncer.clear();

        assert_eq!(debouncer.settled(), "");
    }
}
