//! Fixed-interval pacing for publish attempts

use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use std::time::Duration;

/// Fixed-interval gate in front of every publish attempt
///
/// The interval is `1_000_000 / rate` microseconds with a burst of one,
/// so a pacer admits at most `rate` attempts per second. A worker that
/// owns its own pacer is paced independently of every other worker; to
/// pace the whole pool, share a single instance via `Arc`.
pub struct Pacer {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    rate: u32,
    interval: Option<Duration>,
}

impl Pacer {
    /// Create a pacer admitting `rate` attempts per second
    ///
    /// A rate of zero disables pacing.
    ///
    /// # Examples
    /// ```
    /// use mqbench_core::worker::Pacer;
    ///
    /// let pacer = Pacer::new(50);
    /// assert_eq!(pacer.interval(), Some(std::time::Duration::from_millis(20)));
    ///
    /// let unlimited = Pacer::new(0);
    /// assert!(!unlimited.is_enabled());
    /// ```
    pub fn new(rate: u32) -> Self {
        if rate == 0 {
            return Self::unlimited();
        }

        // Integer microseconds, never below one.
        let micros = (1_000_000 / u64::from(rate)).max(1);
        let interval = Duration::from_micros(micros);

        match Quota::with_period(interval) {
            Some(quota) => {
                let limiter = RateLimiter::direct(quota);
                // The first tick lands one interval after creation.
                let _ = limiter.check();
                Self {
                    limiter: Some(limiter),
                    rate,
                    interval: Some(interval),
                }
            }
            None => Self::unlimited(),
        }
    }

    /// A pacer that never waits
    pub fn unlimited() -> Self {
        Self {
            limiter: None,
            rate: 0,
            interval: None,
        }
    }

    /// Wait for the next tick
    ///
    /// Returns immediately when pacing is disabled.
    pub async fn wait(&self) {
        if let Some(ref limiter) = self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Check if pacing is enabled
    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Configured attempts per second (0 when disabled)
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Interval between ticks
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("rate", &self.rate)
            .field("interval", &self.interval)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_pacer_disabled() {
        let pacer = Pacer::new(0);
        assert!(!pacer.is_enabled());
        assert_eq!(pacer.rate(), 0);
        assert!(pacer.interval().is_none());
    }

    #[test]
    fn test_pacer_interval_is_integer_micros() {
        assert_eq!(Pacer::new(1).interval(), Some(Duration::from_secs(1)));
        assert_eq!(Pacer::new(3).interval(), Some(Duration::from_micros(333_333)));
        assert_eq!(Pacer::new(1000).interval(), Some(Duration::from_millis(1)));
    }

    #[test]
    fn test_pacer_very_high_rate_clamps_to_one_micro() {
        let pacer = Pacer::new(u32::MAX);
        assert!(pacer.is_enabled());
        assert_eq!(pacer.interval(), Some(Duration::from_micros(1)));
    }

    #[test]
    fn test_pacer_default() {
        assert!(!Pacer::default().is_enabled());
    }

    #[tokio::test]
    async fn test_pacer_wait_disabled() {
        let pacer = Pacer::unlimited();
        let start = Instant::now();
        for _ in 0..1000 {
            pacer.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_pacer_spaces_ticks() {
        let pacer = Pacer::new(100);
        let start = Instant::now();
        for _ in 0..6 {
            pacer.wait().await;
        }
        // Six ticks, 10ms apart, the first one interval after creation.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(55), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(500), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_pacer_first_wait_lasts_one_interval() {
        let pacer = Pacer::new(10);
        let start = Instant::now();
        pacer.wait().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(95), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(500), "elapsed {elapsed:?}");
    }

    #[test]
    fn test_pacer_debug() {
        let debug = format!("{:?}", Pacer::new(50));
        assert!(debug.contains("Pacer"));
        assert!(debug.contains("50"));
        assert!(debug.contains("true"));
    }
}
