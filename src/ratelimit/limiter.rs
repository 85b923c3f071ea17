//! Core fixed-window rate limiter implementation.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::config::LimiterConfig;
use crate::store::TimedStore;

/// Default window length when none is configured.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Default maximum hits per window when none is configured.
pub const DEFAULT_CEILING: u64 = 10;

/// The outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the caller may proceed
    pub allowed: bool,
    /// Hits left in the current window, zero when denied
    pub remaining: u64,
    /// Instant at which the current window ends and the count resets
    pub reset_at: SystemTime,
}

/// A fixed-window rate limiter backed by a [`TimedStore`] of hit counters.
///
/// Each `(identifier, window)` pair gets its own counter entry whose TTL
/// lands exactly on the window boundary, so abandoned counters expire on
/// their own and the periodic sweep merely reclaims their memory.
///
/// Fixed-window counting deliberately admits bursts of up to twice the
/// ceiling across a window edge; see the boundary test below.
pub struct WindowLimiter {
    /// Hit counters indexed by `identifier:window_index`
    counters: Arc<TimedStore<u64>>,
    /// Window length
    window: Duration,
    /// Maximum hits allowed per window
    ceiling: u64,
    /// Shared with the counter store so both agree on "now"
    clock: Arc<dyn Clock>,
}

impl WindowLimiter {
    /// Create a limiter over `counters` with an explicit window and ceiling.
    ///
    /// The store is handed in by the composition root so tests and handlers
    /// share exactly the instances they are given; there is no ambient
    /// global state.
    ///
    /// Panics if `window` is shorter than one second; window arithmetic is
    /// in whole seconds, and [`EphemeraConfig::from_yaml`] rejects a zero
    /// window before it can reach this constructor.
    ///
    /// [`EphemeraConfig::from_yaml`]: crate::config::EphemeraConfig::from_yaml
    pub fn new(counters: Arc<TimedStore<u64>>, window: Duration, ceiling: u64) -> Self {
        assert!(
            window.as_secs() > 0,
            "window length must be at least one second"
        );
        let clock = counters.clock();
        Self {
            counters,
            window,
            ceiling,
            clock,
        }
    }

    /// Create a limiter from configuration.
    pub fn from_config(counters: Arc<TimedStore<u64>>, config: &LimiterConfig) -> Self {
        Self::new(counters, config.window(), config.ceiling)
    }

    /// Record a hit for `identifier` and decide whether it may proceed.
    ///
    /// The counter increments even when the decision is a denial, so a
    /// caller that retries immediately keeps accumulating count within the
    /// same window. The limiter never errors; reacting to a denial is the
    /// caller's concern.
    pub fn check(&self, identifier: &str) -> Decision {
        let now = self.clock.now();
        let now_secs = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let window_secs = self.window.as_secs();
        let window_index = now_secs / window_secs;
        let reset_at = UNIX_EPOCH + Duration::from_secs((window_index + 1) * window_secs);
        // The entry self-expires exactly at the window boundary
        let ttl = reset_at.duration_since(now).unwrap_or_default();

        let key = format!("{identifier}:{window_index}");

        trace!(
            identifier = %identifier,
            window = %window_index,
            "Checking rate limit"
        );

        let count = self
            .counters
            .update(&key, ttl, |prev| prev.unwrap_or(0) + 1);

        let allowed = count <= self.ceiling;
        let remaining = self.ceiling.saturating_sub(count);

        if !allowed {
            debug!(
                identifier = %identifier,
                count = count,
                ceiling = self.ceiling,
                "Rate limit exceeded"
            );
        }

        Decision {
            allowed,
            remaining,
            reset_at,
        }
    }

    /// The current hit count for `identifier` in its active window.
    ///
    /// Returns `None` if no live counter exists for the window.
    pub fn current_count(&self, identifier: &str) -> Option<u64> {
        let now_secs = self
            .clock
            .now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let window_index = now_secs / self.window.as_secs();
        self.counters.get(&format!("{identifier}:{window_index}"))
    }

    /// The configured ceiling.
    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// The configured window length.
    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn manual_clock() -> Arc<ManualClock> {
        // Aligned to a minute boundary so window math is predictable
        Arc::new(ManualClock::new(
            UNIX_EPOCH + Duration::from_secs(1_700_000_040),
        ))
    }

    fn limiter_with_clock(
        clock: Arc<ManualClock>,
        window: Duration,
        ceiling: u64,
    ) -> WindowLimiter {
        let counters = Arc::new(TimedStore::with_clock(clock));
        WindowLimiter::new(counters, window, ceiling)
    }

    #[test]
    fn test_allows_up_to_ceiling_with_decreasing_remaining() {
        let clock = manual_clock();
        let limiter = limiter_with_clock(clock, Duration::from_secs(60), 3);

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check("id");
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = limiter.check("id");
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
    }

    #[test]
    fn test_denied_calls_keep_counting() {
        let clock = manual_clock();
        let limiter = limiter_with_clock(clock, Duration::from_secs(60), 2);

        limiter.check("id");
        limiter.check("id");
        limiter.check("id");
        limiter.check("id");

        // Fixed-window semantics: every check lands in the counter
        assert_eq!(limiter.current_count("id"), Some(4));
    }

    #[test]
    fn test_window_rollover_resets_allowance() {
        let clock = manual_clock();
        let limiter = limiter_with_clock(clock.clone(), Duration::from_secs(60), 3);

        for _ in 0..4 {
            limiter.check("id");
        }
        assert!(!limiter.check("id").allowed);

        // Next window grants a fresh allowance immediately. This is the
        // accepted fixed-window boundary burst: up to 2x the ceiling can
        // pass across a window edge.
        clock.advance(Duration::from_secs(60));
        let decision = limiter.check("id");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[test]
    fn test_reset_at_is_the_window_end() {
        let start = UNIX_EPOCH + Duration::from_secs(1_700_000_040);
        let clock = Arc::new(ManualClock::new(start));
        let limiter = limiter_with_clock(clock.clone(), Duration::from_secs(60), 3);

        // 1_700_000_040 is a minute boundary, so the window ends 60s later
        let decision = limiter.check("id");
        assert_eq!(decision.reset_at, start + Duration::from_secs(60));

        // reset_at stays fixed as the window fills
        clock.advance(Duration::from_secs(30));
        let decision = limiter.check("id");
        assert_eq!(decision.reset_at, start + Duration::from_secs(60));
    }

    #[test]
    fn test_identifiers_have_separate_counters() {
        let clock = manual_clock();
        let limiter = limiter_with_clock(clock, Duration::from_secs(60), 1);

        assert!(limiter.check("alice").allowed);
        assert!(limiter.check("bob").allowed);
        assert!(!limiter.check("alice").allowed);
    }

    #[test]
    fn test_stale_window_counters_are_swept() {
        let clock = manual_clock();
        let counters = Arc::new(TimedStore::with_clock(clock.clone()));
        let limiter = WindowLimiter::new(counters.clone(), Duration::from_secs(60), 3);

        limiter.check("id");
        assert_eq!(counters.len(), 1);

        // Past-window counters are unreachable and reclaimed by sweep
        clock.advance(Duration::from_secs(120));
        assert_eq!(counters.sweep(), 1);
        assert!(counters.is_empty());
    }

    #[test]
    #[should_panic(expected = "window length must be at least one second")]
    fn test_zero_window_is_rejected_at_construction() {
        // A zero window is parseable on its own; construction must fail
        // loudly in every build profile instead of dividing by zero on the
        // first check()
        let config: LimiterConfig = serde_yaml::from_str("window_secs: 0").unwrap();
        let _ = WindowLimiter::from_config(Arc::new(TimedStore::new()), &config);
    }

    #[test]
    fn test_from_config_defaults() {
        let limiter = WindowLimiter::from_config(
            Arc::new(TimedStore::new()),
            &LimiterConfig::default(),
        );
        assert_eq!(limiter.ceiling(), DEFAULT_CEILING);
        assert_eq!(limiter.window(), DEFAULT_WINDOW);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_lose_no_increments() {
        let clock = manual_clock();
        let limiter = Arc::new(limiter_with_clock(clock, Duration::from_secs(60), 10));

        let mut handles = Vec::new();
        for _ in 0..100 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move { limiter.check("id").allowed }));
        }

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                allowed += 1;
            }
        }

        // Exactly the ceiling passes; the other 90 all land in the counter
        assert_eq!(allowed, 10);
        assert_eq!(limiter.current_count("id"), Some(100));
    }
}
