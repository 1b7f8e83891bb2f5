//! Reconnection backoff policy.
//!
//! Pure decision logic: given the attempt count so far, either schedule
//! another attempt after an exponentially growing delay or give up. The
//! policy never touches the connection itself; the session owns scheduling
//! and resets the state after every successful open.

use std::time::Duration;

/// Default initial retry delay.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Default cap on the retry delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(30_000);

/// Default number of automatic attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// What to do after an unexpected disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Reopen the connection after this delay.
    RetryAfter(Duration),
    /// Attempts are exhausted; no further automatic reconnection.
    GiveUp,
}

/// Per-session reconnection attempt tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconnectState {
    attempts: u32,
}

impl ReconnectState {
    /// Number of attempts consumed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Backoff parameters, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ReconnectPolicy {
    /// Create a policy with explicit parameters.
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts,
        }
    }

    /// Decide the next action after an unexpected disconnect.
    ///
    /// Called exactly once per disconnect. Consumes one attempt when
    /// retrying; leaves the state untouched once exhausted.
    pub fn on_disconnected(&self, state: &mut ReconnectState) -> ReconnectDecision {
        if state.attempts >= self.max_attempts {
            return ReconnectDecision::GiveUp;
        }

        let delay = self
            .base_delay
            .saturating_mul(1u32 << state.attempts.min(31))
            .min(self.max_delay);
        state.attempts += 1;
        ReconnectDecision::RetryAfter(delay)
    }

    /// Reset attempt tracking after a successful open.
    pub fn reset(&self, state: &mut ReconnectState) {
        *state = ReconnectState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_give_up() {
        let policy = ReconnectPolicy::default();
        let mut state = ReconnectState::default();

        let expected = [1000u64, 2000, 4000, 8000, 16000];
        for ms in expected {
            assert_eq!(
                policy.on_disconnected(&mut state),
                ReconnectDecision::RetryAfter(Duration::from_millis(ms))
            );
        }
        assert_eq!(state.attempts(), 5);
        assert_eq!(policy.on_disconnected(&mut state), ReconnectDecision::GiveUp);
        // Terminal: attempts stay where they were.
        assert_eq!(state.attempts(), 5);
        assert_eq!(policy.on_disconnected(&mut state), ReconnectDecision::GiveUp);
    }

    #[test]
    fn delay_is_capped() {
        let policy = ReconnectPolicy::new(
            Duration::from_millis(1000),
            Duration::from_millis(30_000),
            10,
        );
        let mut state = ReconnectState::default();

        let mut last = Duration::ZERO;
        for _ in 0..10 {
            match policy.on_disconnected(&mut state) {
                ReconnectDecision::RetryAfter(delay) => last = delay,
                ReconnectDecision::GiveUp => panic!("gave up before attempts ran out"),
            }
        }
        assert_eq!(last, Duration::from_millis(30_000));
    }

    #[test]
    fn reset_restarts_at_base_delay() {
        let policy = ReconnectPolicy::default();
        let mut state = ReconnectState::default();

        policy.on_disconnected(&mut state);
        policy.on_disconnected(&mut state);
        assert_eq!(state.attempts(), 2);

        policy.reset(&mut state);
        assert_eq!(state.attempts(), 0);
        assert_eq!(
            policy.on_disconnected(&mut state),
            ReconnectDecision::RetryAfter(Duration::from_millis(1000))
        );
    }

    #[test]
    fn zero_attempts_gives_up_immediately() {
        let policy = ReconnectPolicy::new(Duration::from_millis(100), Duration::from_secs(1), 0);
        let mut state = ReconnectState::default();
        assert_eq!(policy.on_disconnected(&mut state), ReconnectDecision::GiveUp);
    }
}
