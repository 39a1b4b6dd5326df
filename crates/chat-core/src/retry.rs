//! Bounded retry for transient provider signals.

use std::time::Duration;

/// How many times, and how long between, an adapter retries a transient failure.
///
/// The cap is part of the adapter contract: a call makes at most
/// `max_retries + 1` attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before each retry when the provider gives no hint.
    pub delay: Duration,
    /// Upper bound on a provider-suggested wait.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Fixed-delay policy.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            max_delay: delay,
        }
    }

    /// Whether another attempt is allowed after `retries_done` retries.
    pub fn allows(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }

    /// Wait before the next attempt, honouring a provider hint up to `max_delay`.
    pub fn delay_for(&self, hint: Option<Duration>) -> Duration {
        match hint {
            Some(hint) => hint.min(self.max_delay),
            None => self.delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_one_retry() {
        let policy = RetryPolicy::default();
        assert!(policy.allows(0));
        assert!(!policy.allows(1));
    }

    #[test]
    fn test_none_never_retries() {
        assert!(!RetryPolicy::none().allows(0));
    }

    #[test]
    fn test_hint_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(None), Duration::from_secs(10));
        assert_eq!(policy.delay_for(Some(Duration::from_secs(3))), Duration::from_secs(3));
        assert_eq!(policy.delay_for(Some(Duration::from_secs(90))), Duration::from_secs(20));
    }
}
