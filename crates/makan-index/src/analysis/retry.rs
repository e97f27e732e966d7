use std::time::Duration;

/// Total call attempts before a rate-limited analysis gives up.
pub const MAX_ATTEMPTS: u32 = 3;

/// Bounded-count, exponential-delay retry plan kept as an explicit state
/// machine so the schedule is testable without sleeping.
///
/// Attempts are indexed from 0. A rate limit on attempt `i` waits `2^i`
/// seconds before attempt `i + 1`; a rate limit on the final attempt gives
/// up instead.
#[derive(Debug)]
pub struct RetryState {
    attempt: u32,
    budget: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

impl RetryState {
    pub fn new(budget: u32) -> Self {
        Self { attempt: 0, budget }
    }

    /// Index of the attempt currently in flight.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Record a rate-limited failure of the current attempt and decide
    /// whether another attempt is allowed.
    pub fn on_rate_limit(&mut self) -> RetryDecision {
        let failed = self.attempt;
        self.attempt += 1;
        if self.attempt >= self.budget {
            RetryDecision::GiveUp
        } else {
            RetryDecision::RetryAfter(Duration::from_secs(1 << failed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_one_then_two_seconds_then_give_up() {
        let mut retry = RetryState::new(MAX_ATTEMPTS);
        assert_eq!(
            retry.on_rate_limit(),
            RetryDecision::RetryAfter(Duration::from_secs(1))
        );
        assert_eq!(
            retry.on_rate_limit(),
            RetryDecision::RetryAfter(Duration::from_secs(2))
        );
        assert_eq!(retry.on_rate_limit(), RetryDecision::GiveUp);
    }

    #[test]
    fn larger_budget_doubles_each_wait() {
        let mut retry = RetryState::new(4);
        let mut delays = Vec::new();
        loop {
            match retry.on_rate_limit() {
                RetryDecision::RetryAfter(delay) => delays.push(delay.as_secs()),
                RetryDecision::GiveUp => break,
            }
        }
        assert_eq!(delays, vec![1, 2, 4]);
    }

    #[test]
    fn attempt_reports_the_in_flight_index() {
        let mut retry = RetryState::new(MAX_ATTEMPTS);
        assert_eq!(retry.attempt(), 0);
        retry.on_rate_limit();
        assert_eq!(retry.attempt(), 1);
        retry.on_rate_limit();
        assert_eq!(retry.attempt(), 2);
    }

    #[test]
    fn single_attempt_budget_never_retries() {
        let mut retry = RetryState::new(1);
        assert_eq!(retry.on_rate_limit(), RetryDecision::GiveUp);
    }
}
