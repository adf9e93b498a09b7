use std::time::Duration;

/// Fixed-delay retry schedule. `max_attempts == None` retries forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub backoff: Duration,
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded(backoff: Duration) -> Self {
        Self {
            backoff,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before the next attempt, or `None` once `attempts_made` exhausts the policy.
    pub fn next_delay(&self, attempts_made: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempts_made >= max => None,
            _ => Some(self.backoff),
        }
    }
}
