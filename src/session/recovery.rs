//! Consecutive frame-read failure tracking.

/// Default number of failed reads in a row tolerated before giving up
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 30;

/// Counts failed reads in a row; a good read resets it
#[derive(Debug, Clone)]
pub struct FailureCounter {
    limit: u32,
    consecutive: u32,
    total: u64,
}

impl Default for FailureCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONSECUTIVE_FAILURES)
    }
}

impl FailureCounter {
    /// `limit` of zero is treated as one: the first failure is fatal
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            consecutive: 0,
            total: 0,
        }
    }

    /// Record a failed read
    ///
    /// # Returns
    /// true once the limit of consecutive failures is reached
    pub fn record_failure(&mut self) -> bool {
        self.consecutive += 1;
        self.total += 1;
        self.consecutive >= self.limit
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalates_at_the_limit() {
        let mut counter = FailureCounter::new(3);
        assert!(!counter.record_failure());
        assert!(!counter.record_failure());
        assert!(counter.record_failure());
    }

    #[test]
    fn success_resets_the_streak() {
        let mut counter = FailureCounter::new(2);
        assert!(!counter.record_failure());
        counter.record_success();
        assert!(!counter.record_failure());
        assert_eq!(counter.consecutive(), 1);
        assert_eq!(counter.total(), 2);
    }

    #[test]
    fn zero_limit_fails_immediately() {
        assert!(FailureCounter::new(0).record_failure());
    }
}
