use std::time::Duration;

/// Fixed delay applied after each request to a rate-sensitive source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPacer {
    delay: Duration,
}

impl RequestPacer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Blocks the calling thread for the configured delay.
    pub fn pace(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn zero_delay_returns_immediately() {
        let start = Instant::now();
        RequestPacer::new(Duration::ZERO).pace();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn pace_waits_at_least_the_delay() {
        let start = Instant::now();
        RequestPacer::new(Duration::from_millis(20)).pace();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
