//! Live search statistics

use std::time::Duration;

use idvanity_pattern::{estimate_time_50pct, format_duration, match_probability};

/// Monotonic clock, absent on bare wasm where `Instant` is unavailable
#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
mod clock {
    use std::time::{Duration, Instant};

    #[derive(Debug, Clone, Copy)]
    pub struct Clock(Instant);

    impl Clock {
        pub fn start() -> Self {
            Self(Instant::now())
        }

        pub fn elapsed(&self) -> Duration {
            self.0.elapsed()
        }
    }
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
mod clock {
    use std::time::Duration;

    #[derive(Debug, Clone, Copy)]
    pub struct Clock;

    impl Clock {
        pub fn start() -> Self {
            Self
        }

        pub fn elapsed(&self) -> Duration {
            Duration::ZERO
        }
    }
}

/// Statistics for one search invocation
#[derive(Debug, Clone)]
pub struct SearchStats {
    attempts: u64,
    difficulty: f64,
    clock: clock::Clock,
}

impl SearchStats {
    pub fn new(difficulty: f64) -> Self {
        Self {
            attempts: 0,
            difficulty,
            clock: clock::Clock::start(),
        }
    }

    /// Count one rejected candidate
    pub fn add_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Rejected candidates so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn attempts_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.attempts as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Probability that a match would have shown up by now
    pub fn probability(&self) -> f64 {
        match_probability(self.difficulty, self.attempts)
    }

    /// Get formatted stats string
    pub fn format(&self) -> String {
        let rate = self.attempts_per_second();
        let remaining = if self.probability() < 0.5 && rate > 0.0 {
            let needed = self.difficulty * std::f64::consts::LN_2 - self.attempts as f64;
            needed / rate
        } else {
            0.0
        };

        format!(
            "[{:.1} id/s][Total {}][Prob {:.1}%][50% in {}][Avg {}]",
            rate,
            format_count(self.attempts),
            self.probability() * 100.0,
            format_duration(remaining),
            format_duration(estimate_time_50pct(self.difficulty, rate)),
        )
    }
}

fn format_count(count: u64) -> String {
    if count >= 1_000_000_000 {
        format!("{:.2}G", count as f64 / 1e9)
    } else if count >= 1_000_000 {
        format!("{:.2}M", count as f64 / 1e6)
    } else if count >= 1000 {
        format!("{:.2}K", count as f64 / 1e3)
    } else {
        format!("{}", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_counting() {
        let mut stats = SearchStats::new(16.0);
        assert_eq!(stats.attempts(), 0);
        stats.add_attempt();
        stats.add_attempt();
        assert_eq!(stats.attempts(), 2);
        assert!(stats.probability() > 0.0);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1500), "1.50K");
        assert_eq!(format_count(2_000_000), "2.00M");
    }

    #[test]
    fn test_format_mentions_total() {
        let mut stats = SearchStats::new(65536.0);
        for _ in 0..1500 {
            stats.add_attempt();
        }
        let line = stats.format();
        assert!(line.contains("[Total 1.50K]"), "{}", line);
    }
}
