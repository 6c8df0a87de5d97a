//! Clock and pacing utilities for the tick loop.
//!
//! Every sample flowing through the pipeline is stamped with monotonic
//! nanoseconds relative to a session epoch. This module provides:
//! - The session epoch and elapsed-time conversions
//! - A rate controller used to throttle output commands

use std::time::Instant;

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment tracking started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }

    /// Convert milliseconds to nanoseconds.
    pub fn ms_to_ns(ms: u64) -> u64 {
        ms.saturating_mul(1_000_000)
    }
}

/// Minimum-interval gate: admits at most one tick per interval.
#[derive(Debug)]
pub struct RateController {
    interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller admitting one tick every `interval_ns`.
    pub fn with_interval_ns(interval_ns: u64) -> Self {
        Self {
            interval_ns,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last.saturating_add(self.interval_ns) => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.elapsed_ns() < 1_000_000_000);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_time_conversions() {
        assert!((SessionClock::ns_to_secs(33_000_000) - 0.033).abs() < 1e-12);
        assert_eq!(SessionClock::ms_to_ns(2000), 2_000_000_000);
    }

    #[test]
    fn test_rate_controller() {
        let mut ctrl = RateController::with_interval_ns(16_666_667);
        assert!(ctrl.should_tick(0)); // first tick always fires
        assert!(!ctrl.should_tick(1_000_000)); // 1ms later, too soon
        assert!(ctrl.should_tick(17_000_000));
    }

    #[test]
    fn test_zero_interval_admits_everything() {
        let mut ctrl = RateController::with_interval_ns(0);
        assert!(ctrl.should_tick(5));
        assert!(ctrl.should_tick(5));
    }
}
