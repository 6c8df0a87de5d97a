//! Dwell-time click.
//!
//! Clicks the target under the pointer once it has stayed the same for
//! `threshold`. Any identity change, including moving off every target,
//! restarts the timer and re-arms the click.

use pawcursor_tracking_model::sample::TimestampNs;
use pawcursor_tracking_model::target::TargetId;

#[derive(Debug, Clone)]
pub struct DwellClickDetector {
    threshold_ns: u64,
    focused_target: Option<TargetId>,
    focus_started_ns: TimestampNs,
    fired: bool,
}

impl DwellClickDetector {
    pub fn new(threshold_ns: u64) -> Self {
        Self {
            threshold_ns,
            focused_target: None,
            focus_started_ns: 0,
            fired: false,
        }
    }

    pub fn from_millis(threshold_ms: u64) -> Self {
        Self::new(threshold_ms.saturating_mul(1_000_000))
    }

    pub fn focused_target(&self) -> Option<TargetId> {
        self.focused_target
    }

    /// Feed the target currently under the pointer. Returns `true` when a
    /// click must be emitted.
    pub fn update(&mut self, current: Option<TargetId>, now_ns: TimestampNs) -> bool {
        if current != self.focused_target {
            tracing::debug!(from = ?self.focused_target, to = ?current, "dwell target changed");
            self.focused_target = current;
            self.focus_started_ns = now_ns;
            self.fired = false;
            return false;
        }

        if current.is_none() || self.fired {
            return false;
        }

        if now_ns.saturating_sub(self.focus_started_ns) >= self.threshold_ns {
            self.fired = true;
            return true;
        }
        false
    }
}
