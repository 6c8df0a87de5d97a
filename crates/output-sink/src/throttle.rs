//! Move-rate limiting in front of a slow sink.
//!
//! The gate runs on sample time, fed through [`OutputSink::on_tick`], so a
//! replay throttles the same way however fast it is read.

use pawcursor_common::clock::{RateController, SessionClock};
use pawcursor_common::error::PawcursorResult;
use pawcursor_pointer_core::sink::{OutputSink, RETRACT_COORD};
use pawcursor_tracking_model::sample::TimestampNs;
use pawcursor_tracking_model::target::TargetId;

/// Wraps a sink and drops moves arriving within `min_interval` of the last
/// forwarded one. Clicks, retracts and target lookups always pass.
pub struct ThrottledSink<S> {
    inner: S,
    gate: RateController,
    now_ns: TimestampNs,
    dropped: u64,
}

impl<S: OutputSink> ThrottledSink<S> {
    pub fn new(inner: S, min_interval_ms: u64) -> Self {
        Self {
            inner,
            gate: RateController::with_interval_ns(SessionClock::ms_to_ns(min_interval_ms)),
            now_ns: 0,
            dropped: 0,
        }
    }

    pub fn dropped_moves(&self) -> u64 {
        self.dropped
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn admit_move(&mut self, x: f64, y: f64) -> bool {
        if x == RETRACT_COORD && y == RETRACT_COORD {
            return true;
        }
        self.gate.should_tick(self.now_ns)
    }
}

impl<S: OutputSink> OutputSink for ThrottledSink<S> {
    fn on_tick(&mut self, timestamp_ns: TimestampNs) {
        self.now_ns = timestamp_ns;
        self.inner.on_tick(timestamp_ns);
    }

    fn move_to(&mut self, x: f64, y: f64) -> PawcursorResult<()> {
        if self.admit_move(x, y) {
            self.inner.move_to(x, y)
        } else {
            self.dropped += 1;
            tracing::trace!(t = self.now_ns, "move throttled");
            Ok(())
        }
    }

    fn click(&mut self) -> PawcursorResult<()> {
        self.inner.click()
    }

    fn resolve_target_at(&mut self, x: f64, y: f64) -> PawcursorResult<Option<TargetId>> {
        self.inner.resolve_target_at(x, y)
    }

    fn ensure_ready(&mut self) -> PawcursorResult<()> {
        self.inner.ensure_ready()
    }

    fn close(&mut self) -> PawcursorResult<()> {
        if self.dropped > 0 {
            tracing::debug!(sink = self.inner.name(), dropped = self.dropped, "throttled moves");
        }
        self.inner.close()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
