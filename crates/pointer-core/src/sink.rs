//! Output sink contract and bounded-retry delivery.
//!
//! A sink is whatever surface receives the pointer: the OS cursor, a
//! remote page, a log file. Sink failures never stop the pipeline: a failed
//! call triggers one `ensure_ready()` and one retry, after which the output
//! for that tick is dropped.

use pawcursor_common::error::PawcursorResult;
use pawcursor_tracking_model::sample::TimestampNs;
use pawcursor_tracking_model::target::TargetId;

/// Off-screen coordinate used to retract the pointer.
pub const RETRACT_COORD: f64 = -9999.0;

/// Trait for pointer output surfaces.
pub trait OutputSink {
    /// Called at the start of every tick with the sample's timestamp,
    /// before any other call for that tick.
    fn on_tick(&mut self, _timestamp_ns: TimestampNs) {}

    /// Move the pointer to output coordinates.
    fn move_to(&mut self, x: f64, y: f64) -> PawcursorResult<()>;

    /// Click at the current pointer position.
    fn click(&mut self) -> PawcursorResult<()>;

    /// Identity of whatever lies at `(x, y)`, if anything.
    ///
    /// Only the dwell click uses this; sinks without a notion of targets
    /// keep the default.
    fn resolve_target_at(&mut self, _x: f64, _y: f64) -> PawcursorResult<Option<TargetId>> {
        Ok(None)
    }

    /// Re-initialize the surface after a failure (re-inject, reconnect).
    fn ensure_ready(&mut self) -> PawcursorResult<()> {
        Ok(())
    }

    /// Release the surface. Called once when the session ends.
    fn close(&mut self) -> PawcursorResult<()> {
        Ok(())
    }

    /// Sink name for logging.
    fn name(&self) -> &str;
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn on_tick(&mut self, timestamp_ns: TimestampNs) {
        (**self).on_tick(timestamp_ns)
    }

    fn move_to(&mut self, x: f64, y: f64) -> PawcursorResult<()> {
        (**self).move_to(x, y)
    }

    fn click(&mut self) -> PawcursorResult<()> {
        (**self).click()
    }

    fn resolve_target_at(&mut self, x: f64, y: f64) -> PawcursorResult<Option<TargetId>> {
        (**self).resolve_target_at(x, y)
    }

    fn ensure_ready(&mut self) -> PawcursorResult<()> {
        (**self).ensure_ready()
    }

    fn close(&mut self) -> PawcursorResult<()> {
        (**self).close()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Result of a guarded sink call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery<T> {
    /// Succeeded on the first attempt.
    Delivered(T),
    /// Succeeded after `ensure_ready()` and one retry.
    Recovered(T),
    /// Dropped for this tick.
    Dropped,
}

impl<T> Delivery<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Self::Delivered(v) | Self::Recovered(v) => Some(v),
            Self::Dropped => None,
        }
    }

    /// Whether at least one attempt failed.
    pub fn had_failure(&self) -> bool {
        !matches!(self, Self::Delivered(_))
    }
}

/// Run `call` against the sink with the bounded-retry policy.
pub fn deliver<S, T, F>(sink: &mut S, op: &'static str, mut call: F) -> Delivery<T>
where
    S: OutputSink + ?Sized,
    F: FnMut(&mut S) -> PawcursorResult<T>,
{
    let first = match call(&mut *sink) {
        Ok(value) => return Delivery::Delivered(value),
        Err(e) => e,
    };

    tracing::warn!(sink = %sink.name(), op, error = %first, "Sink call failed, re-initializing");

    if let Err(e) = sink.ensure_ready() {
        tracing::warn!(sink = %sink.name(), op, error = %e, "Sink re-initialization failed, dropping output");
        return Delivery::Dropped;
    }

    match call(&mut *sink) {
        Ok(value) => Delivery::Recovered(value),
        Err(e) => {
            tracing::warn!(sink = %sink.name(), op, error = %e, "Sink retry failed, dropping output");
            Delivery::Dropped
        }
    }
}
