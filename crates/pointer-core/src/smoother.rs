//! Rate-limited exponential pointer smoothing.
//!
//! Each tick the pointer moves toward the normalized target: the raw delta
//! is first capped per axis by a velocity budget (`velocity_cap * dt`), then
//! scaled by an exponential gain `alpha`. Within the cap envelope a fixed
//! target is approached geometrically with ratio `1 - alpha` per tick; a
//! detector that jumps across the frame can never drag the pointer faster
//! than `velocity_cap`.

use pawcursor_common::clock::SessionClock;
use pawcursor_common::config::{Dimensions, PointerOrigin, TrackingConfig};
use pawcursor_tracking_model::sample::TimestampNs;

use crate::normalize::NormalizedPoint;

/// Floor for the per-tick elapsed time, in seconds.
///
/// Covers the first tick and duplicate timestamps.
pub const MIN_DT_SECS: f64 = 1e-3;

/// Current pointer position in output coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
    /// Timestamp of the last tick seen, moving or idle.
    pub last_tick_ns: Option<TimestampNs>,
}

/// Smoother parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmootherConfig {
    /// Gain in `(0, 1]` applied to the capped delta.
    pub alpha: f64,
    /// Max speed per axis, output px/sec.
    pub velocity_cap: f64,
    /// Output surface size.
    pub output_size: Dimensions,
    pub origin: PointerOrigin,
}

impl SmootherConfig {
    pub fn from_tracking(config: &TrackingConfig) -> Self {
        Self {
            alpha: config.alpha,
            velocity_cap: config.velocity_cap,
            output_size: config.output_size,
            origin: config.pointer_origin,
        }
    }
}

/// Owner of the pointer state.
#[derive(Debug, Clone)]
pub struct RateLimitedSmoother {
    config: SmootherConfig,
    /// `None` only before the first detection with `PointerOrigin::FirstDetection`.
    state: Option<PointerState>,
    /// Tick time seen before the pointer existed.
    pending_tick_ns: Option<TimestampNs>,
}

impl RateLimitedSmoother {
    pub fn new(config: SmootherConfig) -> Self {
        let state = match config.origin {
            PointerOrigin::Center => Some(PointerState {
                x: config.output_size.width as f64 / 2.0,
                y: config.output_size.height as f64 / 2.0,
                last_tick_ns: None,
            }),
            PointerOrigin::FirstDetection => None,
        };
        Self {
            config,
            state,
            pending_tick_ns: None,
        }
    }

    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    /// Current pointer position, if one exists yet.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.state.map(|s| (s.x, s.y))
    }

    /// Advance the pointer one tick toward `target` and return its new
    /// position.
    pub fn step(&mut self, target: NormalizedPoint, timestamp_ns: TimestampNs) -> (f64, f64) {
        let tx = target.nx * self.config.output_size.width as f64;
        let ty = target.ny * self.config.output_size.height as f64;

        let Some(state) = self.state.as_mut() else {
            // First detection with no origin: snap to it.
            self.state = Some(PointerState {
                x: tx,
                y: ty,
                last_tick_ns: Some(timestamp_ns),
            });
            self.pending_tick_ns = None;
            return (tx, ty);
        };

        let last = state.last_tick_ns.or(self.pending_tick_ns.take());
        let dt = elapsed_secs(last, timestamp_ns);
        let max_step = self.config.velocity_cap * dt;

        let dx = (tx - state.x).clamp(-max_step, max_step);
        let dy = (ty - state.y).clamp(-max_step, max_step);

        state.x += self.config.alpha * dx;
        state.y += self.config.alpha * dy;
        state.last_tick_ns = Some(timestamp_ns);

        tracing::trace!(
            x = state.x,
            y = state.y,
            target_x = tx,
            target_y = ty,
            dt,
            "pointer step"
        );

        (state.x, state.y)
    }

    /// Record a tick without a detection. The pointer holds its position;
    /// only the tick time advances so the next step's budget reflects one
    /// frame interval.
    pub fn mark_idle(&mut self, timestamp_ns: TimestampNs) {
        match self.state.as_mut() {
            Some(state) => state.last_tick_ns = Some(timestamp_ns),
            None => self.pending_tick_ns = Some(timestamp_ns),
        }
    }
}

/// Seconds between two ticks, floored at [`MIN_DT_SECS`].
pub fn elapsed_secs(last_ns: Option<TimestampNs>, now_ns: TimestampNs) -> f64 {
    let dt = match last_ns {
        Some(last) => SessionClock::ns_to_secs(now_ns.saturating_sub(last)),
        None => 0.0,
    };
    dt.max(MIN_DT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(alpha: f64, velocity_cap: f64) -> SmootherConfig {
        SmootherConfig {
            alpha,
            velocity_cap,
            output_size: Dimensions::new(1920, 1080),
            origin: PointerOrigin::Center,
        }
    }

    fn smoother_at(config: SmootherConfig, x: f64, y: f64, t: TimestampNs) -> RateLimitedSmoother {
        let mut smoother = RateLimitedSmoother::new(config);
        smoother.state = Some(PointerState {
            x,
            y,
            last_tick_ns: Some(t),
        });
        smoother
    }

    fn target_px(x: f64, y: f64) -> NormalizedPoint {
        NormalizedPoint {
            nx: x / 1920.0,
            ny: y / 1080.0,
        }
    }

    #[test]
    fn center_origin_starts_mid_screen() {
        let smoother = RateLimitedSmoother::new(config(0.35, 1600.0));
        assert_eq!(smoother.position(), Some((960.0, 540.0)));
    }

    #[test]
    fn capped_step_matches_reference_values() {
        // max_step = 1600 * 0.033 = 52.8, then 0.35 * 52.8 = 18.48
        let mut smoother = smoother_at(config(0.35, 1600.0), 0.0, 0.0, 0);
        let (x, y) = smoother.step(target_px(1000.0, 0.0), 33_000_000);
        assert!((x - 18.48).abs() < 1e-9, "x={x}");
        assert_eq!(y, 0.0);
    }

    #[test]
    fn axes_are_capped_independently() {
        let mut smoother = smoother_at(config(1.0, 1000.0), 0.0, 0.0, 0);
        // budget 10px; x wants 500, y wants 4
        let (x, y) = smoother.step(target_px(500.0, 4.0), 10_000_000);
        assert!((x - 10.0).abs() < 1e-9);
        assert!((y - 4.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_timestamp_uses_minimum_dt() {
        let mut smoother = smoother_at(config(1.0, 1600.0), 0.0, 0.0, 5_000);
        let (x, _) = smoother.step(target_px(1000.0, 0.0), 5_000);
        assert!((x - 1.6).abs() < 1e-9);
        assert!(x.is_finite());
    }

    #[test]
    fn first_detection_origin_snaps() {
        let mut smoother = RateLimitedSmoother::new(SmootherConfig {
            origin: PointerOrigin::FirstDetection,
            ..config(0.3, 1600.0)
        });
        assert_eq!(smoother.position(), None);
        let (x, y) = smoother.step(target_px(300.0, 200.0), 0);
        assert!((x - 300.0).abs() < 1e-9);
        assert!((y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn idle_tick_holds_position_and_resets_budget() {
        let mut smoother = smoother_at(config(1.0, 1000.0), 0.0, 0.0, 0);
        // A long absence followed by one frame interval.
        smoother.mark_idle(5_000_000_000);
        assert_eq!(smoother.position(), Some((0.0, 0.0)));
        let (x, _) = smoother.step(target_px(1900.0, 0.0), 5_033_000_000);
        assert!((x - 33.0).abs() < 1e-6, "x={x}");
    }

    #[test]
    fn converges_geometrically_without_cap() {
        let alpha = 0.35;
        let mut smoother = smoother_at(config(alpha, 1.0e9), 0.0, 0.0, 0);
        let target = target_px(800.0, 600.0);
        let initial = 800.0f64.hypot(600.0);
        for n in 1..=20u64 {
            let (x, y) = smoother.step(target, n * 33_000_000);
            let remaining = (800.0 - x).hypot(600.0 - y);
            assert!(remaining <= (1.0 - alpha).powi(n as i32) * initial + 1e-9);
        }
    }

    proptest! {
        #[test]
        fn displacement_never_exceeds_budget(
            alpha in 0.01f64..=1.0,
            cap in 10.0f64..5000.0,
            steps in proptest::collection::vec((0.0f64..=1.0, 0.0f64..=1.0, 0u64..100_000_000), 1..40),
        ) {
            let mut smoother = smoother_at(config(alpha, cap), 960.0, 540.0, 0);
            let mut t = 0u64;
            let mut prev = (960.0, 540.0);
            for (nx, ny, gap) in steps {
                let last = t;
                t += gap;
                let budget = cap * elapsed_secs(Some(last), t);
                let next = smoother.step(NormalizedPoint { nx, ny }, t);
                prop_assert!((next.0 - prev.0).abs() <= budget + 1e-9);
                prop_assert!((next.1 - prev.1).abs() <= budget + 1e-9);
                prev = next;
            }
        }
    }
}
