//! Detection coordinate normalization.
//!
//! Maps a raw detection point into the unit square with an inward margin.
//! Points inside the margin band saturate to the nearest edge, which gives
//! a dead zone near frame borders where detectors jitter the most.

use pawcursor_common::config::Dimensions;
use pawcursor_tracking_model::sample::{CoordinateSpace, Point2D};

/// A point in `[0, 1] × [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    pub nx: f64,
    pub ny: f64,
}

/// Margin-aware mapping from source coordinates to the unit square.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    margin: f64,
    frame_w: f64,
    frame_h: f64,
}

impl Normalizer {
    /// `margin` must be in `[0, 0.5)` and `frame` non-empty; both are
    /// checked once by `TrackingConfig::validate`, not per tick.
    pub fn new(margin: f64, frame: Dimensions) -> Self {
        Self {
            margin,
            frame_w: frame.width as f64,
            frame_h: frame.height as f64,
        }
    }

    /// Express a point as frame fractions without margin or clamping.
    pub fn to_fractional(&self, point: Point2D, space: CoordinateSpace) -> Point2D {
        match space {
            CoordinateSpace::Fractional => point,
            CoordinateSpace::Pixels => Point2D::new(point.x / self.frame_w, point.y / self.frame_h),
        }
    }

    /// Map a raw point into the unit square.
    pub fn normalize(&self, point: Point2D, space: CoordinateSpace) -> NormalizedPoint {
        let frac = self.to_fractional(point, space);
        NormalizedPoint {
            nx: self.remap(frac.x),
            ny: self.remap(frac.y),
        }
    }

    fn remap(&self, fraction: f64) -> f64 {
        let span = 1.0 - 2.0 * self.margin;
        let value = (fraction - self.margin) / span;
        // NaN from a broken detector lands on the near edge rather than
        // propagating into the pointer state.
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, 1.0)
    }
}
