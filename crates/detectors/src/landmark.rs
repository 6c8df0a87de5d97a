//! Hand landmark adapter.
//!
//! A landmark model reports, per frame, zero or more hands with 21
//! landmarks in frame fractions. The index fingertip drives the pointer;
//! the thumb tip is the pinch companion.

use pawcursor_common::error::PawcursorResult;
use pawcursor_tracking_model::sample::{Detection, Point2D, Sample, TimestampNs};

use crate::{Detector, DetectorKind};

/// Index fingertip in the 21-point hand topology.
pub const INDEX_FINGER_TIP: usize = 8;
/// Thumb tip in the 21-point hand topology.
pub const THUMB_TIP: usize = 4;

/// One hand reported by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    /// Landmarks in frame fractions.
    pub landmarks: Vec<Point2D>,
    /// Detection/tracking score in `[0, 1]`.
    pub score: f64,
}

/// Model output for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    pub timestamp_ns: TimestampNs,
    pub hands: Vec<Hand>,
}

/// The external landmark model.
pub trait HandLandmarkSource: Send {
    /// Next processed frame, `None` when the stream has ended.
    fn next_frame(&mut self) -> PawcursorResult<Option<HandFrame>>;

    fn release(&mut self) {}
}

/// Detector over a [`HandLandmarkSource`].
pub struct LandmarkDetector<S> {
    source: S,
    min_score: f64,
}

impl<S: HandLandmarkSource> LandmarkDetector<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            min_score: 0.7,
        }
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    fn detect(&self, frame: &HandFrame) -> Option<Detection> {
        let hand = frame.hands.iter().find(|h| h.score >= self.min_score)?;
        let Some(tip) = hand.landmarks.get(INDEX_FINGER_TIP) else {
            tracing::warn!(
                landmarks = hand.landmarks.len(),
                "hand is missing the pointer landmark"
            );
            return None;
        };

        let mut detection = Detection::fractional(tip.x, tip.y).with_confidence(hand.score);
        if let Some(companion) = hand.landmarks.get(THUMB_TIP) {
            detection = detection.with_companion(companion.x, companion.y);
        }
        Some(detection)
    }
}

impl<S: HandLandmarkSource> Detector for LandmarkDetector<S> {
    fn next(&mut self) -> PawcursorResult<Option<Sample>> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(None);
        };
        Ok(Some(Sample {
            timestamp_ns: frame.timestamp_ns,
            detection: self.detect(&frame),
        }))
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Landmark
    }

    fn release(&mut self) {
        self.source.release();
    }
}
