//! Per-frame detection samples.
//!
//! A [`Sample`] is produced once per acquired frame. It either carries a
//! [`Detection`] or nothing; a sample without a detection is the normal
//! "feature not found this frame" signal, not an error.

use serde::{Deserialize, Serialize};

/// Monotonic timestamp in nanoseconds since session start.
pub type TimestampNs = u64;

/// A 2-D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Coordinate space a detector reports its points in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// Pixels of the source frame, `[0, frame_w] × [0, frame_h]`.
    #[default]
    Pixels,
    /// Already divided by the frame size, `[0, 1] × [0, 1]`.
    Fractional,
}

/// A single feature found in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// The feature that drives the pointer.
    pub point: Point2D,

    #[serde(default)]
    pub space: CoordinateSpace,

    /// Detector score, when the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Second tracked feature (e.g. thumb tip) used for pinch distance,
    /// in the same coordinate space as `point`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companion: Option<Point2D>,
}

impl Detection {
    /// A detection in source-frame pixels.
    pub fn pixels(x: f64, y: f64) -> Self {
        Self {
            point: Point2D::new(x, y),
            space: CoordinateSpace::Pixels,
            confidence: None,
            companion: None,
        }
    }

    /// A detection already expressed as frame fractions.
    pub fn fractional(x: f64, y: f64) -> Self {
        Self {
            point: Point2D::new(x, y),
            space: CoordinateSpace::Fractional,
            confidence: None,
            companion: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_companion(mut self, x: f64, y: f64) -> Self {
        self.companion = Some(Point2D::new(x, y));
        self
    }
}

/// What one frame tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Acquisition time of the frame.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// `None` when no feature was found in the frame.
    #[serde(default)]
    pub detection: Option<Detection>,
}

impl Sample {
    pub fn detected(timestamp_ns: TimestampNs, detection: Detection) -> Self {
        Self {
            timestamp_ns,
            detection: Some(detection),
        }
    }

    pub fn absent(timestamp_ns: TimestampNs) -> Self {
        Self {
            timestamp_ns,
            detection: None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.detection.is_some()
    }
}

/// Parse one JSONL line. Blank lines and `#` comments yield `None`.
pub fn parse_sample_line(line: &str) -> Option<Result<Sample, serde_json::Error>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(serde_json::from_str(trimmed))
}
