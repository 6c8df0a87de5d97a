//! Color-blob adapter.
//!
//! The segmenter thresholds the frame in HSV, cleans the mask and reports
//! each external contour's area and raw image moments. The largest
//! sufficiently big contour is the detection; its centroid is
//! `(m10 / m00, m01 / m00)`, divided by the segmented frame's size.

use pawcursor_common::config::Dimensions;
use pawcursor_common::error::{PawcursorError, PawcursorResult};
use pawcursor_tracking_model::sample::{Detection, Sample, TimestampNs};

use crate::{Detector, DetectorKind};

/// Area and raw moments of one contour, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobMoments {
    pub area: f64,
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl BlobMoments {
    /// Centroid, or `None` for a degenerate contour.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Segmenter output for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobFrame {
    pub timestamp_ns: TimestampNs,
    /// Size of the segmented frame in pixels.
    pub frame_size: Dimensions,
    pub blobs: Vec<BlobMoments>,
}

/// The external color-mask segmenter.
pub trait ColorBlobSource: Send {
    fn next_frame(&mut self) -> PawcursorResult<Option<BlobFrame>>;

    fn release(&mut self) {}
}

/// Detector over a [`ColorBlobSource`].
pub struct ColorBlobDetector<S> {
    source: S,
    min_area: f64,
}

impl<S: ColorBlobSource> ColorBlobDetector<S> {
    pub const DEFAULT_MIN_AREA: f64 = 2000.0;

    pub fn new(source: S) -> Self {
        Self {
            source,
            min_area: Self::DEFAULT_MIN_AREA,
        }
    }

    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.min_area = min_area;
        self
    }

    fn detect(&self, blobs: &[BlobMoments], frame: Dimensions) -> Option<Detection> {
        let (blob, (cx, cy)) = blobs
            .iter()
            .filter(|b| b.area >= self.min_area)
            .filter_map(|b| b.centroid().map(|c| (b, c)))
            .max_by(|(a, _), (b, _)| a.area.total_cmp(&b.area))?;

        tracing::trace!(area = blob.area, cx, cy, "color blob");
        Some(Detection::fractional(
            cx / frame.width as f64,
            cy / frame.height as f64,
        ))
    }
}

impl<S: ColorBlobSource> Detector for ColorBlobDetector<S> {
    fn next(&mut self) -> PawcursorResult<Option<Sample>> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(None);
        };
        if frame.frame_size.is_empty() {
            return Err(PawcursorError::detector(format!(
                "segmenter reported an empty {}x{} frame",
                frame.frame_size.width, frame.frame_size.height
            )));
        }
        Ok(Some(Sample {
            timestamp_ns: frame.timestamp_ns,
            detection: self.detect(&frame.blobs, frame.frame_size),
        }))
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::ColorBlob
    }

    fn release(&mut self) {
        self.source.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawcursor_tracking_model::sample::{CoordinateSpace, Point2D};

    const SVGA: Dimensions = Dimensions::new(800, 600);

    struct Masks(Vec<BlobFrame>);

    impl ColorBlobSource for Masks {
        fn next_frame(&mut self) -> PawcursorResult<Option<BlobFrame>> {
            if self.0.is_empty() {
                return Ok(None);
            }
            Ok(Some(self.0.remove(0)))
        }
    }

    fn blob(area: f64, cx: f64, cy: f64) -> BlobMoments {
        BlobMoments {
            area,
            m00: area,
            m10: cx * area,
            m01: cy * area,
        }
    }

    #[test]
    fn largest_blob_wins() {
        let mut det = ColorBlobDetector::new(Masks(vec![BlobFrame {
            timestamp_ns: 3,
            frame_size: SVGA,
            blobs: vec![blob(2500.0, 10.0, 20.0), blob(9000.0, 200.0, 450.0), blob(4000.0, 1.0, 1.0)],
        }]));
        let detection = det.next().unwrap().unwrap().detection.unwrap();
        assert_eq!(detection.point, Point2D::new(0.25, 0.75));
        assert_eq!(detection.space, CoordinateSpace::Fractional);
    }

    #[test]
    fn small_and_degenerate_blobs_are_ignored() {
        let degenerate = BlobMoments {
            area: 50_000.0,
            m00: 0.0,
            m10: 1.0,
            m01: 1.0,
        };
        let mut det = ColorBlobDetector::new(Masks(vec![BlobFrame {
            timestamp_ns: 3,
            frame_size: SVGA,
            blobs: vec![blob(1999.0, 10.0, 20.0), degenerate],
        }]));
        assert!(!det.next().unwrap().unwrap().is_present());
        assert!(det.next().unwrap().is_none());
    }

    #[test]
    fn min_area_is_configurable() {
        let mut det = ColorBlobDetector::new(Masks(vec![BlobFrame {
            timestamp_ns: 0,
            frame_size: SVGA,
            blobs: vec![blob(500.0, 5.0, 5.0)],
        }]))
        .with_min_area(100.0);
        assert!(det.next().unwrap().unwrap().is_present());
    }

    #[test]
    fn empty_frame_size_is_a_detector_error() {
        let mut det = ColorBlobDetector::new(Masks(vec![BlobFrame {
            timestamp_ns: 0,
            frame_size: Dimensions::new(640, 0),
            blobs: vec![blob(9000.0, 5.0, 5.0)],
        }]));
        assert!(matches!(
            det.next().unwrap_err(),
            PawcursorError::Detector { .. }
        ));
    }
}
