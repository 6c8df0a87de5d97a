//! Template-match adapter.
//!
//! The matcher slides a template over the grayscale frame and reports the
//! best normalized-correlation peak. A peak at or above the threshold is a
//! detection at the template's center, reported as a fraction of the
//! frame the matcher actually saw.

use pawcursor_common::config::Dimensions;
use pawcursor_common::error::{PawcursorError, PawcursorResult};
use pawcursor_tracking_model::sample::{Detection, Sample, TimestampNs};

use crate::{Detector, DetectorKind};

/// Best match location for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPeak {
    /// Normalized correlation score.
    pub score: f64,
    /// Top-left corner of the matched window, in frame pixels.
    pub top_left: (u32, u32),
}

/// Matcher output for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchFrame {
    pub timestamp_ns: TimestampNs,
    /// Size of the searched frame in pixels.
    pub frame_size: Dimensions,
    /// `None` when the matcher produced no response (frame smaller than
    /// the template).
    pub peak: Option<MatchPeak>,
}

/// The external template matcher.
pub trait TemplateMatchSource: Send {
    fn next_frame(&mut self) -> PawcursorResult<Option<MatchFrame>>;

    fn release(&mut self) {}
}

/// Detector over a [`TemplateMatchSource`].
pub struct TemplateMatchDetector<S> {
    source: S,
    template_size: Dimensions,
    threshold: f64,
}

impl<S: TemplateMatchSource> TemplateMatchDetector<S> {
    pub const DEFAULT_THRESHOLD: f64 = 0.45;

    pub fn new(source: S, template_size: Dimensions) -> Self {
        Self {
            source,
            template_size,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    /// Lower reacts to weaker matches, higher suppresses false positives.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    fn detect(&self, peak: MatchPeak, frame: Dimensions) -> Option<Detection> {
        if peak.score < self.threshold {
            return None;
        }
        let cx = peak.top_left.0 + self.template_size.width / 2;
        let cy = peak.top_left.1 + self.template_size.height / 2;
        Some(
            Detection::fractional(
                cx as f64 / frame.width as f64,
                cy as f64 / frame.height as f64,
            )
            .with_confidence(peak.score),
        )
    }
}

impl<S: TemplateMatchSource> Detector for TemplateMatchDetector<S> {
    fn next(&mut self) -> PawcursorResult<Option<Sample>> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(None);
        };
        if frame.frame_size.is_empty() {
            return Err(PawcursorError::detector(format!(
                "template matcher reported an empty {}x{} frame",
                frame.frame_size.width, frame.frame_size.height
            )));
        }
        let detection = frame
            .peak
            .and_then(|peak| self.detect(peak, frame.frame_size));
        if let Some(peak) = frame.peak {
            tracing::trace!(score = peak.score, found = detection.is_some(), "template peak");
        }
        Ok(Some(Sample {
            timestamp_ns: frame.timestamp_ns,
            detection,
        }))
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::TemplateMatch
    }

    fn release(&mut self) {
        self.source.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawcursor_tracking_model::sample::{CoordinateSpace, Point2D};

    struct Peaks(Vec<MatchFrame>);

    impl TemplateMatchSource for Peaks {
        fn next_frame(&mut self) -> PawcursorResult<Option<MatchFrame>> {
            if self.0.is_empty() {
                return Ok(None);
            }
            Ok(Some(self.0.remove(0)))
        }
    }

    const VGA: Dimensions = Dimensions::new(640, 480);

    fn frame(t: TimestampNs, score: f64, top_left: (u32, u32)) -> MatchFrame {
        MatchFrame {
            timestamp_ns: t,
            frame_size: VGA,
            peak: Some(MatchPeak { score, top_left }),
        }
    }

    #[test]
    fn peak_above_threshold_reports_template_center() {
        let mut det = TemplateMatchDetector::new(
            Peaks(vec![frame(5, 0.8, (128, 216))]),
            Dimensions::new(64, 48),
        );
        let detection = det.next().unwrap().unwrap().detection.unwrap();
        assert_eq!(detection.point, Point2D::new(0.25, 0.5));
        assert_eq!(detection.space, CoordinateSpace::Fractional);
        assert_eq!(detection.confidence, Some(0.8));
    }

    #[test]
    fn center_follows_the_reported_frame_size() {
        let mut det = TemplateMatchDetector::new(
            Peaks(vec![MatchFrame {
                timestamp_ns: 0,
                frame_size: Dimensions::new(320, 200),
                peak: Some(MatchPeak {
                    score: 0.9,
                    top_left: (150, 90),
                }),
            }]),
            Dimensions::new(20, 20),
        );
        let detection = det.next().unwrap().unwrap().detection.unwrap();
        assert_eq!(detection.point, Point2D::new(0.5, 0.5));
    }

    #[test]
    fn empty_frame_size_is_a_detector_error() {
        let mut det = TemplateMatchDetector::new(
            Peaks(vec![MatchFrame {
                timestamp_ns: 0,
                frame_size: Dimensions::new(0, 480),
                peak: None,
            }]),
            Dimensions::new(10, 10),
        );
        let err = det.next().unwrap_err();
        assert!(matches!(err, PawcursorError::Detector { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn weak_peak_and_missing_response_are_absent() {
        let mut det = TemplateMatchDetector::new(
            Peaks(vec![
                frame(1, 0.44, (0, 0)),
                MatchFrame {
                    timestamp_ns: 2,
                    frame_size: VGA,
                    peak: None,
                },
            ]),
            Dimensions::new(10, 10),
        );
        let weak = det.next().unwrap().unwrap();
        assert_eq!(weak.timestamp_ns, 1);
        assert!(!weak.is_present());
        assert!(!det.next().unwrap().unwrap().is_present());
        assert!(det.next().unwrap().is_none());
    }

    #[test]
    fn threshold_is_inclusive_and_configurable() {
        let mut det = TemplateMatchDetector::new(
            Peaks(vec![frame(1, 0.65, (0, 0)), frame(2, 0.6, (0, 0))]),
            Dimensions::new(10, 10),
        )
        .with_threshold(0.65);
        assert!(det.next().unwrap().unwrap().is_present());
        assert!(!det.next().unwrap().unwrap().is_present());
    }
}
