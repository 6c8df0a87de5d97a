//! pawcursor Detectors
//!
//! Adapts per-frame detector backends to one [`Detector`] trait so the
//! pointer pipeline is written once:
//!
//! - **Landmark:** hand landmark model, index fingertip + thumb tip
//! - **Template match:** correlation peak of a template over the frame
//! - **Color blob:** centroid of the largest color-mask contour
//! - **Replay:** recorded samples from JSONL
//! - **Synthetic:** scripted corner tour for dry runs
//!
//! The model, matcher and segmenter themselves are external; each adapter
//! consumes a small source trait describing what that backend reports.

pub mod color_blob;
pub mod landmark;
pub mod replay;
pub mod synthetic;
pub mod template_match;

use serde::{Deserialize, Serialize};

use pawcursor_common::error::PawcursorResult;
use pawcursor_tracking_model::sample::Sample;

pub use color_blob::{BlobFrame, BlobMoments, ColorBlobDetector, ColorBlobSource};
pub use landmark::{Hand, HandFrame, HandLandmarkSource, LandmarkDetector};
pub use replay::ReplayDetector;
pub use synthetic::{SyntheticConfig, SyntheticDetector};
pub use template_match::{MatchFrame, MatchPeak, TemplateMatchDetector, TemplateMatchSource};

/// Which kind of backend a detector adapts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    Landmark,
    TemplateMatch,
    ColorBlob,
    Replay,
    Synthetic,
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Landmark => "landmark",
            Self::TemplateMatch => "template_match",
            Self::ColorBlob => "color_blob",
            Self::Replay => "replay",
            Self::Synthetic => "synthetic",
        };
        f.write_str(name)
    }
}

/// Trait for detector adapters.
///
/// Called exactly once per tick by the tracking loop.
pub trait Detector: Send {
    /// Acquire the next frame and report what was found in it.
    ///
    /// `Ok(None)` means the source is exhausted. `Err` is an acquisition
    /// failure and ends the session.
    fn next(&mut self) -> PawcursorResult<Option<Sample>>;

    fn kind(&self) -> DetectorKind;

    /// Release the underlying device or file. Called once on every exit
    /// path of the session.
    fn release(&mut self) {}
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn next(&mut self) -> PawcursorResult<Option<Sample>> {
        (**self).next()
    }

    fn kind(&self) -> DetectorKind {
        (**self).kind()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
