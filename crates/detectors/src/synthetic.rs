//! Synthetic detection source for dry runs without a camera.
//!
//! Tours the four corners of the frame: travel to a corner, dwell there
//! with a pinch in the middle of the dwell, move on. Each lap ends with a
//! run of empty frames so hold/retract behavior is exercised too.
//! Seeded jitter imitates detector noise.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pawcursor_common::error::PawcursorResult;
use pawcursor_tracking_model::sample::{Detection, Sample, TimestampNs};

use crate::{Detector, DetectorKind};

/// Corner positions in frame fractions, clockwise from top-left.
const CORNERS: [(f64, f64); 4] = [(0.2, 0.2), (0.8, 0.2), (0.8, 0.8), (0.2, 0.8)];

/// Fingertip gap while the hand is open / pinched.
const OPEN_GAP: f64 = 0.09;
const PINCHED_GAP: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    pub fps: u32,
    /// Frames spent moving between corners.
    pub travel_frames: u32,
    /// Frames spent resting on each corner.
    pub dwell_frames: u32,
    /// Empty frames at the end of each lap.
    pub gap_frames: u32,
    pub laps: u32,
    /// Peak jitter in frame fractions.
    pub jitter: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            travel_frames: 30,
            dwell_frames: 75,
            gap_frames: 20,
            laps: 2,
            jitter: 0.004,
            seed: 0x5eed,
        }
    }
}

impl SyntheticConfig {
    fn frames_per_lap(&self) -> u64 {
        (self.travel_frames as u64 + self.dwell_frames as u64) * CORNERS.len() as u64
            + self.gap_frames as u64
    }

    pub fn total_frames(&self) -> u64 {
        self.frames_per_lap() * self.laps as u64
    }
}

pub struct SyntheticDetector {
    config: SyntheticConfig,
    frame: u64,
    rng: StdRng,
}

impl SyntheticDetector {
    pub fn new(config: SyntheticConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            frame: 0,
            rng,
        }
    }

    fn frame_interval_ns(&self) -> u64 {
        1_000_000_000 / self.config.fps.max(1) as u64
    }

    fn noise(&mut self) -> f64 {
        self.rng.random_range(-1.0..=1.0)
    }

    fn detection_at(&mut self, frame_in_lap: u64) -> Option<Detection> {
        let travel = self.config.travel_frames as u64;
        let dwell = self.config.dwell_frames as u64;
        let leg = travel + dwell;
        let corner = (frame_in_lap / leg) as usize;
        if corner >= CORNERS.len() {
            return None;
        }

        let within = frame_in_lap % leg;
        let from = CORNERS[(corner + CORNERS.len() - 1) % CORNERS.len()];
        let to = CORNERS[corner];

        let (x, y, gap) = if within < travel {
            let t = (within + 1) as f64 / travel as f64;
            let eased = t * t * (3.0 - 2.0 * t);
            (
                from.0 + (to.0 - from.0) * eased,
                from.1 + (to.1 - from.1) * eased,
                OPEN_GAP,
            )
        } else {
            let rest = within - travel;
            let pinched = rest >= dwell / 3 && rest < 2 * dwell / 3;
            (to.0, to.1, if pinched { PINCHED_GAP } else { OPEN_GAP })
        };

        let jitter = self.config.jitter;
        let (jx, jy) = (self.noise() * jitter, self.noise() * jitter);
        Some(
            Detection::fractional(x + jx, y + jy)
                .with_confidence(0.95)
                .with_companion(x + jx + gap, y + jy),
        )
    }
}

impl Detector for SyntheticDetector {
    fn next(&mut self) -> PawcursorResult<Option<Sample>> {
        if self.frame >= self.config.total_frames() {
            return Ok(None);
        }
        let frame_in_lap = self.frame % self.config.frames_per_lap();
        let timestamp_ns: TimestampNs = self.frame * self.frame_interval_ns();
        let detection = self.detection_at(frame_in_lap);
        self.frame += 1;
        Ok(Some(Sample {
            timestamp_ns,
            detection,
        }))
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Synthetic
    }
}
