//! Pinch-distance click with hysteresis.
//!
//! Two thresholds form a dead band: the click fires when the distance
//! drops below `on` and re-arms only after it rises above `off`. A noisy
//! distance hovering around a single threshold therefore never chatters.

/// Pinch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinchState {
    #[default]
    Idle,
    Clicking,
}

#[derive(Debug, Clone)]
pub struct PinchClickDetector {
    on_threshold: f64,
    off_threshold: f64,
    state: PinchState,
}

impl PinchClickDetector {
    /// `off_threshold` must exceed `on_threshold`
    /// (enforced by `TrackingConfig::validate`).
    pub fn new(on_threshold: f64, off_threshold: f64) -> Self {
        Self {
            on_threshold,
            off_threshold,
            state: PinchState::Idle,
        }
    }

    pub fn state(&self) -> PinchState {
        self.state
    }

    /// Feed one distance measurement. Returns `true` when a click must be
    /// emitted (exactly on the `Idle -> Clicking` transition).
    pub fn update(&mut self, distance: f64) -> bool {
        match self.state {
            PinchState::Idle if distance < self.on_threshold => {
                self.state = PinchState::Clicking;
                tracing::debug!(distance, "pinch closed");
                true
            }
            PinchState::Clicking if distance > self.off_threshold => {
                self.state = PinchState::Idle;
                tracing::debug!(distance, "pinch released");
                false
            }
            _ => false,
        }
    }

    /// Release without a click (feature lost).
    pub fn reset(&mut self) {
        self.state = PinchState::Idle;
    }
}
