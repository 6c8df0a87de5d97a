//! Click decision state machines.
//!
//! - **Pinch:** distance between two tracked features, with hysteresis
//! - **Dwell:** time spent over a single target identity

pub mod dwell;
pub mod pinch;

pub use dwell::DwellClickDetector;
pub use pinch::{PinchClickDetector, PinchState};

use pawcursor_common::config::{ClickMode, TrackingConfig};
use pawcursor_tracking_model::sample::TimestampNs;

/// The click state machine selected by configuration.
#[derive(Debug, Clone)]
pub enum ClickDecider {
    Pinch(PinchClickDetector),
    Dwell(DwellClickDetector),
}

impl ClickDecider {
    pub fn from_config(config: &TrackingConfig) -> Self {
        match config.click_mode {
            ClickMode::Pinch => Self::Pinch(PinchClickDetector::new(
                config.pinch_on,
                config.pinch_off,
            )),
            ClickMode::Dwell => Self::Dwell(DwellClickDetector::from_millis(config.dwell_ms)),
        }
    }

    pub fn mode(&self) -> ClickMode {
        match self {
            Self::Pinch(_) => ClickMode::Pinch,
            Self::Dwell(_) => ClickMode::Dwell,
        }
    }

    /// Reset toward the idle/untargeted state when no feature was found.
    pub fn on_absent(&mut self, now_ns: TimestampNs) {
        match self {
            Self::Pinch(pinch) => pinch.reset(),
            Self::Dwell(dwell) => {
                dwell.update(None, now_ns);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawcursor_tracking_model::target::TargetId;

    #[test]
    fn builds_variant_from_mode() {
        let pinch = ClickDecider::from_config(&TrackingConfig::default());
        assert_eq!(pinch.mode(), ClickMode::Pinch);

        let dwell = ClickDecider::from_config(&TrackingConfig {
            click_mode: ClickMode::Dwell,
            ..Default::default()
        });
        assert_eq!(dwell.mode(), ClickMode::Dwell);
    }

    #[test]
    fn absence_clears_dwell_focus() {
        let mut decider = ClickDecider::Dwell(DwellClickDetector::from_millis(100));
        if let ClickDecider::Dwell(dwell) = &mut decider {
            dwell.update(Some(TargetId(3)), 0);
        }
        decider.on_absent(50_000_000);
        match &decider {
            ClickDecider::Dwell(dwell) => assert_eq!(dwell.focused_target(), None),
            ClickDecider::Pinch(_) => unreachable!(),
        }
    }
}
