//! pawcursor Pointer Core
//!
//! Turns per-frame detections into a stable pointer and discrete clicks:
//! - **Normalizer:** raw detection point → unit square with an edge dead zone
//! - **Smoother:** velocity-capped exponential approach toward the target
//! - **Click deciders:** pinch hysteresis or dwell timer
//! - **Pipeline:** one synchronous tick wiring the above to an output sink
//!
//! This crate is pure computation with no I/O of its own; all output goes
//! through the [`sink::OutputSink`] trait.

pub mod click;
pub mod normalize;
pub mod pipeline;
pub mod sink;
pub mod smoother;

pub use click::ClickDecider;
pub use normalize::{NormalizedPoint, Normalizer};
pub use pipeline::{PipelineStats, PointerPipeline, TickOutcome};
pub use sink::{OutputSink, RETRACT_COORD};
pub use smoother::{PointerState, RateLimitedSmoother};
