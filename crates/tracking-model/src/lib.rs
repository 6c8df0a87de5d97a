//! pawcursor Tracking Model
//!
//! Defines the data contracts shared by detectors, the pointer pipeline,
//! and output sinks:
//! - **Samples:** one per acquired frame, carrying a `Detection` or nothing
//! - **Targets:** opaque identities the dwell click compares
//! - **Commands:** records of what was sent to an output sink
//!
//! Samples are exchanged as JSONL (one object per line, `#` comments
//! allowed) so recorded sessions can be replayed.

pub mod command;
pub mod sample;
pub mod target;

pub use command::*;
pub use sample::*;
pub use target::*;
