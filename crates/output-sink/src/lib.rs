//! pawcursor Output Sinks
//!
//! Concrete [`OutputSink`](pawcursor_pointer_core::sink::OutputSink)
//! implementations:
//!
//! - **Xdotool:** drives the OS pointer through the `xdotool` binary
//! - **Command log:** append-only JSONL record of every command
//! - **Recording:** in-memory command list for tests and dry runs
//! - **Throttled:** wrapper that spaces out pointer moves

pub mod command_log;
pub mod recording;
pub mod throttle;
pub mod xdotool;

pub use command_log::CommandLogSink;
pub use recording::RecordingSink;
pub use throttle::ThrottledSink;
pub use xdotool::XdotoolSink;
