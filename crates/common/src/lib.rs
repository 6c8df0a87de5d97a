//! pawcursor Common Utilities
//!
//! Shared infrastructure for all pawcursor crates:
//! - Error types and result aliases
//! - Clock and pacing utilities for the tick loop
//! - Tracing/logging initialization
//! - Configuration loading and validation

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
