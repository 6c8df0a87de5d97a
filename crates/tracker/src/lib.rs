//! pawcursor Tracker
//!
//! Owns one tracking session: pulls a sample from the detector, runs it
//! through the pointer pipeline, pushes the result into the output sink,
//! and repeats until stopped or the source runs dry.
//!
//! The loop is synchronous and blocks on the detector. Cancellation is
//! cooperative through a shared stop flag checked once per tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use pawcursor_common::config::TrackingConfig;
use pawcursor_common::error::PawcursorResult;
use pawcursor_detectors::{Detector, DetectorKind};
use pawcursor_pointer_core::{OutputSink, PipelineStats, PointerPipeline};

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    /// The stop flag was set.
    Stopped,
    /// The detector reported no more samples.
    Exhausted,
}

/// Counters reported when a session finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub detector: DetectorKind,
    pub sink: String,
    pub end: SessionEnd,
    pub ticks: u64,
    pub detections: u64,
    pub clicks: u64,
    pub retracts: u64,
    pub sink_failures: u64,
    pub elapsed_ms: u64,
}

impl SessionSummary {
    fn new(
        detector: DetectorKind,
        sink: &str,
        end: SessionEnd,
        stats: PipelineStats,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            detector,
            sink: sink.to_string(),
            end,
            ticks: stats.ticks,
            detections: stats.detections,
            clicks: stats.clicks,
            retracts: stats.retracts,
            sink_failures: stats.sink_failures,
            elapsed_ms,
        }
    }
}

/// A detector, a pipeline and a sink wired into one tick loop.
pub struct TrackingSession {
    detector: Box<dyn Detector>,
    pipeline: PointerPipeline,
    sink: Box<dyn OutputSink + Send>,
    stop_flag: Arc<AtomicBool>,
}

impl TrackingSession {
    /// Build a session. Fails with `InvalidConfiguration` before anything
    /// is acquired if the tracking parameters are rejected.
    pub fn new(
        detector: Box<dyn Detector>,
        sink: Box<dyn OutputSink + Send>,
        config: &TrackingConfig,
    ) -> PawcursorResult<Self> {
        let pipeline = PointerPipeline::from_config(config)?;
        Ok(Self {
            detector,
            pipeline,
            sink,
            stop_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Run the tick loop until stopped, exhausted, or acquisition fails.
    ///
    /// The detector is released and the sink closed on every exit path.
    pub fn run(&mut self) -> PawcursorResult<SessionSummary> {
        let started = Instant::now();
        tracing::info!(
            detector = %self.detector.kind(),
            sink = self.sink.name(),
            click_mode = ?self.pipeline.click_decider().mode(),
            "Tracking session started"
        );

        let result = self.tick_loop();
        self.release();

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let stats = self.pipeline.stats();
        match result {
            Ok(end) => {
                tracing::info!(
                    end = ?end,
                    ticks = stats.ticks,
                    clicks = stats.clicks,
                    sink_failures = stats.sink_failures,
                    elapsed_ms,
                    "Tracking session finished"
                );
                Ok(SessionSummary::new(
                    self.detector.kind(),
                    self.sink.name(),
                    end,
                    stats,
                    elapsed_ms,
                ))
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    fatal = e.is_fatal(),
                    ticks = stats.ticks,
                    "Tracking session aborted"
                );
                Err(e)
            }
        }
    }

    fn tick_loop(&mut self) -> PawcursorResult<SessionEnd> {
        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                return Ok(SessionEnd::Stopped);
            }

            let Some(sample) = self.detector.next()? else {
                // A detector may give up waiting because the flag was set.
                if self.stop_flag.load(Ordering::Relaxed) {
                    return Ok(SessionEnd::Stopped);
                }
                return Ok(SessionEnd::Exhausted);
            };

            let outcome = self.pipeline.tick(&sample, &mut *self.sink);
            tracing::trace!(
                t = sample.timestamp_ns,
                pointer = ?outcome.pointer,
                clicked = outcome.clicked,
                "tick"
            );
        }
    }

    fn release(&mut self) {
        self.detector.release();
        if let Err(e) = self.sink.close() {
            tracing::warn!(sink = self.sink.name(), error = %e, "Failed to close sink");
        }
    }

    /// Share an externally owned stop flag instead of the session's own.
    pub fn with_stop_flag(mut self, stop_flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = stop_flag;
        self
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    pub fn pipeline(&self) -> &PointerPipeline {
        &self.pipeline
    }
}
