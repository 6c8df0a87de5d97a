//! One tick of the detection-to-pointer pipeline.
//!
//! Normalizer → Smoother → Click decider → Output sink, run once per
//! acquired frame. The pipeline owns all tracking state; nothing is
//! buffered beyond the current sample.

use pawcursor_common::config::TrackingConfig;
use pawcursor_common::error::PawcursorResult;
use pawcursor_tracking_model::sample::{Detection, Sample, TimestampNs};

use crate::click::ClickDecider;
use crate::normalize::Normalizer;
use crate::sink::{deliver, Delivery, OutputSink, RETRACT_COORD};
use crate::smoother::{RateLimitedSmoother, SmootherConfig};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOutcome {
    /// Pointer position after the tick (`None` before the first detection
    /// when the pointer has no origin).
    pub pointer: Option<(f64, f64)>,
    /// A click was emitted and delivered.
    pub clicked: bool,
    /// The pointer was moved off-screen this tick.
    pub retracted: bool,
    /// Sink calls that failed at least once this tick.
    pub sink_failures: u32,
}

/// Counters accumulated across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStats {
    pub ticks: u64,
    pub detections: u64,
    pub clicks: u64,
    pub retracts: u64,
    pub sink_failures: u64,
}

/// The detection-to-pointer pipeline.
#[derive(Debug, Clone)]
pub struct PointerPipeline {
    normalizer: Normalizer,
    smoother: RateLimitedSmoother,
    clicks: ClickDecider,
    retract_after_ticks: Option<u32>,
    absent_ticks: u32,
    retracted: bool,
    stats: PipelineStats,
}

impl PointerPipeline {
    /// Validate the configuration and build the pipeline.
    pub fn from_config(config: &TrackingConfig) -> PawcursorResult<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: Normalizer::new(config.margin, config.frame_size),
            smoother: RateLimitedSmoother::new(SmootherConfig::from_tracking(config)),
            clicks: ClickDecider::from_config(config),
            retract_after_ticks: config.retract_after_ticks,
            absent_ticks: 0,
            retracted: false,
            stats: PipelineStats::default(),
        })
    }

    pub fn pointer(&self) -> Option<(f64, f64)> {
        self.smoother.position()
    }

    pub fn click_decider(&self) -> &ClickDecider {
        &self.clicks
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Run one tick for `sample`, delivering output to `sink`.
    pub fn tick<S>(&mut self, sample: &Sample, sink: &mut S) -> TickOutcome
    where
        S: OutputSink + ?Sized,
    {
        self.stats.ticks += 1;
        sink.on_tick(sample.timestamp_ns);
        let outcome = match &sample.detection {
            Some(detection) => self.on_detection(detection, sample.timestamp_ns, sink),
            None => self.on_absent(sample.timestamp_ns, sink),
        };

        if outcome.clicked {
            self.stats.clicks += 1;
        }
        if outcome.retracted {
            self.stats.retracts += 1;
        }
        self.stats.sink_failures += outcome.sink_failures as u64;
        outcome
    }

    fn on_detection<S>(
        &mut self,
        detection: &Detection,
        now_ns: TimestampNs,
        sink: &mut S,
    ) -> TickOutcome
    where
        S: OutputSink + ?Sized,
    {
        self.stats.detections += 1;
        self.absent_ticks = 0;
        self.retracted = false;

        let mut outcome = TickOutcome::default();
        let target = self.normalizer.normalize(detection.point, detection.space);
        let (x, y) = self.smoother.step(target, now_ns);
        outcome.pointer = Some((x, y));

        let moved = deliver(&mut *sink, "move_to", |s| s.move_to(x, y));
        count_failure(&mut outcome, &moved);

        let fire = match &mut self.clicks {
            ClickDecider::Pinch(pinch) => match detection.companion {
                Some(companion) => {
                    let a = self.normalizer.to_fractional(detection.point, detection.space);
                    let b = self.normalizer.to_fractional(companion, detection.space);
                    pinch.update(a.distance_to(&b))
                }
                None => false,
            },
            ClickDecider::Dwell(dwell) => {
                let resolved = deliver(&mut *sink, "resolve_target_at", |s| s.resolve_target_at(x, y));
                count_failure(&mut outcome, &resolved);
                dwell.update(resolved.value().flatten(), now_ns)
            }
        };

        if fire {
            let clicked = deliver(&mut *sink, "click", |s| s.click());
            count_failure(&mut outcome, &clicked);
            outcome.clicked = clicked.value().is_some();
            if outcome.clicked {
                tracing::info!(x, y, mode = ?self.clicks.mode(), "click");
            } else {
                tracing::warn!(x, y, "click dropped by sink");
            }
        }

        outcome
    }

    fn on_absent<S>(&mut self, now_ns: TimestampNs, sink: &mut S) -> TickOutcome
    where
        S: OutputSink + ?Sized,
    {
        self.smoother.mark_idle(now_ns);
        self.clicks.on_absent(now_ns);
        self.absent_ticks = self.absent_ticks.saturating_add(1);

        let mut outcome = TickOutcome {
            pointer: self.smoother.position(),
            ..Default::default()
        };

        let due = self
            .retract_after_ticks
            .is_some_and(|limit| self.absent_ticks >= limit);
        if due && !self.retracted {
            let moved = deliver(&mut *sink, "move_to", |s| s.move_to(RETRACT_COORD, RETRACT_COORD));
            count_failure(&mut outcome, &moved);
            // Set even when dropped: one attempt per absence episode.
            self.retracted = true;
            outcome.retracted = moved.value().is_some();
            tracing::debug!(absent_ticks = self.absent_ticks, "pointer retracted");
        }

        outcome
    }
}

fn count_failure<T>(outcome: &mut TickOutcome, delivery: &Delivery<T>) {
    if delivery.had_failure() {
        outcome.sink_failures += 1;
    }
}
