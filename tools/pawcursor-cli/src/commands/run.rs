//! Run a tracking session.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, ValueEnum};

use pawcursor_common::clock::SessionClock;
use pawcursor_common::config::{AppConfig, ClickMode, Dimensions, TrackingConfig};
use pawcursor_detectors::{Detector, ReplayDetector, SyntheticConfig, SyntheticDetector};
use pawcursor_output::{CommandLogSink, RecordingSink, ThrottledSink, XdotoolSink};
use pawcursor_pointer_core::OutputSink;
use pawcursor_tracker::TrackingSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkChoice {
    /// Drive the X11 pointer through xdotool
    Xdotool,
    /// Append every command to a JSONL file
    Log,
    /// Keep commands in memory against a grid of fake targets
    DryRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClickModeArg {
    Pinch,
    Dwell,
}

impl From<ClickModeArg> for ClickMode {
    fn from(arg: ClickModeArg) -> Self {
        match arg {
            ClickModeArg::Pinch => ClickMode::Pinch,
            ClickModeArg::Dwell => ClickMode::Dwell,
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Replay recorded samples from a JSONL file ("-" for stdin);
    /// without it a synthetic corner tour is used
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Pace replayed samples at their recorded rate
    #[arg(long)]
    realtime: bool,

    /// Laps of the synthetic corner tour
    #[arg(long, default_value = "2")]
    laps: u32,

    /// Output surface
    #[arg(long, value_enum, default_value = "dry-run")]
    sink: SinkChoice,

    /// Mouse button clicked by `--sink xdotool` (1 = left, 3 = right)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=9))]
    button: u8,

    /// Command log path for `--sink log`
    #[arg(long, default_value = "pawcursor-commands.jsonl")]
    log_path: PathBuf,

    /// Target grid for `--sink dry-run`, as COLSxROWS
    #[arg(long, default_value = "3x3", value_parser = parse_dimensions)]
    grid: Dimensions,

    /// Print the session summary as JSON
    #[arg(long)]
    summary_json: bool,

    /// Dead band at each frame edge, as a fraction of the frame
    #[arg(long)]
    margin: Option<f64>,

    /// Smoothing factor in (0, 1]
    #[arg(long)]
    alpha: Option<f64>,

    /// Maximum pointer speed in output pixels per second
    #[arg(long)]
    velocity_cap: Option<f64>,

    /// Pinch engage distance (frame fraction)
    #[arg(long)]
    pinch_on: Option<f64>,

    /// Pinch release distance (frame fraction)
    #[arg(long)]
    pinch_off: Option<f64>,

    /// Dwell time before a click, in milliseconds
    #[arg(long)]
    dwell_ms: Option<u64>,

    #[arg(long, value_enum)]
    click_mode: Option<ClickModeArg>,

    /// Move the pointer off-screen after this many empty frames
    #[arg(long)]
    retract_after: Option<u32>,

    /// Camera frame size, as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_dimensions)]
    frame_size: Option<Dimensions>,

    /// Output surface size, as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_dimensions)]
    output_size: Option<Dimensions>,

    /// Minimum spacing between forwarded pointer moves, measured on
    /// sample timestamps
    #[arg(long)]
    min_interval_ms: Option<u64>,
}

impl RunArgs {
    fn apply_overrides(&self, tracking: &mut TrackingConfig) {
        if let Some(v) = self.margin {
            tracking.margin = v;
        }
        if let Some(v) = self.alpha {
            tracking.alpha = v;
        }
        if let Some(v) = self.velocity_cap {
            tracking.velocity_cap = v;
        }
        if let Some(v) = self.pinch_on {
            tracking.pinch_on = v;
        }
        if let Some(v) = self.pinch_off {
            tracking.pinch_off = v;
        }
        if let Some(v) = self.dwell_ms {
            tracking.dwell_ms = v;
        }
        if let Some(v) = self.click_mode {
            tracking.click_mode = v.into();
        }
        if let Some(v) = self.retract_after {
            tracking.retract_after_ticks = Some(v);
        }
        if let Some(v) = self.frame_size {
            tracking.frame_size = v;
        }
        if let Some(v) = self.output_size {
            tracking.output_size = v;
        }
        if let Some(v) = self.min_interval_ms {
            tracking.sink_min_interval_ms = v;
        }
    }

    fn detector(&self, stop: Arc<AtomicBool>) -> anyhow::Result<Box<dyn Detector>> {
        let detector: Box<dyn Detector> = match &self.replay {
            Some(path) if path.as_os_str() == "-" => Box::new(
                ReplayDetector::stdin()
                    .with_realtime(self.realtime)
                    .with_stop_flag(stop),
            ),
            Some(path) => Box::new(
                ReplayDetector::open(path)
                    .with_context(|| format!("Failed to open replay {}", path.display()))?
                    .with_realtime(self.realtime)
                    .with_stop_flag(stop),
            ),
            None => Box::new(SyntheticDetector::new(SyntheticConfig {
                laps: self.laps,
                ..Default::default()
            })),
        };
        Ok(detector)
    }

    /// Build the sink. With xdotool and no explicit `--output-size`, the
    /// display geometry replaces the configured output size.
    fn sink(&self, tracking: &mut TrackingConfig) -> anyhow::Result<Box<dyn OutputSink + Send>> {
        let sink: Box<dyn OutputSink + Send> = match self.sink {
            SinkChoice::Xdotool => {
                let sink = XdotoolSink::new().with_button(self.button);
                if self.output_size.is_none() {
                    let geometry = sink
                        .display_geometry()
                        .context("xdotool cannot reach a display")?;
                    tracing::info!(
                        width = geometry.width,
                        height = geometry.height,
                        "Using display geometry as output size"
                    );
                    tracking.output_size = geometry;
                }
                throttled(sink, tracking.sink_min_interval_ms)
            }
            SinkChoice::Log => {
                let sink = CommandLogSink::create(
                    &self.log_path,
                    SessionClock::start(),
                    tracking.output_size,
                )
                .with_context(|| format!("Failed to create {}", self.log_path.display()))?;
                throttled(sink, tracking.sink_min_interval_ms)
            }
            SinkChoice::DryRun => throttled(
                RecordingSink::new().with_grid(
                    tracking.output_size,
                    self.grid.width,
                    self.grid.height,
                ),
                tracking.sink_min_interval_ms,
            ),
        };
        Ok(sink)
    }
}

fn throttled<S: OutputSink + Send + 'static>(
    sink: S,
    min_interval_ms: u64,
) -> Box<dyn OutputSink + Send> {
    if min_interval_ms > 0 {
        Box::new(ThrottledSink::new(sink, min_interval_ms))
    } else {
        Box::new(sink)
    }
}

/// Parse `WIDTHxHEIGHT`.
fn parse_dimensions(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width = w.trim().parse().map_err(|e| format!("bad width {w:?}: {e}"))?;
    let height = h.trim().parse().map_err(|e| format!("bad height {h:?}: {e}"))?;
    Ok(Dimensions::new(width, height))
}

pub async fn run(args: RunArgs, config: AppConfig) -> anyhow::Result<()> {
    let mut tracking = config.tracking;
    args.apply_overrides(&mut tracking);
    tracking.validate()?;

    let stop = Arc::new(AtomicBool::new(false));
    let detector = args.detector(stop.clone())?;
    let sink = args.sink(&mut tracking)?;
    let mut session = TrackingSession::new(detector, sink, &tracking)?.with_stop_flag(stop.clone());

    println!("Tracking with {:?} clicks. Press Ctrl+C to stop...", tracking.click_mode);

    let mut handle = tokio::task::spawn_blocking(move || session.run());
    let joined = tokio::select! {
        joined = &mut handle => joined,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            println!("Stopping...");
            stop.store(true, Ordering::SeqCst);
            handle.await
        }
    };
    let summary = joined.context("tracking thread panicked")??;

    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!();
        println!("Session ended ({:?}):", summary.end);
        println!("  Detector:      {}", summary.detector);
        println!("  Sink:          {}", summary.sink);
        println!("  Ticks:         {}", summary.ticks);
        println!("  Detections:    {}", summary.detections);
        println!("  Clicks:        {}", summary.clicks);
        println!("  Retracts:      {}", summary.retracts);
        println!("  Sink failures: {}", summary.sink_failures);
        println!("  Elapsed:       {} ms", summary.elapsed_ms);
    }

    Ok(())
}
