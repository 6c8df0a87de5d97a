use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pawcursor_common::config::{ClickMode, Dimensions, TrackingConfig};
use pawcursor_common::error::{PawcursorError, PawcursorResult};
use pawcursor_detectors::{
    Detector, DetectorKind, MatchFrame, MatchPeak, ReplayDetector, SyntheticConfig,
    SyntheticDetector, TemplateMatchDetector, TemplateMatchSource,
};
use pawcursor_output::RecordingSink;
use pawcursor_pointer_core::OutputSink;
use pawcursor_tracker::{SessionEnd, TrackingSession};
use pawcursor_tracking_model::sample::{Detection, Sample};

#[derive(Clone, Default)]
struct Tally {
    released: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    moves: Arc<AtomicUsize>,
    clicks: Arc<AtomicUsize>,
}

/// Yields scripted results, then exhausts.
struct ScriptedDetector {
    script: Vec<PawcursorResult<Option<Sample>>>,
    tally: Tally,
}

impl Detector for ScriptedDetector {
    fn next(&mut self) -> PawcursorResult<Option<Sample>> {
        if self.script.is_empty() {
            return Ok(None);
        }
        self.script.remove(0)
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Replay
    }

    fn release(&mut self) {
        self.tally.released.store(true, Ordering::SeqCst);
    }
}

/// Endless detector that stops its own session after `stop_after` samples.
struct EndlessDetector {
    n: u64,
    stop_after: u64,
    stop_flag: Option<Arc<AtomicBool>>,
    tally: Tally,
}

impl Detector for EndlessDetector {
    fn next(&mut self) -> PawcursorResult<Option<Sample>> {
        self.n += 1;
        if self.n == self.stop_after {
            if let Some(flag) = &self.stop_flag {
                flag.store(true, Ordering::SeqCst);
            }
        }
        Ok(Some(Sample::detected(
            self.n * 33_000_000,
            Detection::fractional(0.5, 0.5),
        )))
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Synthetic
    }

    fn release(&mut self) {
        self.tally.released.store(true, Ordering::SeqCst);
    }
}

struct TallySink {
    tally: Tally,
    fail_moves: bool,
}

impl OutputSink for TallySink {
    fn move_to(&mut self, _x: f64, _y: f64) -> PawcursorResult<()> {
        if self.fail_moves {
            return Err(PawcursorError::sink("surface gone"));
        }
        self.tally.moves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn click(&mut self) -> PawcursorResult<()> {
        self.tally.clicks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> PawcursorResult<()> {
        self.tally.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "tally"
    }
}

fn sink(tally: &Tally) -> Box<TallySink> {
    Box::new(TallySink {
        tally: tally.clone(),
        fail_moves: false,
    })
}

fn pinch(t_ms: u64, gap: f64) -> PawcursorResult<Option<Sample>> {
    Ok(Some(Sample::detected(
        t_ms * 1_000_000,
        Detection::fractional(0.5, 0.5).with_companion(0.5 + gap, 0.5),
    )))
}

#[test]
fn exhausted_source_ends_session_and_releases() {
    let tally = Tally::default();
    let detector = ScriptedDetector {
        script: vec![pinch(0, 0.06), pinch(33, 0.03), pinch(66, 0.05), pinch(99, 0.07)],
        tally: tally.clone(),
    };
    let mut session =
        TrackingSession::new(Box::new(detector), sink(&tally), &TrackingConfig::default())
            .unwrap();

    let summary = session.run().unwrap();

    assert_eq!(summary.end, SessionEnd::Exhausted);
    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.clicks, 1);
    assert_eq!(tally.moves.load(Ordering::SeqCst), 4);
    assert_eq!(tally.clicks.load(Ordering::SeqCst), 1);
    assert!(tally.released.load(Ordering::SeqCst));
    assert!(tally.closed.load(Ordering::SeqCst));
}

#[test]
fn stop_flag_ends_session_and_releases() {
    let tally = Tally::default();
    let stop_flag = Arc::new(AtomicBool::new(false));
    let detector = EndlessDetector {
        n: 0,
        stop_after: 10,
        stop_flag: Some(stop_flag.clone()),
        tally: tally.clone(),
    };
    let mut session =
        TrackingSession::new(Box::new(detector), sink(&tally), &TrackingConfig::default())
            .unwrap()
            .with_stop_flag(stop_flag);

    let summary = session.run().unwrap();

    assert_eq!(summary.end, SessionEnd::Stopped);
    assert_eq!(summary.ticks, 10);
    assert!(tally.released.load(Ordering::SeqCst));
    assert!(tally.closed.load(Ordering::SeqCst));
}

#[test]
fn stop_before_run_processes_nothing() {
    let tally = Tally::default();
    let detector = EndlessDetector {
        n: 0,
        stop_after: 0,
        stop_flag: None,
        tally: tally.clone(),
    };
    let mut session =
        TrackingSession::new(Box::new(detector), sink(&tally), &TrackingConfig::default())
            .unwrap();
    session.stop();

    let summary = session.run().unwrap();

    assert_eq!(summary.end, SessionEnd::Stopped);
    assert_eq!(summary.ticks, 0);
    assert!(tally.released.load(Ordering::SeqCst));
    assert!(tally.closed.load(Ordering::SeqCst));
}

#[test]
fn acquisition_failure_is_fatal_but_releases() {
    let tally = Tally::default();
    let detector = ScriptedDetector {
        script: vec![
            pinch(0, 0.06),
            Err(PawcursorError::acquisition("camera unplugged")),
            pinch(66, 0.06),
        ],
        tally: tally.clone(),
    };
    let mut session =
        TrackingSession::new(Box::new(detector), sink(&tally), &TrackingConfig::default())
            .unwrap();

    let err = session.run().unwrap_err();

    assert!(matches!(err, PawcursorError::Acquisition { .. }));
    assert_eq!(session.pipeline().stats().ticks, 1);
    assert!(tally.released.load(Ordering::SeqCst));
    assert!(tally.closed.load(Ordering::SeqCst));
}

#[test]
fn sink_failures_do_not_stop_the_session() {
    let tally = Tally::default();
    let detector = ScriptedDetector {
        script: vec![pinch(0, 0.06), pinch(33, 0.06), pinch(66, 0.06)],
        tally: tally.clone(),
    };
    let failing = Box::new(TallySink {
        tally: tally.clone(),
        fail_moves: true,
    });
    let mut session =
        TrackingSession::new(Box::new(detector), failing, &TrackingConfig::default()).unwrap();

    let summary = session.run().unwrap();

    assert_eq!(summary.end, SessionEnd::Exhausted);
    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.sink_failures, 3);
    assert!(tally.closed.load(Ordering::SeqCst));
}

#[test]
fn invalid_configuration_is_rejected_before_acquisition() {
    let tally = Tally::default();
    let detector = ScriptedDetector {
        script: vec![pinch(0, 0.06)],
        tally: tally.clone(),
    };
    let config = TrackingConfig {
        pinch_on: 0.06,
        pinch_off: 0.05,
        ..Default::default()
    };

    let err = TrackingSession::new(Box::new(detector), sink(&tally), &config)
        .err()
        .unwrap();

    assert!(matches!(err, PawcursorError::InvalidConfiguration { .. }));
}

#[test]
fn synthetic_tour_clicks_once_per_corner() {
    let tally = Tally::default();
    let detector = SyntheticDetector::new(SyntheticConfig {
        laps: 1,
        jitter: 0.0,
        ..Default::default()
    });
    let config = TrackingConfig {
        click_mode: ClickMode::Pinch,
        retract_after_ticks: Some(5),
        ..Default::default()
    };
    let mut session = TrackingSession::new(Box::new(detector), sink(&tally), &config).unwrap();

    let summary = session.run().unwrap();

    assert_eq!(summary.detector, DetectorKind::Synthetic);
    assert_eq!(summary.clicks, 4);
    assert_eq!(summary.retracts, 1);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["end"], "exhausted");
}

#[test]
fn synthetic_tour_dwells_on_each_corner_cell() {
    let config = TrackingConfig {
        click_mode: ClickMode::Dwell,
        ..Default::default()
    };
    let detector = SyntheticDetector::new(SyntheticConfig {
        laps: 1,
        jitter: 0.0,
        ..Default::default()
    });
    let sink = RecordingSink::new().with_grid(config.output_size, 3, 3);
    let mut session = TrackingSession::new(Box::new(detector), Box::new(sink), &config).unwrap();

    let summary = session.run().unwrap();

    assert_eq!(summary.sink, "recording");
    assert_eq!(summary.clicks, 4);
    assert_eq!(summary.sink_failures, 0);
}

#[test]
fn stop_interrupts_a_paced_replay() {
    let tally = Tally::default();
    let stop_flag = Arc::new(AtomicBool::new(false));
    let detector = ReplayDetector::from_reader(
        Cursor::new("{\"t\":0}\n{\"t\":30000000000}\n".to_string()),
        "memory",
    )
    .with_realtime(true)
    .with_stop_flag(stop_flag.clone());
    let mut session =
        TrackingSession::new(Box::new(detector), sink(&tally), &TrackingConfig::default())
            .unwrap()
            .with_stop_flag(stop_flag.clone());

    let setter = stop_flag.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        setter.store(true, Ordering::SeqCst);
    });

    let started = Instant::now();
    let summary = session.run().unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(summary.end, SessionEnd::Stopped);
    assert_eq!(summary.ticks, 1);
    assert!(tally.closed.load(Ordering::SeqCst));
}

struct OnePeak(Option<MatchFrame>);

#[derive(Clone, Default)]
struct MoveLog(Arc<Mutex<Vec<(f64, f64)>>>);

impl OutputSink for MoveLog {
    fn move_to(&mut self, x: f64, y: f64) -> PawcursorResult<()> {
        self.0.lock().unwrap().push((x, y));
        Ok(())
    }

    fn click(&mut self) -> PawcursorResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "moves"
    }
}

impl TemplateMatchSource for OnePeak {
    fn next_frame(&mut self) -> PawcursorResult<Option<MatchFrame>> {
        Ok(self.0.take())
    }
}

#[test]
fn template_match_on_a_smaller_frame_maps_to_output_center() {
    // The configured frame is 1280x720; the matcher searched a 640x480 frame.
    let config = TrackingConfig::default();
    let detector = TemplateMatchDetector::new(
        OnePeak(Some(MatchFrame {
            timestamp_ns: 0,
            frame_size: Dimensions::new(640, 480),
            peak: Some(MatchPeak {
                score: 0.9,
                top_left: (300, 220),
            }),
        })),
        Dimensions::new(40, 40),
    );
    let moves = MoveLog::default();
    let mut session =
        TrackingSession::new(Box::new(detector), Box::new(moves.clone()), &config).unwrap();

    let summary = session.run().unwrap();

    assert_eq!(summary.detector, DetectorKind::TemplateMatch);
    assert_eq!(summary.detections, 1);
    let moves = moves.0.lock().unwrap();
    assert_eq!(moves.len(), 1);
    assert!((moves[0].0 - 960.0).abs() < 1e-9);
    assert!((moves[0].1 - 540.0).abs() < 1e-9);
}
