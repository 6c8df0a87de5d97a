//! Replay of recorded samples.
//!
//! Reads one [`Sample`] per JSONL line. Blank lines and `#` comments are
//! skipped. With pacing enabled, the detector sleeps between samples so
//! they are delivered at their recorded cadence.
//!
//! Pacing sleeps and stdin reads wake up every [`STOP_POLL`] to check the
//! stop flag, so a stopped session never waits on a long recorded gap or
//! an idle pipe.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pawcursor_common::error::{PawcursorError, PawcursorResult};
use pawcursor_tracking_model::sample::{parse_sample_line, Sample, TimestampNs};

use crate::{Detector, DetectorKind};

/// Longest stretch spent blocked without looking at the stop flag.
pub const STOP_POLL: Duration = Duration::from_millis(20);

/// Where replay lines come from.
enum LineSource {
    Reader(Box<dyn BufRead + Send>),
    /// Lines read on a helper thread, so waiting for input can be cancelled.
    Channel(Receiver<io::Result<String>>),
}

pub struct ReplayDetector {
    source: Option<LineSource>,
    origin: String,
    line_no: usize,
    last_timestamp_ns: Option<TimestampNs>,
    realtime: bool,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl ReplayDetector {
    /// Replay samples from a JSONL file.
    pub fn open(path: &Path) -> PawcursorResult<Self> {
        if !path.exists() {
            return Err(PawcursorError::FileNotFound {
                path: PathBuf::from(path),
            });
        }
        let file = File::open(path)?;
        Ok(Self::from_reader(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }

    /// Replay samples from any buffered reader (stdin, memory).
    pub fn from_reader(reader: impl BufRead + Send + 'static, origin: impl Into<String>) -> Self {
        Self::with_source(LineSource::Reader(Box::new(reader)), origin.into())
    }

    /// Replay samples arriving on a reader that may block indefinitely
    /// (stdin, a pipe). Lines are read on a detached helper thread; with a
    /// stop flag set, waiting for the next line is abandoned promptly. The
    /// helper itself exits at EOF or when the detector is dropped and its
    /// next line has nowhere to go.
    pub fn from_blocking_reader(
        reader: impl BufRead + Send + 'static,
        origin: impl Into<String>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        });
        Self::with_source(LineSource::Channel(rx), origin.into())
    }

    /// Replay samples from stdin.
    pub fn stdin() -> Self {
        Self::from_blocking_reader(BufReader::new(io::stdin()), "stdin")
    }

    fn with_source(source: LineSource, origin: String) -> Self {
        Self {
            source: Some(source),
            origin,
            line_no: 0,
            last_timestamp_ns: None,
            realtime: false,
            stop_flag: None,
        }
    }

    /// Sleep between samples according to their timestamps.
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Abandon pacing and blocked reads once this flag is set.
    pub fn with_stop_flag(mut self, stop_flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(stop_flag);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Next raw line, `None` at end of input or when stopped.
    fn next_line(&mut self) -> PawcursorResult<Option<String>> {
        let stop_flag = self.stop_flag.clone();
        let read_failed =
            |e: io::Error| PawcursorError::acquisition(format!("{}: read failed: {e}", self.origin));

        match self.source.as_mut() {
            None => Ok(None),
            Some(LineSource::Reader(reader)) => {
                let mut line = String::new();
                let read = reader.read_line(&mut line).map_err(read_failed)?;
                Ok((read > 0).then_some(line))
            }
            Some(LineSource::Channel(rx)) => loop {
                match rx.recv_timeout(STOP_POLL) {
                    Ok(line) => return line.map(Some).map_err(read_failed),
                    Err(RecvTimeoutError::Disconnected) => return Ok(None),
                    Err(RecvTimeoutError::Timeout) => {
                        if stop_flag.as_ref().is_some_and(|f| f.load(Ordering::Relaxed)) {
                            return Ok(None);
                        }
                    }
                }
            },
        }
    }

    fn read_sample(&mut self) -> PawcursorResult<Option<Sample>> {
        loop {
            let Some(line) = self.next_line()? else {
                return Ok(None);
            };
            self.line_no += 1;

            match parse_sample_line(&line) {
                None => continue,
                Some(Ok(sample)) => return Ok(Some(sample)),
                Some(Err(e)) => {
                    return Err(PawcursorError::acquisition(format!(
                        "{}:{}: invalid sample: {e}",
                        self.origin, self.line_no
                    )));
                }
            }
        }
    }

    /// Sleep out the recorded gap before `sample`. Returns `false` if the
    /// stop flag cut the wait short.
    fn pace(&self, sample: &Sample) -> bool {
        if !self.realtime {
            return true;
        }
        let Some(last) = self.last_timestamp_ns else {
            return true;
        };
        let deadline = Instant::now() + Duration::from_nanos(sample.timestamp_ns.saturating_sub(last));
        loop {
            if self.stop_requested() {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            std::thread::sleep(remaining.min(STOP_POLL));
        }
    }
}

impl Detector for ReplayDetector {
    fn next(&mut self) -> PawcursorResult<Option<Sample>> {
        let Some(sample) = self.read_sample()? else {
            tracing::debug!(origin = %self.origin, lines = self.line_no, "replay exhausted");
            return Ok(None);
        };

        if let Some(last) = self.last_timestamp_ns {
            if sample.timestamp_ns < last {
                tracing::warn!(
                    origin = %self.origin,
                    line = self.line_no,
                    t = sample.timestamp_ns,
                    previous = last,
                    "replay timestamp went backwards"
                );
            }
        }

        if !self.pace(&sample) {
            tracing::debug!(origin = %self.origin, "replay pacing interrupted by stop");
            return Ok(None);
        }
        self.last_timestamp_ns = Some(sample.timestamp_ns);
        Ok(Some(sample))
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Replay
    }

    fn release(&mut self) {
        self.source = None;
    }
}
