//! In-memory sink.
//!
//! Records every command and resolves targets from a list of rectangles,
//! standing in for a page or desktop during dry runs and tests.

use pawcursor_common::clock::SessionClock;
use pawcursor_common::config::Dimensions;
use pawcursor_common::error::PawcursorResult;
use pawcursor_pointer_core::sink::OutputSink;
use pawcursor_tracking_model::command::SinkCommand;
use pawcursor_tracking_model::target::TargetId;

/// Axis-aligned target region in output coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TargetRegion {
    id: TargetId,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl TargetRegion {
    fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

pub struct RecordingSink {
    clock: SessionClock,
    commands: Vec<SinkCommand>,
    regions: Vec<TargetRegion>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            clock: SessionClock::start(),
            commands: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Split the output surface into a `cols × rows` grid of targets,
    /// numbered row-major from 1.
    pub fn with_grid(mut self, output: Dimensions, cols: u32, rows: u32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let w = output.width as f64 / cols as f64;
        let h = output.height as f64 / rows as f64;
        for row in 0..rows {
            for col in 0..cols {
                self.regions.push(TargetRegion {
                    id: TargetId((row * cols + col + 1) as u64),
                    x: col as f64 * w,
                    y: row as f64 * h,
                    w,
                    h,
                });
            }
        }
        self
    }

    pub fn commands(&self) -> &[SinkCommand] {
        &self.commands
    }

    pub fn click_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_click()).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for RecordingSink {
    fn move_to(&mut self, x: f64, y: f64) -> PawcursorResult<()> {
        self.commands
            .push(SinkCommand::move_to(self.clock.elapsed_ns(), x, y));
        Ok(())
    }

    fn click(&mut self) -> PawcursorResult<()> {
        self.commands.push(SinkCommand::click(self.clock.elapsed_ns()));
        Ok(())
    }

    fn resolve_target_at(&mut self, x: f64, y: f64) -> PawcursorResult<Option<TargetId>> {
        Ok(self
            .regions
            .iter()
            .find(|r| r.contains(x, y))
            .map(|r| r.id))
    }

    fn name(&self) -> &str {
        "recording"
    }
}
