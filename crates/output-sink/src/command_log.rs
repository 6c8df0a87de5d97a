//! Append-only JSONL command log.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pawcursor_common::clock::SessionClock;
use pawcursor_common::config::Dimensions;
use pawcursor_common::error::{PawcursorError, PawcursorResult};
use pawcursor_pointer_core::sink::OutputSink;
use pawcursor_tracking_model::command::{CommandLogHeader, SinkCommand};

/// Commands between forced flushes.
const FLUSH_EVERY: u64 = 100;

/// Writes every sink command to a JSONL file, header first as a `#` line.
pub struct CommandLogSink {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    clock: SessionClock,
    commands_written: u64,
}

impl CommandLogSink {
    pub fn create(path: &Path, clock: SessionClock, output: Dimensions) -> PawcursorResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);

        let header = CommandLogHeader {
            schema_version: "1.0".to_string(),
            epoch_wall: clock.epoch_wall().to_string(),
            output_width: output.width,
            output_height: output.height,
        };
        writeln!(writer, "# {}", serde_json::to_string(&header)?)
            .map_err(|e| PawcursorError::sink(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer: Some(writer),
            path: path.to_path_buf(),
            clock,
            commands_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn commands_written(&self) -> u64 {
        self.commands_written
    }

    fn write(&mut self, command: SinkCommand) -> PawcursorResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| PawcursorError::sink("command log is closed"))?;
        let json = serde_json::to_string(&command)?;
        writeln!(writer, "{json}")
            .map_err(|e| PawcursorError::sink(format!("Failed to write command: {e}")))?;
        self.commands_written += 1;

        if self.commands_written % FLUSH_EVERY == 0 {
            writer
                .flush()
                .map_err(|e| PawcursorError::sink(format!("Failed to flush command log: {e}")))?;
        }
        Ok(())
    }
}

impl OutputSink for CommandLogSink {
    fn move_to(&mut self, x: f64, y: f64) -> PawcursorResult<()> {
        let t = self.clock.elapsed_ns();
        self.write(SinkCommand::move_to(t, x, y))
    }

    fn click(&mut self) -> PawcursorResult<()> {
        let t = self.clock.elapsed_ns();
        self.write(SinkCommand::click(t))
    }

    fn close(&mut self) -> PawcursorResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            tracing::info!(
                path = %self.path.display(),
                commands = self.commands_written,
                "Command log closed"
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "command_log"
    }
}
