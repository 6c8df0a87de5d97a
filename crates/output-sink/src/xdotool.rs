//! OS pointer sink for X11, driven through the `xdotool` binary.
//!
//! Targets are X window ids: the window under the pointer after a move is
//! what the dwell click focuses on.

use std::process::Command;

use pawcursor_common::config::Dimensions;
use pawcursor_common::error::{PawcursorError, PawcursorResult};
use pawcursor_pointer_core::sink::OutputSink;
use pawcursor_tracking_model::target::TargetId;

pub struct XdotoolSink {
    binary: String,
    button: u8,
}

impl XdotoolSink {
    pub fn new() -> Self {
        Self {
            binary: "xdotool".to_string(),
            button: 1,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Mouse button used for clicks (1 = left).
    pub fn with_button(mut self, button: u8) -> Self {
        self.button = button;
        self
    }

    /// Whether the binary runs and can reach a display.
    pub fn is_available(&self) -> bool {
        self.run(&["getdisplaygeometry"]).is_ok()
    }

    /// Size of the X screen in pixels.
    pub fn display_geometry(&self) -> PawcursorResult<Dimensions> {
        let out = self.run(&["getdisplaygeometry"])?;
        parse_display_geometry(&out)
            .ok_or_else(|| PawcursorError::sink(format!("unexpected geometry output: {out:?}")))
    }

    fn run(&self, args: &[&str]) -> PawcursorResult<String> {
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| PawcursorError::sink(format!("Failed to execute {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PawcursorError::sink(format!(
                "{} {} exited with {}: {}",
                self.binary,
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for XdotoolSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for XdotoolSink {
    fn move_to(&mut self, x: f64, y: f64) -> PawcursorResult<()> {
        // X clamps to the screen, so a retract lands in the top-left corner.
        let x = (x.round() as i64).to_string();
        let y = (y.round() as i64).to_string();
        self.run(&["mousemove", "--", x.as_str(), y.as_str()])?;
        Ok(())
    }

    fn click(&mut self) -> PawcursorResult<()> {
        let button = self.button.to_string();
        self.run(&["click", button.as_str()])?;
        Ok(())
    }

    fn resolve_target_at(&mut self, _x: f64, _y: f64) -> PawcursorResult<Option<TargetId>> {
        let out = self.run(&["getmouselocation", "--shell"])?;
        Ok(parse_window_id(&out))
    }

    fn ensure_ready(&mut self) -> PawcursorResult<()> {
        self.run(&["version"])?;
        tracing::debug!(binary = %self.binary, "xdotool reachable");
        Ok(())
    }

    fn name(&self) -> &str {
        "xdotool"
    }
}

/// Parse `getdisplaygeometry` output: `"1920 1080"`.
fn parse_display_geometry(out: &str) -> Option<Dimensions> {
    let mut parts = out.split_whitespace();
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    Some(Dimensions::new(width, height))
}

/// Pull `WINDOW=<id>` out of `getmouselocation --shell` output.
/// The root window reports as 0 or not at all, which means no target.
fn parse_window_id(out: &str) -> Option<TargetId> {
    out.lines()
        .find_map(|line| line.trim().strip_prefix("WINDOW="))
        .and_then(|id| id.parse::<u64>().ok())
        .filter(|&id| id != 0)
        .map(TargetId)
}
