//! Application configuration.
//!
//! Tracking parameters live in [`TrackingConfig`]; every field has a
//! documented default so a partial JSON file is accepted.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PawcursorError, PawcursorResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Detection-to-pointer pipeline parameters.
    pub tracking: TrackingConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Which click state machine drives clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMode {
    /// Thumb/index pinch with hysteresis thresholds.
    #[default]
    Pinch,
    /// Hold the pointer over one target for `dwell_ms`.
    Dwell,
}

/// Where the pointer starts before the first detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerOrigin {
    /// Center of the output surface.
    #[default]
    Center,
    /// Undefined until the first detection, which the pointer snaps to.
    FirstDetection,
}

/// Detection-to-pointer pipeline parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Inward dead-zone fraction on each frame edge, in `[0, 0.5)`.
    pub margin: f64,

    /// Exponential gain applied to the capped delta, in `(0, 1]`.
    pub alpha: f64,

    /// Maximum pointer speed per axis (output px/sec).
    pub velocity_cap: f64,

    /// Pinch distance below which a click fires.
    pub pinch_on: f64,

    /// Pinch distance above which the pinch is released.
    pub pinch_off: f64,

    /// Dwell time on one target before it is clicked (ms).
    pub dwell_ms: u64,

    /// Source frame size in pixels.
    pub frame_size: Dimensions,

    /// Output surface size in pixels (screen or viewport).
    pub output_size: Dimensions,

    pub click_mode: ClickMode,

    pub pointer_origin: PointerOrigin,

    /// Consecutive absent ticks before the pointer is moved off-screen.
    /// `None` holds the last position indefinitely.
    pub retract_after_ticks: Option<u32>,

    /// Minimum spacing between pointer moves sent to the sink, in ms of
    /// sample time.
    /// `0` disables throttling.
    pub sink_min_interval_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            margin: 0.10,
            alpha: 0.35,
            velocity_cap: 1600.0,
            pinch_on: 0.04,
            pinch_off: 0.055,
            dwell_ms: 2000,
            frame_size: Dimensions::new(1280, 720),
            output_size: Dimensions::new(1920, 1080),
            click_mode: ClickMode::Pinch,
            pointer_origin: PointerOrigin::Center,
            retract_after_ticks: None,
            sink_min_interval_ms: 0,
        }
    }
}

impl TrackingConfig {
    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> PawcursorResult<()> {
        if !(0.0..0.5).contains(&self.margin) {
            return Err(PawcursorError::invalid_configuration(format!(
                "margin must be in [0, 0.5), got {}",
                self.margin
            )));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(PawcursorError::invalid_configuration(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if !(self.velocity_cap.is_finite() && self.velocity_cap > 0.0) {
            return Err(PawcursorError::invalid_configuration(format!(
                "velocity_cap must be positive, got {}",
                self.velocity_cap
            )));
        }
        if !(self.pinch_on.is_finite() && self.pinch_on > 0.0) {
            return Err(PawcursorError::invalid_configuration(format!(
                "pinch_on must be positive, got {}",
                self.pinch_on
            )));
        }
        if !(self.pinch_off.is_finite() && self.pinch_off > self.pinch_on) {
            return Err(PawcursorError::invalid_configuration(format!(
                "pinch_off ({}) must be greater than pinch_on ({})",
                self.pinch_off, self.pinch_on
            )));
        }
        if self.dwell_ms == 0 {
            return Err(PawcursorError::invalid_configuration(
                "dwell_ms must be positive",
            ));
        }
        if self.frame_size.is_empty() {
            return Err(PawcursorError::invalid_configuration(format!(
                "frame_size must be positive, got {}x{}",
                self.frame_size.width, self.frame_size.height
            )));
        }
        if self.output_size.is_empty() {
            return Err(PawcursorError::invalid_configuration(format!(
                "output_size must be positive, got {}x{}",
                self.output_size.width, self.output_size.height
            )));
        }
        if self.retract_after_ticks == Some(0) {
            return Err(PawcursorError::invalid_configuration(
                "retract_after_ticks must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "pawcursor_pointer_core=trace,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> PawcursorResult<Self> {
        if !path.exists() {
            return Err(PawcursorError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> PawcursorResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> PawcursorResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("pawcursor").join("config.json")
}
