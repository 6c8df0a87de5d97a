//! Check configuration and output surface.

use std::path::Path;

use pawcursor_common::config::{config_file_path, AppConfig};
use pawcursor_output::XdotoolSink;

pub fn run(config: &AppConfig, explicit_path: Option<&Path>) -> anyhow::Result<()> {
    println!("pawcursor Check");
    println!("{}", "=".repeat(50));

    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    if path.exists() {
        println!("[OK] Config file: {}", path.display());
    } else {
        println!("[WARN] Config file not found, using defaults: {}", path.display());
    }

    let tracking = &config.tracking;
    let config_ok = match tracking.validate() {
        Ok(()) => {
            println!(
                "[OK] Tracking parameters valid (click mode {:?})",
                tracking.click_mode
            );
            true
        }
        Err(e) => {
            println!("[FAIL] {e}");
            false
        }
    };

    let xdotool = XdotoolSink::new();
    if xdotool.is_available() {
        match xdotool.display_geometry() {
            Ok(display) => {
                println!("[OK] xdotool: display {}x{}", display.width, display.height);
                if display != tracking.output_size {
                    println!(
                        "[WARN] output_size {}x{} differs from the display; `run --sink xdotool` uses the display size",
                        tracking.output_size.width, tracking.output_size.height
                    );
                }
            }
            Err(e) => println!("[WARN] xdotool: {e}"),
        }
    } else {
        println!("[WARN] xdotool not available: only log and dry-run sinks will work");
    }

    println!();
    if config_ok {
        println!("Configuration is usable. pawcursor is ready.");
        Ok(())
    } else {
        anyhow::bail!("configuration is invalid")
    }
}
