//! Write a default configuration file.

use std::path::PathBuf;

use pawcursor_common::config::{config_file_path, AppConfig};

pub fn run(output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = AppConfig::default();
    config
        .save_to(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;

    let t = &config.tracking;
    println!("Configuration written to {}", path.display());
    println!("  Click mode:   {:?}", t.click_mode);
    println!("  Margin:       {}", t.margin);
    println!("  Smoothing:    alpha {} / cap {} px/s", t.alpha, t.velocity_cap);
    println!("  Pinch:        on {} / off {}", t.pinch_on, t.pinch_off);
    println!("  Dwell:        {} ms", t.dwell_ms);
    println!(
        "  Frame/output: {}x{} -> {}x{}",
        t.frame_size.width, t.frame_size.height, t.output_size.width, t.output_size.height
    );

    Ok(())
}
