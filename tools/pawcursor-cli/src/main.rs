//! pawcursor CLI: drive a pointer from camera detections.
//!
//! Usage:
//!   pawcursor run [OPTIONS]    Run a tracking session
//!   pawcursor check            Check configuration and output surface
//!   pawcursor init             Write a default configuration file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pawcursor_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "pawcursor",
    about = "Hands-free pointer control from camera detections",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/pawcursor/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tracking session until the source ends or Ctrl+C
    Run(commands::run::RunArgs),

    /// Check configuration and output surface availability
    Check,

    /// Write a default configuration file
    Init {
        /// Where to write (defaults to the standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    pawcursor_common::logging::init_logging(&pawcursor_common::logging::cli_logging_config(
        &config.logging,
        cli.verbose,
        cli.json_logs,
    ));

    match cli.command {
        Commands::Run(args) => commands::run::run(args, config).await,
        Commands::Check => commands::check::run(&config, cli.config.as_deref()),
        Commands::Init { output, force } => commands::init::run(output, force),
    }
}
