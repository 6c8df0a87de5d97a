//! Logging and tracing initialization.

use crate::config::LoggingConfig;

/// Filter used by `--verbose`: per-tick detail from the pipeline crates,
/// everything else at info.
pub const VERBOSE_FILTER: &str =
    "info,pawcursor_pointer_core=debug,pawcursor_tracker=debug,pawcursor_output=debug";

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level` when set.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.compact().finish())
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Logging configuration for the CLI's `--verbose` / `--json-logs` flags,
/// falling back to the configured level.
pub fn cli_logging_config(base: &LoggingConfig, verbose: bool, json: bool) -> LoggingConfig {
    LoggingConfig {
        level: if verbose {
            VERBOSE_FILTER.to_string()
        } else {
            base.level.clone()
        },
        json: json || base.json,
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
