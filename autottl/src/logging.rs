//! Logging setup for applications embedding the estimator
//!
//! The library itself only emits `tracing` events. Binaries call one of the
//! initializers here once, early, to install a subscriber.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber; events are discarded
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with source locations
    Debug,
    /// One JSON object per line, for log shippers
    Json,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}

/// Initialize logging with the specified mode
///
/// # Environment Variables
///
/// - `AUTOTTL_LOG_LEVEL`: filter directive (e.g. `debug`, `autottl=trace`)
/// - `RUST_LOG`: used when `AUTOTTL_LOG_LEVEL` is not set
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    init_logging_with_level(mode, None)
}

/// Initialize logging, preferring `level` over the environment
pub fn init_logging_with_level(
    mode: LoggingMode,
    level: Option<&str>,
) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let result = match mode {
        LoggingMode::Silent => return Ok(()),
        LoggingMode::Development => Registry::default()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .with(create_env_filter(level, "info")?)
            .try_init(),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .pretty()
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(create_env_filter(level, "debug")?)
            .try_init(),
        LoggingMode::Json => Registry::default()
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .with(create_env_filter(level, "info")?)
            .try_init(),
    };

    result.map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Initialize logging from `AUTOTTL_LOG_MODE`
///
/// Accepts `development`, `debug` and `json`; anything else is silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    init_logging(mode_from_env())
}

/// Logging mode named by `AUTOTTL_LOG_MODE`
pub fn mode_from_env() -> LoggingMode {
    parse_mode(std::env::var("AUTOTTL_LOG_MODE").ok().as_deref())
}

fn parse_mode(value: Option<&str>) -> LoggingMode {
    match value {
        Some("development") => LoggingMode::Development,
        Some("debug") => LoggingMode::Debug,
        Some("json") => LoggingMode::Json,
        _ => LoggingMode::Silent,
    }
}

/// Explicit level, then `AUTOTTL_LOG_LEVEL`, then `RUST_LOG`, then default
fn create_env_filter(level: Option<&str>, default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = level
        .map(str::to_string)
        .or_else(|| std::env::var("AUTOTTL_LOG_LEVEL").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| default_level.to_string());

    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter(e.to_string()))
}

/// Check if a global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[test]
    fn test_silent_mode_skips_filter() {
        let result = init_logging_with_level(LoggingMode::Silent, Some("autottl=notalevel"));
        assert!(result.is_ok());
        assert!(!is_initialized());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode(Some("debug")), LoggingMode::Debug);
        assert_eq!(parse_mode(Some("json")), LoggingMode::Json);
        assert_eq!(parse_mode(Some("loud")), LoggingMode::Silent);
        assert_eq!(parse_mode(None), LoggingMode::Silent);
    }

    #[test]
    fn test_explicit_filter_wins() {
        assert!(create_env_filter(Some("autottl=trace"), "info").is_ok());
    }

    #[test]
    fn test_invalid_filter_is_reported() {
        let err = create_env_filter(Some("autottl=notalevel"), "info").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFilter(_)));
    }
}
