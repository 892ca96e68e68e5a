use crate::config::EngineConfig;
use crate::error::SnipSearchError;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Initialize logging from engine configuration
///
/// Logs to the console, and additionally to `snipsearch.log` inside
/// `log_dir` when one is configured.
pub fn init_logging(config: &EngineConfig) -> Result<(), SnipSearchError> {
    match &config.log_dir {
        Some(dir) => setup_logging(dir, &config.log_level),
        None => setup_console_logging(&config.log_level),
    }
}

/// Console + file logging
///
/// # Arguments
/// * `log_dir` - Directory where log files will be stored
/// * `log_level` - Log level (trace, debug, info, warn, error)
pub fn setup_logging(log_dir: &Path, log_level: &str) -> Result<(), SnipSearchError> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir).map_err(|e| {
            SnipSearchError::config(format!(
                "Failed to create log directory {}: {}",
                log_dir.display(),
                e
            ))
        })?;
    }

    let log_file_path = log_dir.join("snipsearch.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .map_err(|e| {
            SnipSearchError::config(format!(
                "Failed to open log file {}: {}",
                log_file_path.display(),
                e
            ))
        })?;

    // RUST_LOG env var takes precedence
    let env_filter = build_filter(log_level);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter.clone());

    let file_layer = fmt::layer()
        .with_writer(std::sync::Mutex::new(log_file))
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SnipSearchError::config(format!("Failed to install subscriber: {}", e)))?;

    tracing::info!(
        "Logging initialized: level={}, log_file={}",
        log_level,
        log_file_path.display()
    );

    Ok(())
}

/// Console-only logging, for tests and embedding hosts without a log dir
pub fn setup_console_logging(log_level: &str) -> Result<(), SnipSearchError> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(build_filter(log_level))
        .try_init()
        .map_err(|e| SnipSearchError::config(format!("Failed to install subscriber: {}", e)))?;

    tracing::info!("Console logging initialized: level={}", log_level);

    Ok(())
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(parse_log_level(log_level).as_str().to_lowercase()))
}

/// Parse string to tracing Level
pub fn parse_log_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO", level);
            Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace"), Level::TRACE);
        assert_eq!(parse_log_level("debug"), Level::DEBUG);
        assert_eq!(parse_log_level("info"), Level::INFO);
        assert_eq!(parse_log_level("warn"), Level::WARN);
        assert_eq!(parse_log_level("error"), Level::ERROR);
        assert_eq!(parse_log_level("invalid"), Level::INFO);
    }

    #[test]
    fn test_parse_log_level_case_insensitive() {
        assert_eq!(parse_log_level("INFO"), Level::INFO);
        assert_eq!(parse_log_level(" Debug "), Level::DEBUG);
        assert_eq!(parse_log_level("WARNING"), Level::WARN);
    }

    // The only test that installs a global subscriber in this crate
    #[test]
    fn test_file_logging_installs_once() {
        let temp = tempfile::tempdir().unwrap();
        let log_dir = temp.path().join("logs");
        let config = EngineConfig {
            log_dir: Some(log_dir.clone()),
            log_level: "debug".to_string(),
            ..EngineConfig::default()
        };

        init_logging(&config).unwrap();
        tracing::warn!("file logging smoke test");

        let log_file = log_dir.join("snipsearch.log");
        assert!(log_file.is_file());
        let contents = std::fs::read_to_string(&log_file).unwrap();
        assert!(!contents.contains("\u{1b}["));
        // RUST_LOG overrides the configured level
        if std::env::var("RUST_LOG").is_err() {
            assert!(contents.contains("file logging smoke test"));
        }

        assert!(setup_console_logging("info").is_err());
        assert!(setup_logging(&log_dir, "info").is_err());
    }
}
