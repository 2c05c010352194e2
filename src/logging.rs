/// Structured logging for the SCB insights service
///
/// Provides context-rich logging with dataset identifiers, timestamps,
/// and severity levels. Supports both console output and file-based
/// logging for long-running deployments.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::ScbError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Scb,
    Cache,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Scb => write!(f, "SCB"),
            DataSource::Cache => write!(f, "CACHE"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the metadata endpoint is known to be flaky and
    /// degraded label resolution has a defined fallback
    Expected,
    /// Unexpected failure - indicates an API change or a bug on our side
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *LOGGER.lock().unwrap() = Some(logger);
    }

    /// Log a message with the global logger
    fn log(&self, level: LogLevel, source: &DataSource, dataset_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        // Format the log entry
        let dataset_part = dataset_id.map(|d| format!(" [{}]", d)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, source, dataset_part, message
        );

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, dataset_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, dataset_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(source: DataSource, dataset_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, &source, dataset_id, message);
    }
}

/// Log a warning message
pub fn warn(source: DataSource, dataset_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, &source, dataset_id, message);
    }
}

/// Log an error message
pub fn error(source: DataSource, dataset_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, &source, dataset_id, message);
    }
}

/// Log a debug message
pub fn debug(source: DataSource, dataset_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, &source, dataset_id, message);
    }
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a fetch failure based on the error variant.
///
/// Schema and parse failures mean the API shape changed under us (or a bug
/// in the normalizer) and demand attention. Rate limiting and upstream
/// outages come and go on their own. Transport failures could be either;
/// the network here or the service there.
pub fn classify_fetch_failure(err: &ScbError) -> FailureType {
    match err {
        ScbError::Schema { .. } | ScbError::Parse(_) => FailureType::Unexpected,
        // 429 and 5xx are service strain on SCB's side; retry later.
        ScbError::HttpStatus(429) | ScbError::HttpStatus(500..=599) => FailureType::Unknown,
        ScbError::HttpStatus(_) => FailureType::Unexpected,
        ScbError::Upstream(_) => FailureType::Unknown,
    }
}

/// Classify a degraded metadata retrieval. The variables endpoint is
/// observed to be unreliable, so this is an expected failure with a
/// defined fallback (raw codes).
pub fn classify_metadata_degradation() -> FailureType {
    FailureType::Expected
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a fetch failure with automatic classification
pub fn log_fetch_failure(dataset_id: &str, operation: &str, err: &ScbError) {
    let failure_type = classify_fetch_failure(err);

    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(DataSource::Scb, Some(dataset_id), &message),
        FailureType::Unexpected => error(DataSource::Scb, Some(dataset_id), &message),
        FailureType::Unknown => warn(DataSource::Scb, Some(dataset_id), &message),
    }
}

/// Log a metadata degradation (resolver falling back to raw codes)
pub fn log_metadata_degraded(dataset_id: &str, detail: &str) {
    let message = format!(
        "metadata unavailable [{}]: {}; rendering raw codes",
        classify_metadata_degradation(),
        detail
    );
    warn(DataSource::Scb, Some(dataset_id), &message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        let schema = ScbError::Schema {
            row: 0,
            expected: 2,
            actual: 1,
            section: "key",
        };
        assert_eq!(classify_fetch_failure(&schema), FailureType::Unexpected);

        assert_eq!(
            classify_fetch_failure(&ScbError::HttpStatus(503)),
            FailureType::Unknown
        );
        assert_eq!(
            classify_fetch_failure(&ScbError::HttpStatus(404)),
            FailureType::Unexpected
        );
        assert_eq!(
            classify_fetch_failure(&ScbError::Upstream("timed out".to_string())),
            FailureType::Unknown
        );
    }

    #[test]
    fn test_metadata_degradation_is_expected() {
        assert_eq!(classify_metadata_degradation(), FailureType::Expected);
    }
}
