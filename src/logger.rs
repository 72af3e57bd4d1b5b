//! Custom logging module.
//!
//! This module provides a custom logger implementation that formats log
//! records and forwards them to an installable callback (stderr for the
//! binary, a buffer in tests).

use crate::error::AppError;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Arc, Mutex};

/// Format a log record into a string for display
///
pub fn format_log(record: &Record) -> String {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let level_str = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    format!("{} {} {}", timestamp, level_str, record.args())
}

/// Returns the level filter for a number of `-v` occurrences, starting at
/// info.
///
pub fn level_for_verbosity(occurrences: u64) -> LevelFilter {
    match occurrences {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

type LogCallback = Box<dyn Fn(String) + Send + Sync>;

/// Custom logger that forwards formatted records to a callback
///
pub struct CustomLogger {
    level: LevelFilter,
    log_callback: Arc<Mutex<Option<LogCallback>>>,
}

impl CustomLogger {
    pub fn new(level: LevelFilter) -> Self {
        CustomLogger {
            level,
            log_callback: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_log_callback(&self, callback: LogCallback) {
        if let Ok(mut guard) = self.log_callback.lock() {
            *guard = Some(callback);
        }
    }

    /// Install a logger with the given level and callback as the global
    /// logger.
    ///
    pub fn init(level: LevelFilter, callback: LogCallback) -> Result<(), AppError> {
        let logger = CustomLogger::new(level);
        logger.set_log_callback(callback);
        let logger: &'static CustomLogger = Box::leak(Box::new(logger));
        log::set_logger(logger).map_err(|e| AppError::Logger(e.to_string()))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(callback) = self.log_callback.lock() {
                if let Some(ref cb) = *callback {
                    cb(format_log(record));
                }
            }
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(logger: &CustomLogger) -> Arc<Mutex<Vec<String>>> {
        let lines = Arc::new(Mutex::new(vec![]));
        let sink = Arc::clone(&lines);
        logger.set_log_callback(Box::new(move |line: String| {
            if let Ok(mut lines) = sink.lock() {
                lines.push(line);
            }
        }));
        lines
    }

    #[test]
    fn format_includes_level_and_message() {
        let line = format_log(
            &Record::builder()
                .args(format_args!("Mounted synchronizer."))
                .level(Level::Debug)
                .build(),
        );
        assert!(line.ends_with("DEBUG Mounted synchronizer."));
    }

    #[test]
    fn records_above_level_are_dropped() {
        let logger = CustomLogger::new(LevelFilter::Info);
        let lines = captured(&logger);
        logger.log(
            &Record::builder()
                .args(format_args!("kept"))
                .level(Level::Warn)
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("dropped"))
                .level(Level::Debug)
                .build(),
        );
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("WARN kept"));
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Info);
        assert_eq!(level_for_verbosity(1), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(5), LevelFilter::Trace);
    }
}
