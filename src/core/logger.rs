// ASN Blocklist Generator - Systemd-Style Logger
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Systemd-style logging compatible with journald
//!
//! Levels follow syslog priorities. Records go to stderr either as coloured
//! terminal lines or as journald `KEY=value` blocks.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Log levels following systemd priority conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Error conditions (3)
    Error = 3,
    /// Warning conditions (4)
    Warning = 4,
    /// Normal but significant condition (5)
    Notice = 5,
    /// Informational message (6)
    Info = 6,
    /// Debug-level message (7)
    Debug = 7,
}

impl LogLevel {
    pub fn from_priority(priority: u8) -> Self {
        match priority {
            0..=3 => LogLevel::Error,
            4 => LogLevel::Warning,
            5 => LogLevel::Notice,
            7 => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    pub fn priority(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERR",
            LogLevel::Warning => "WARNING",
            LogLevel::Notice => "NOTICE",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn color_code(self) -> &'static str {
        match self {
            LogLevel::Error => "\x1b[31m",
            LogLevel::Warning => "\x1b[33m",
            LogLevel::Notice => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Debug => "\x1b[37m",
        }
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum log level to output
    pub min_level: LogLevel,
    /// Whether to use colors in output
    pub use_colors: bool,
    /// Whether to include timestamps
    pub include_timestamp: bool,
    /// Whether to include the emitting module path
    pub include_target: bool,
    /// Whether to format for journald (structured format)
    pub journald_format: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            use_colors: atty::is(atty::Stream::Stderr),
            include_timestamp: true,
            include_target: false,
            journald_format: false,
        }
    }
}

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

#[derive(Debug)]
pub struct Logger {
    config: LoggerConfig,
    min_level: AtomicU8,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            min_level: AtomicU8::new(config.min_level.priority()),
            config,
        }
    }

    /// Install the global logger. Fails if one is already installed.
    pub fn init(config: LoggerConfig) -> Result<(), LoggerError> {
        let logger = Self::new(config);

        let mut global_logger = LOGGER.lock().map_err(|_| LoggerError::InitError)?;
        if global_logger.is_some() {
            return Err(LoggerError::AlreadyInitialized);
        }
        *global_logger = Some(logger);

        Ok(())
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level.priority(), Ordering::Relaxed);
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level.priority() <= self.min_level.load(Ordering::Relaxed)
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) {
        if !self.should_log(level) {
            return;
        }
        eprintln!("{}", self.format(level, target, message, self.timestamp()));
    }

    fn timestamp(&self) -> Option<u64> {
        if !self.config.include_timestamp {
            return None;
        }
        Some(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        )
    }

    fn format(&self, level: LogLevel, target: &str, message: &str, timestamp: Option<u64>) -> String {
        if self.config.journald_format {
            self.format_journald(level, target, message, timestamp)
        } else {
            self.format_terminal(level, target, message, timestamp)
        }
    }

    fn format_journald(&self, level: LogLevel, target: &str, message: &str, timestamp: Option<u64>) -> String {
        let mut output = String::new();

        output.push_str(&format!("PRIORITY={}\n", level.priority()));
        output.push_str(&format!("MESSAGE={}\n", message));

        if self.config.include_target && !target.is_empty() {
            output.push_str(&format!("CODE_FILE={}\n", target));
        }

        if let Some(ts) = timestamp {
            // journald expects microseconds
            output.push_str(&format!("_SOURCE_REALTIME_TIMESTAMP={}\n", ts * 1_000_000));
        }

        output.push_str("SYSLOG_IDENTIFIER=asn-blocklist\n");

        output
    }

    fn format_terminal(&self, level: LogLevel, target: &str, message: &str, timestamp: Option<u64>) -> String {
        let mut output = String::new();

        if let Some(ts) = timestamp {
            let datetime = chrono::DateTime::from_timestamp(ts as i64, 0)
                .unwrap_or_default()
                .format("%Y-%m-%d %H:%M:%S");
            output.push_str(&format!("{} ", datetime));
        }

        // Status lines like "[   OK   ] ..." carry their own marker
        let is_status_line = message.starts_with("[*]")
            || message.starts_with("[   OK   ]")
            || message.starts_with("[  FAILED ]");

        if is_status_line {
            if self.config.use_colors {
                output.push_str(&format!("{}{}\x1b[0m", level.color_code(), message));
            } else {
                output.push_str(message);
            }
        } else if self.config.use_colors {
            output.push_str(&format!("{}[{}]\x1b[0m {}", level.color_code(), level.as_str(), message));
        } else {
            output.push_str(&format!("[{}] {}", level.as_str(), message));
        }

        if self.config.include_target && !target.is_empty() {
            output.push_str(&format!(" ({})", target));
        }

        output
    }
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Error, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Warning, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Info, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Debug, module_path!(), &format!($($arg)*))
    };
}

pub fn log_with_level(level: LogLevel, target: &str, message: &str) {
    if let Ok(logger_guard) = LOGGER.lock() {
        if let Some(ref logger) = *logger_guard {
            logger.log(level, target, message);
        }
    }
}

/// Systemd-style initialization message with loading indicator
pub fn log_init_start(service_name: &str) {
    let message = format!("[*] Starting {}...", service_name);
    log_with_level(LogLevel::Notice, module_path!(), &message);
}

pub fn log_init_ok_with_details(service_name: &str, details: &str) {
    let message = format!("[   OK   ] Starting {} ({})", service_name, details);
    log_with_level(LogLevel::Info, module_path!(), &message);
}

pub fn log_init_failed(service_name: &str, error: &str) {
    let message = format!("[  FAILED ] Starting {} - {}", service_name, error);
    log_with_level(LogLevel::Error, module_path!(), &message);
}

#[macro_export]
macro_rules! log_init_start {
    ($service:expr) => {
        $crate::core::logger::log_init_start($service);
    };
}

#[macro_export]
macro_rules! log_init_ok_with_details {
    ($service:expr, $details:expr) => {
        $crate::core::logger::log_init_ok_with_details($service, $details);
    };
}

#[macro_export]
macro_rules! log_init_failed {
    ($service:expr, $error:expr) => {
        $crate::core::logger::log_init_failed($service, $error);
    };
}

/// Logger initialization errors
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Logger already initialized")]
    AlreadyInitialized,
    #[error("Failed to initialize logger")]
    InitError,
}

/// Initialize logger from CLI arguments
pub fn init_from_args(debug: bool, trace: bool, journald: bool) -> Result<(), LoggerError> {
    let min_level = if debug || trace { LogLevel::Debug } else { LogLevel::Info };

    let config = LoggerConfig {
        min_level,
        use_colors: atty::is(atty::Stream::Stderr) && !journald,
        include_timestamp: !journald,
        include_target: trace,
        journald_format: journald,
    };

    Logger::init(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_config(min_level: LogLevel) -> LoggerConfig {
        LoggerConfig {
            min_level,
            use_colors: false,
            include_timestamp: false,
            include_target: false,
            journald_format: false,
        }
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert_eq!(LogLevel::from_priority(0), LogLevel::Error);
        assert_eq!(LogLevel::from_priority(42), LogLevel::Info);
    }

    #[test]
    fn test_logger_level_filtering() {
        let logger = Logger::new(plain_config(LogLevel::Warning));

        assert!(logger.should_log(LogLevel::Error));
        assert!(logger.should_log(LogLevel::Warning));
        assert!(!logger.should_log(LogLevel::Info));

        logger.set_min_level(LogLevel::Debug);
        assert!(logger.should_log(LogLevel::Debug));
    }

    #[test]
    fn test_terminal_format() {
        let logger = Logger::new(plain_config(LogLevel::Info));
        let line = logger.format(LogLevel::Info, "asn_blocklist::web", "Served AS13335", None);
        assert_eq!(line, "[INFO] Served AS13335");

        let status = logger.format(LogLevel::Info, "", "[   OK   ] Starting HTTP server", None);
        assert_eq!(status, "[   OK   ] Starting HTTP server");
    }

    #[test]
    fn test_journald_format() {
        let config = LoggerConfig {
            journald_format: true,
            include_target: true,
            ..plain_config(LogLevel::Info)
        };
        let logger = Logger::new(config);
        let record = logger.format(LogLevel::Warning, "asn_blocklist::storage", "cache write failed", Some(2));

        assert!(record.contains("PRIORITY=4\n"));
        assert!(record.contains("MESSAGE=cache write failed\n"));
        assert!(record.contains("CODE_FILE=asn_blocklist::storage\n"));
        assert!(record.contains("_SOURCE_REALTIME_TIMESTAMP=2000000\n"));
        assert!(record.ends_with("SYSLOG_IDENTIFIER=asn-blocklist\n"));
    }
}
