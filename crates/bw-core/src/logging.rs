//! Logging infrastructure for the bankwise debugger

use std::fs::File;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, LogLevel};

fn to_level(level: LogLevel) -> Option<Level> {
    match level {
        LogLevel::Off => None,
        LogLevel::Error => Some(Level::ERROR),
        LogLevel::Warn => Some(Level::WARN),
        LogLevel::Info => Some(Level::INFO),
        LogLevel::Debug => Some(Level::DEBUG),
        LogLevel::Trace => Some(Level::TRACE),
    }
}

/// Initialize the logging system based on configuration
///
/// A log file that cannot be created is reported once console logging is up.
pub fn init(config: &Config) {
    let Some(level) = to_level(config.debug.log_level) else {
        return;
    };

    let (file_layer, file_error) = if config.debug.log_to_file {
        match File::create(&config.debug.log_path) {
            Ok(file) => (
                Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false)),
                None,
            ),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if let Some(e) = file_error {
        tracing::warn!(
            "Cannot open log file {:?}, logging to console only: {}",
            config.debug.log_path,
            e
        );
    }
    if !installed {
        tracing::debug!("Global logger already installed, keeping it");
    }
}

/// Console-only logging at info level for tests and tools
pub fn init_default() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(fmt::layer())
        .try_init();
}

// Convenience macros for component-specific logging

/// Log an address resolution trace message
#[macro_export]
macro_rules! resolver_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "resolver", $($arg)*)
    };
}

/// Log a label registry debug message
#[macro_export]
macro_rules! label_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "labels", $($arg)*)
    };
}

/// Log a breakpoint registry debug message
#[macro_export]
macro_rules! bp_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "breakpoints", $($arg)*)
    };
}

/// Log a watch registry debug message
#[macro_export]
macro_rules! watch_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "watch", $($arg)*)
    };
}

/// Log a workspace lifecycle message
#[macro_export]
macro_rules! workspace_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "workspace", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(to_level(LogLevel::Off), None);
        assert_eq!(to_level(LogLevel::Warn), Some(Level::WARN));
        assert_eq!(to_level(LogLevel::Trace), Some(Level::TRACE));
    }

    #[test]
    fn test_unwritable_log_path_falls_back() {
        let mut config = Config::default();
        config.debug.log_to_file = true;
        config.debug.log_path = std::env::temp_dir()
            .join("bankwise-missing-dir")
            .join("nested")
            .join("bankwise.log");
        init(&config);
        assert!(!config.debug.log_path.exists());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_default();
        init(&Config::default());
        crate::label_debug!("logging initialised");
    }
}
