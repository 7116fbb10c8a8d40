//! File logging for folio-shell.
//!
//! Log levels:
//! - ERROR: Failures that end a command or the front end
//! - WARN: Rejected elevations, remote failures, recovered conditions
//! - INFO: Startup, shutdown, command dispatch
//! - DEBUG: State transitions of the shell (only in debug mode)
//!
//! Debug mode can be enabled with `--debug` flag or `FOLIO_DEBUG=1` env var.
//! Secrets typed at the elevation prompt are never written to the log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// `FOLIO_DEBUG` values that switch debug logging on.
fn debug_requested(value: Option<&str>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Start logging to `~/.folio/folio.log`, truncating the previous run's log.
pub fn init_with_debug(debug: bool) {
    let env = std::env::var("FOLIO_DEBUG").ok();
    let level = if debug || debug_requested(env.as_deref()) {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    MAX_LEVEL.store(level as u8, Ordering::SeqCst);

    if let Some(folio_dir) = dirs::home_dir().map(|h| h.join(".folio")) {
        let _ = std::fs::create_dir_all(&folio_dir);
        let path = folio_dir.join("folio.log");
        let _ = std::fs::write(&path, "");
        LOG_PATH.set(path).ok();
    }
}

fn enabled(level: LogLevel) -> bool {
    level as u8 <= MAX_LEVEL.load(Ordering::Relaxed)
}

pub fn log_at(level: LogLevel, msg: &str) {
    if !enabled(level) {
        return;
    }
    let Some(path) = LOG_PATH.get() else { return };
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        let _ = writeln!(file, "[{}] [{}] {}", timestamp, level.as_str(), msg);
    }
}

/// Log macro for INFO level.
#[macro_export]
macro_rules! flog {
    ($($arg:tt)*) => {
        $crate::log::log_at($crate::log::LogLevel::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! flog_error {
    ($($arg:tt)*) => {
        $crate::log::log_at($crate::log::LogLevel::Error, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! flog_warn {
    ($($arg:tt)*) => {
        $crate::log::log_at($crate::log::LogLevel::Warn, &format!($($arg)*))
    };
}

/// Only written in debug mode.
#[macro_export]
macro_rules! flog_debug {
    ($($arg:tt)*) => {
        $crate::log::log_at($crate::log::LogLevel::Debug, &format!($($arg)*))
    };
}
