//! FILENAME: app/cli/src/logging.rs
// PURPOSE: Unified logging for the cube tool.
// FORMAT: seq|level|category|message

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Mutex;

use once_cell::sync::Lazy;

// ============================================================================
// UNIFIED LOGGING SYSTEM
// ============================================================================

/// Global sequence counter shared by every log line of the process
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Global log file handle
pub static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

/// Lowest level rank echoed to stderr (D=0, I=1, W=2, E=3)
static ECHO_RANK: AtomicU8 = AtomicU8::new(2);

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1
}

fn level_rank(level: &str) -> u8 {
    match level {
        "D" => 0,
        "I" => 1,
        "W" => 2,
        _ => 3,
    }
}

/// Sets the lowest level ("D", "I", "W" or "E") echoed to stderr.
/// The log file always receives every line.
pub fn set_echo_level(level: &str) {
    ECHO_RANK.store(level_rank(level), Ordering::SeqCst);
}

pub fn format_log_line(seq: u64, level: &str, category: &str, message: &str) -> String {
    format!("{}|{}|{}|{}", seq, level, category, message)
}

/// Opens (appending) the unified log file, creating parent directories.
pub fn init_log_file(path: &Path) -> Result<PathBuf, String> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create log dir at {:?}: {}", dir, e))?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open log file {:?}: {}", path, e))?;

    let mut log_file = LOG_FILE.lock().map_err(|e| format!("Lock error: {}", e))?;
    *log_file = Some(file);

    Ok(path.to_path_buf())
}

/// Write a log line in unified format
pub fn write_log(level: &str, category: &str, message: &str) {
    let seq = next_seq();
    let line = format_log_line(seq, level, category, message);

    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(ref mut file) = *guard {
            if let Err(e) = writeln!(file, "{}", line) {
                eprintln!("[LOG_ERROR] Failed to write: {}", e);
            }
            let _ = file.flush();
        }
    }

    // stdout is reserved for command output
    if level_rank(level) >= ECHO_RANK.load(Ordering::SeqCst) {
        eprintln!("{}", line);
    }
}

/// Write an ENTER log line for function entry
pub fn write_log_enter(level: &str, category: &str, func_name: &str, params: &str) {
    let message = if params.is_empty() {
        format!("ENTER {}", func_name)
    } else {
        format!("ENTER {} {}", func_name, params)
    };
    write_log(level, category, &message);
}

/// Write an EXIT log line for function exit
pub fn write_log_exit(level: &str, category: &str, func_name: &str, result: &str) {
    let message = if result.is_empty() {
        format!("EXIT {}", func_name)
    } else {
        format!("EXIT {} {}", func_name, result)
    };
    write_log(level, category, &message);
}

// ============================================================================
// BRIDGE FOR THE `log` FACADE
// ============================================================================

/// Routes records from the core crates (which log through `log`) into the
/// unified format. The category is the last segment of the record target.
struct UnifiedLogger;

static LOGGER: UnifiedLogger = UnifiedLogger;

pub fn category_of(target: &str) -> String {
    target
        .rsplit("::")
        .next()
        .unwrap_or(target)
        .to_ascii_uppercase()
}

fn level_code(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "E",
        log::Level::Warn => "W",
        log::Level::Info => "I",
        log::Level::Debug | log::Level::Trace => "D",
    }
}

impl log::Log for UnifiedLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            write_log(
                level_code(record.level()),
                &category_of(record.target()),
                &record.args().to_string(),
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = LOG_FILE.lock() {
            if let Some(ref mut file) = *guard {
                let _ = file.flush();
            }
        }
    }
}

/// Installs the bridge. Returns false when a logger was already set.
pub fn init_logger(level: log::LevelFilter) -> bool {
    match log::set_logger(&LOGGER) {
        Ok(()) => {
            log::set_max_level(level);
            true
        }
        Err(_) => false,
    }
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("D", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("I", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("W", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("E", $cat, &format!($($arg)*))
    };
}

// Info-level ENTER/EXIT for the top-level operations

#[macro_export]
macro_rules! log_enter_info {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_enter("I", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_enter("I", $cat, $func, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit_info {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_exit("I", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_exit("I", $cat, $func, &format!($($arg)*))
    };
}

pub use log_debug;
pub use log_enter_info;
pub use log_error;
pub use log_exit_info;
pub use log_info;
pub use log_warn;
