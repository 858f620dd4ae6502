use parking_lot::Mutex;
/// Debug logging infrastructure for par-annotate
///
/// Controlled by DEBUG_LEVEL environment variable:
/// - 0 or unset: No debugging
/// - 1: Errors only
/// - 2: Info level (invocation lifecycle, registration)
/// - 3: Debug level (matcher resolution, region creation)
/// - 4: Trace level (every delivered line)
///
/// All output goes to /tmp/par_annotate_debug.log on Unix/macOS,
/// or %TEMP%\par_annotate_debug.log on Windows.
/// Records from the `log` facade are routed into the same file once
/// [`init_log_bridge`] has been called.
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_env() -> Self {
        match std::env::var("DEBUG_LEVEL") {
            Ok(val) => Self::from_number(&val),
            Err(_) => DebugLevel::Off,
        }
    }

    fn from_number(val: &str) -> Self {
        match val.trim().parse::<u8>() {
            Ok(1) => DebugLevel::Error,
            Ok(2) => DebugLevel::Info,
            Ok(3) => DebugLevel::Debug,
            Ok(4) => DebugLevel::Trace,
            _ => DebugLevel::Off,
        }
    }

    fn from_level_filter(filter: log::LevelFilter) -> Self {
        match filter {
            log::LevelFilter::Off => DebugLevel::Off,
            log::LevelFilter::Error => DebugLevel::Error,
            log::LevelFilter::Warn | log::LevelFilter::Info => DebugLevel::Info,
            log::LevelFilter::Debug => DebugLevel::Debug,
            log::LevelFilter::Trace => DebugLevel::Trace,
        }
    }
}

fn log_path() -> std::path::PathBuf {
    #[cfg(unix)]
    let path = std::path::PathBuf::from("/tmp/par_annotate_debug.log");
    #[cfg(windows)]
    let path = std::env::temp_dir().join("par_annotate_debug.log");
    path
}

/// Global debug logger
struct DebugLogger {
    level: DebugLevel,
    file: Option<std::fs::File>,
}

impl DebugLogger {
    fn new() -> Self {
        Self::with_level(DebugLevel::from_env())
    }

    fn with_level(level: DebugLevel) -> Self {
        if level == DebugLevel::Off {
            return DebugLogger { level, file: None };
        }

        match OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
        {
            Ok(f) => {
                let mut logger = DebugLogger {
                    level,
                    file: Some(f),
                };
                logger.write_raw(&format!(
                    "\n{}\npar-annotate debug session started at {} (level={:?})\n{}\n",
                    "=".repeat(80),
                    get_timestamp(),
                    level,
                    "=".repeat(80)
                ));
                logger
            }
            // Silently fail if log file can't be opened
            Err(_e) => DebugLogger { level, file: None },
        }
    }

    /// Raise the level (opening the file if needed). Never lowers it.
    fn raise_to(&mut self, level: DebugLevel) {
        if level <= self.level {
            return;
        }
        if self.file.is_none() {
            *self = Self::with_level(level);
        } else {
            self.level = level;
        }
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }

    fn log(&mut self, level: DebugLevel, category: &str, msg: &str) {
        if level <= self.level {
            let timestamp = get_timestamp();
            let level_str = match level {
                DebugLevel::Error => "ERROR",
                DebugLevel::Info => "INFO ",
                DebugLevel::Debug => "DEBUG",
                DebugLevel::Trace => "TRACE",
                DebugLevel::Off => return,
            };
            self.write_raw(&format!(
                "[{}] [{}] [{}] {}\n",
                timestamp, level_str, category, msg
            ));
        }
    }
}

static LOGGER: OnceLock<Mutex<DebugLogger>> = OnceLock::new();

fn get_logger() -> &'static Mutex<DebugLogger> {
    LOGGER.get_or_init(|| Mutex::new(DebugLogger::new()))
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Check if debugging is enabled at given level
pub fn is_enabled(level: DebugLevel) -> bool {
    let logger = get_logger().lock();
    level <= logger.level
}

/// Log a message at specified level
pub fn log(level: DebugLevel, category: &str, msg: &str) {
    let mut logger = get_logger().lock();
    logger.log(level, category, msg);
}

/// Log formatted message
pub fn logf(level: DebugLevel, category: &str, args: fmt::Arguments) {
    if is_enabled(level) {
        log(level, category, &format!("{}", args));
    }
}

/// `log::Log` implementation that writes facade records into the debug file.
struct LogBridge {
    mirror_stderr: bool,
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            log::Level::Error => DebugLevel::Error,
            log::Level::Warn | log::Level::Info => DebugLevel::Info,
            log::Level::Debug => DebugLevel::Debug,
            log::Level::Trace => DebugLevel::Trace,
        };
        let msg = format!("{}", record.args());
        log(level, record.target(), &msg);
        if self.mirror_stderr {
            eprintln!("[{}] [{}] {}", record.level(), record.target(), msg);
        }
    }

    fn flush(&self) {}
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

/// Route `log` facade records into the debug log file.
///
/// Level precedence: `cli_level` > `RUST_LOG` > [`DebugLevel`] from `DEBUG_LEVEL`.
/// When `RUST_LOG` is set records are mirrored to stderr as well.
/// Calling this more than once only adjusts the max level.
pub fn init_log_bridge(cli_level: Option<log::LevelFilter>) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let env_level = rust_log
        .as_deref()
        .and_then(|v| v.trim().parse::<log::LevelFilter>().ok());

    let filter = cli_level.or(env_level).unwrap_or_else(|| {
        match get_logger().lock().level {
            DebugLevel::Off => log::LevelFilter::Off,
            DebugLevel::Error => log::LevelFilter::Error,
            DebugLevel::Info => log::LevelFilter::Info,
            DebugLevel::Debug => log::LevelFilter::Debug,
            DebugLevel::Trace => log::LevelFilter::Trace,
        }
    });

    get_logger()
        .lock()
        .raise_to(DebugLevel::from_level_filter(filter));

    let bridge = BRIDGE.get_or_init(|| LogBridge {
        mirror_stderr: rust_log.is_some(),
    });
    // A second install attempt fails harmlessly; only the level changes.
    let _ = log::set_logger(bridge);
    log::set_max_level(filter);
}

/// Apply the config file's log level when neither CLI nor `RUST_LOG` set one.
pub fn apply_config_level(level: log::LevelFilter, cli_level: Option<log::LevelFilter>) {
    if cli_level.is_some() || std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if level > log::max_level() {
        get_logger()
            .lock()
            .raise_to(DebugLevel::from_level_filter(level));
        log::set_max_level(level);
    }
}

// Convenience macros for logging
#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Error, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Info, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Debug, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Trace, $category, format_args!($($arg)*))
    };
}
