//! Injected logging.
//!
//! Pipeline components never log through a global. The host hands a
//! [`Logger`] to the display, which wraps it into a [`Log`] filtering records
//! by verbosity and passes it down to every component that reports.

use core::fmt;

const LEVEL_NAME_QUIET: &str = "quiet";
const LEVEL_NAME_ERROR: &str = "error";
const LEVEL_NAME_WARNING: &str = "warning";
const LEVEL_NAME_INFO: &str = "info";
const LEVEL_NAME_VERBOSE: &str = "verbose";
const LEVEL_NAME_DEBUG: &str = "debug";
const LEVEL_NAME_NOISY: &str = "noisy";
const LEVEL_NAME_VERY_NOISY: &str = "very-noisy";

/// Log severity, ordered from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum LogLevel {
    /// Nothing is logged.
    Quiet = 0,
    Error = 1,
    Warning = 2,
    #[default]
    Info = 3,
    Verbose = 4,
    Debug = 5,
    Noisy = 6,
    VeryNoisy = 7,
}

impl LogLevel {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Quiet,
            1 => Self::Error,
            2 => Self::Warning,
            3 => Self::Info,
            4 => Self::Verbose,
            5 => Self::Debug,
            6 => Self::Noisy,
            7 => Self::VeryNoisy,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => LEVEL_NAME_QUIET,
            Self::Error => LEVEL_NAME_ERROR,
            Self::Warning => LEVEL_NAME_WARNING,
            Self::Info => LEVEL_NAME_INFO,
            Self::Verbose => LEVEL_NAME_VERBOSE,
            Self::Debug => LEVEL_NAME_DEBUG,
            Self::Noisy => LEVEL_NAME_NOISY,
            Self::VeryNoisy => LEVEL_NAME_VERY_NOISY,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            LEVEL_NAME_QUIET => Some(Self::Quiet),
            LEVEL_NAME_ERROR => Some(Self::Error),
            LEVEL_NAME_WARNING => Some(Self::Warning),
            LEVEL_NAME_INFO => Some(Self::Info),
            LEVEL_NAME_VERBOSE => Some(Self::Verbose),
            LEVEL_NAME_DEBUG => Some(Self::Debug),
            LEVEL_NAME_NOISY => Some(Self::Noisy),
            LEVEL_NAME_VERY_NOISY => Some(Self::VeryNoisy),
            _ => None,
        }
    }
}

/// Log sink.
///
/// Implement this trait to route pipeline messages to the host's own
/// logging facility.
pub trait Logger {
    /// Write one record. Filtering already happened in [`Log`].
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>);
}

impl<L: Logger + ?Sized> Logger for &mut L {
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>) {
        (**self).log(level, args);
    }
}

/// Logger that drops every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&mut self, _level: LogLevel, _args: fmt::Arguments<'_>) {}
}

/// Logger printing to the ESP serial console.
#[cfg(feature = "esp32-log")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintlnLogger;

#[cfg(feature = "esp32-log")]
impl Logger for PrintlnLogger {
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>) {
        esp_println::println!("[{}] {}", level.as_str(), args);
    }
}

/// Logger forwarding to the `log` facade.
#[cfg(feature = "log")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateLogger;

#[cfg(feature = "log")]
impl Logger for LogCrateLogger {
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>) {
        let level = match level {
            LogLevel::Quiet => return,
            LogLevel::Error => ::log::Level::Error,
            LogLevel::Warning => ::log::Level::Warn,
            LogLevel::Info => ::log::Level::Info,
            LogLevel::Verbose | LogLevel::Debug => ::log::Level::Debug,
            LogLevel::Noisy | LogLevel::VeryNoisy => ::log::Level::Trace,
        };
        ::log::log!(target: "myrtio_frame_mapper", level, "{}", args);
    }
}

/// Verbosity filter in front of a [`Logger`].
#[derive(Debug)]
pub struct Log<L> {
    sink: L,
    verbosity: LogLevel,
}

impl<L: Logger> Log<L> {
    pub const fn new(sink: L, verbosity: LogLevel) -> Self {
        Self { sink, verbosity }
    }

    pub const fn verbosity(&self) -> LogLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: LogLevel) {
        self.verbosity = verbosity;
    }

    /// Check if records of `level` pass the filter.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Quiet && level <= self.verbosity
    }

    pub fn write(&mut self, level: LogLevel, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.sink.log(level, args);
        }
    }

    pub fn error(&mut self, args: fmt::Arguments<'_>) {
        self.write(LogLevel::Error, args);
    }

    pub fn warn(&mut self, args: fmt::Arguments<'_>) {
        self.write(LogLevel::Warning, args);
    }

    pub fn info(&mut self, args: fmt::Arguments<'_>) {
        self.write(LogLevel::Info, args);
    }

    pub fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.write(LogLevel::Debug, args);
    }

    pub const fn sink(&self) -> &L {
        &self.sink
    }

    pub fn into_sink(self) -> L {
        self.sink
    }
}
