//! Logging capability
//!
//! The hub logs through a capability trait instead of a fixed backend, so it
//! functions identically under a console logger, a test capture logger, or no
//! logger at all. The console implementation delegates to `tracing`.

use std::sync::Arc;

use core::fmt;

// ----------------------------------------------------------------------------
// Log Levels
// ----------------------------------------------------------------------------

/// Log levels used across the hub, most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warning,
    Debug,
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Verbose => write!(f, "VERBOSE"),
        }
    }
}

// ----------------------------------------------------------------------------
// Logger Capability
// ----------------------------------------------------------------------------

/// Logging sink consumed by the runtime.
pub trait HubLogger: Send + Sync {
    fn log(&self, level: LogLevel, tag: &str, message: &str);
}

/// Console logger delegating to the `tracing` macros.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl HubLogger for ConsoleLogger {
    fn log(&self, level: LogLevel, tag: &str, message: &str) {
        if level > self.min_level {
            return;
        }
        match level {
            LogLevel::Error => tracing::error!(target: "hubkit", "[{tag}] {message}"),
            LogLevel::Warning => tracing::warn!(target: "hubkit", "[{tag}] {message}"),
            LogLevel::Debug => tracing::debug!(target: "hubkit", "[{tag}] {message}"),
            LogLevel::Verbose => tracing::trace!(target: "hubkit", "[{tag}] {message}"),
        }
    }
}

/// Logger that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl HubLogger for NoOpLogger {
    fn log(&self, _level: LogLevel, _tag: &str, _message: &str) {}
}

// ----------------------------------------------------------------------------
// Logger Wrapper
// ----------------------------------------------------------------------------

/// Cheaply cloneable logger handle passed into every lane.
#[derive(Clone)]
pub enum LoggerWrapper {
    Console(ConsoleLogger),
    NoOp(NoOpLogger),
    Custom(Arc<dyn HubLogger>),
}

impl LoggerWrapper {
    pub fn log(&self, level: LogLevel, tag: &str, message: &str) {
        match self {
            LoggerWrapper::Console(logger) => logger.log(level, tag, message),
            LoggerWrapper::NoOp(logger) => logger.log(level, tag, message),
            LoggerWrapper::Custom(logger) => logger.log(level, tag, message),
        }
    }

    pub fn error(&self, tag: &str, message: &str) {
        self.log(LogLevel::Error, tag, message);
    }

    pub fn warning(&self, tag: &str, message: &str) {
        self.log(LogLevel::Warning, tag, message);
    }

    pub fn debug(&self, tag: &str, message: &str) {
        self.log(LogLevel::Debug, tag, message);
    }

    pub fn verbose(&self, tag: &str, message: &str) {
        self.log(LogLevel::Verbose, tag, message);
    }
}

impl Default for LoggerWrapper {
    fn default() -> Self {
        LoggerWrapper::NoOp(NoOpLogger)
    }
}

impl fmt::Debug for LoggerWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerWrapper::Console(_) => write!(f, "LoggerWrapper::Console"),
            LoggerWrapper::NoOp(_) => write!(f, "LoggerWrapper::NoOp"),
            LoggerWrapper::Custom(_) => write!(f, "LoggerWrapper::Custom"),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
