//! Capture logger
//!
//! Stores every log line for assertion instead of printing it.

use std::sync::{Arc, Mutex};

use hubkit_core::internal::{HubLogger, LogLevel, LoggerWrapper};

/// Logger that records `(level, tag, message)` triples.
#[derive(Clone, Default)]
pub struct CaptureLogger {
    lines: Arc<Mutex<Vec<(LogLevel, String, String)>>>,
}

impl CaptureLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap this capture in a [`LoggerWrapper`] for the hub builder.
    pub fn wrapper(&self) -> LoggerWrapper {
        LoggerWrapper::Custom(Arc::new(self.clone()))
    }

    pub fn lines(&self) -> Vec<(LogLevel, String, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Messages logged at or above the given severity.
    pub fn at_least(&self, level: LogLevel) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(line_level, _, _)| *line_level <= level)
            .map(|(_, tag, message)| format!("[{tag}] {message}"))
            .collect()
    }
}

impl HubLogger for CaptureLogger {
    fn log(&self, level: LogLevel, tag: &str, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((level, tag.to_string(), message.to_string()));
    }
}
