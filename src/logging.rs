// File: src/logging.rs
//! Structured JSON-lines logging, constructed once and handed to the
//! components that emit records.

use std::{
    fmt,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Log severity level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One line of the log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub module: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, Value>,
}

impl LogRecord {
    pub fn new(module: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            module: module.into(),
            level,
            message: message.into(),
            metadata: serde_json::Map::new(),
        }
    }
}

/// Append-only JSON logger.
#[derive(Debug)]
pub struct JsonLogger {
    path: PathBuf,
    writer: Mutex<File>,
}

impl JsonLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    pub fn log(&self, record: &LogRecord) -> Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Logging context passed to components at construction time.
///
/// Cloning is cheap; all clones share the same file handle. A handle built
/// with [`Telemetry::disabled`] drops every record.
#[derive(Clone)]
pub struct Telemetry {
    inner: Arc<TelemetryInner>,
}

struct TelemetryInner {
    module: String,
    min_level: LogLevel,
    logger: Option<JsonLogger>,
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("module", &self.inner.module)
            .field("enabled", &self.inner.logger.is_some())
            .finish()
    }
}

impl Telemetry {
    pub fn disabled(module: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TelemetryInner {
                module: module.into(),
                min_level: LogLevel::Error,
                logger: None,
            }),
        }
    }

    pub fn to_file(module: impl Into<String>, path: impl AsRef<Path>, min_level: LogLevel) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(TelemetryInner {
                module: module.into(),
                min_level,
                logger: Some(JsonLogger::new(path)?),
            }),
        })
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.inner.logger.is_some() && level >= self.inner.min_level
    }

    /// Writes a record. Failures are reported on stderr and otherwise ignored
    /// so that logging never interrupts a simplification run.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) {
        if !self.is_enabled(level) {
            return;
        }
        if let Some(logger) = &self.inner.logger {
            let mut record = LogRecord::new(&self.inner.module, level, message);
            if let Value::Object(map) = metadata {
                record.metadata = map;
            }
            if let Err(err) = logger.log(&record) {
                eprintln!("[simplify] failed to write log record: {err}");
            }
        }
    }

    pub fn debug(&self, message: &str, metadata: Value) {
        self.log(LogLevel::Debug, message, metadata);
    }

    pub fn info(&self, message: &str, metadata: Value) {
        self.log(LogLevel::Info, message, metadata);
    }

    pub fn warn(&self, message: &str, metadata: Value) {
        self.log(LogLevel::Warn, message, metadata);
    }
}
