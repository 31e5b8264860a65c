//! Declarative runtime configuration
//!
//! A [`LoggingConfig`] names the system and lists the sinks to register.
//! It is usually read from JSON:
//!
//! ```
//! use rust_log_dispatch::{LoggingConfig, SinkOutput};
//!
//! let config = LoggingConfig::from_json(r#"{
//!     "system": "app",
//!     "sinks": [
//!         {
//!             "name": "main",
//!             "severities": ["critical", "error", "warning"],
//!             "verbosity": 3,
//!             "output": {
//!                 "type": "rotating_file",
//!                 "path": "/var/log/app.log",
//!                 "max_size": 1048576
//!             }
//!         },
//!         {
//!             "name": "console",
//!             "subsystem": "net",
//!             "verbosity": 1,
//!             "output": { "type": "console", "stream": "stderr" }
//!         }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.sinks.len(), 2);
//! assert!(matches!(config.sinks[0].output, SinkOutput::RotatingFile { .. }));
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{LoggerError, Result};
use super::severity::{Severity, SeverityMask, Verbosity};
pub use crate::holders::writer::ConsoleStream;

fn default_severities() -> Vec<Severity> {
    Severity::ALL.to_vec()
}

fn default_check_interval_secs() -> u64 {
    60
}

/// Where a sink writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkOutput {
    /// Plain append-only file
    File {
        path: PathBuf,
        #[serde(default)]
        sync: bool,
    },

    /// File named by a time template such as `app-%Y%m%d.log`
    PatternFile {
        template: String,
        #[serde(default)]
        sync: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        check_interval_secs: Option<u64>,
    },

    /// File rotated once it grows past `max_size` bytes (0 disables rotation)
    RotatingFile {
        path: PathBuf,
        #[serde(default)]
        sync: bool,
        max_size: u64,
        #[serde(default = "default_check_interval_secs")]
        check_interval_secs: u64,
    },

    /// Standard output or standard error
    Console {
        #[serde(default)]
        stream: ConsoleStream,
    },
}

/// One sink registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Unique registration name
    pub name: String,

    /// Only records of this subsystem are accepted; empty accepts all
    #[serde(default)]
    pub subsystem: String,

    /// Accepted severities; all of them when omitted
    #[serde(default = "default_severities")]
    pub severities: Vec<Severity>,

    /// Verbosity ceiling; 0 disables the sink
    pub verbosity: Verbosity,

    pub output: SinkOutput,
}

impl SinkConfig {
    pub fn new(name: impl Into<String>, verbosity: Verbosity, output: SinkOutput) -> Self {
        Self {
            name: name.into(),
            subsystem: String::new(),
            severities: default_severities(),
            verbosity,
            output,
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_severities(mut self, severities: impl IntoIterator<Item = Severity>) -> Self {
        self.severities = severities.into_iter().collect();
        self
    }

    /// The configured severities as a mask
    pub fn mask(&self) -> SeverityMask {
        self.severities.iter().copied().collect()
    }

    /// Check the sink definition
    ///
    /// # Errors
    ///
    /// Returns error for an empty name, path or template, an empty severity
    /// list, or a zero check interval
    pub fn validate(&self) -> Result<()> {
        let component = format!("sink '{}'", self.name);
        if self.name.is_empty() {
            return Err(LoggerError::config("SinkConfig", "sink name must not be empty"));
        }
        if self.severities.is_empty() {
            return Err(LoggerError::config(component, "severities must not be empty"));
        }

        match &self.output {
            SinkOutput::File { path, .. } | SinkOutput::RotatingFile { path, .. }
                if path.as_os_str().is_empty() =>
            {
                Err(LoggerError::config(component, "path must not be empty"))
            }
            SinkOutput::PatternFile { template, .. } if template.is_empty() => {
                Err(LoggerError::config(component, "template must not be empty"))
            }
            SinkOutput::PatternFile {
                check_interval_secs: Some(0),
                ..
            }
            | SinkOutput::RotatingFile {
                check_interval_secs: 0,
                ..
            } => Err(LoggerError::config(
                component,
                "check_interval_secs must be positive",
            )),
            _ => Ok(()),
        }
    }
}

impl SinkOutput {
    /// Check interval of a scheduled output, if it has one
    pub fn check_interval(&self) -> Option<Duration> {
        match self {
            SinkOutput::PatternFile {
                check_interval_secs,
                ..
            } => check_interval_secs.map(Duration::from_secs),
            SinkOutput::RotatingFile {
                check_interval_secs,
                ..
            } => Some(Duration::from_secs(*check_interval_secs)),
            SinkOutput::File { .. } | SinkOutput::Console { .. } => None,
        }
    }
}

/// Full runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// System name written in front of every full-format line
    pub system: String,

    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

impl LoggingConfig {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            sinks: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_sink(mut self, sink: SinkConfig) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Parse and validate a JSON configuration
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the configuration is invalid
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoggingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or does not validate
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "read logging configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every sink and reject duplicate sink names
    ///
    /// # Errors
    ///
    /// Returns the first problem found
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for sink in &self.sinks {
            sink.validate()?;
            if !names.insert(sink.name.as_str()) {
                return Err(LoggerError::config(
                    "LoggingConfig",
                    format!("duplicate sink name '{}'", sink.name),
                ));
            }
        }
        Ok(())
    }
}
