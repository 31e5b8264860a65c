//! Line formatting for text sinks

use std::io::{self, Write};

use chrono::{DateTime, Local};

use crate::core::severity::{Severity, Verbosity};
use crate::holders::writer::{Color, FileWriter};

/// Everything a formatter needs to render one record
#[derive(Debug, Clone, Copy)]
pub struct LineRecord<'a> {
    pub system: &'a str,
    pub subsystem: &'a str,
    pub severity: Severity,
    pub verbosity: Verbosity,
    pub time: DateTime<Local>,
    pub line: &'a str,
}

/// Renders a record as one line of text on a [`FileWriter`]
pub trait LineFormatter: Send + Sync {
    fn write_line(&self, writer: &mut dyn FileWriter, record: &LineRecord<'_>) -> io::Result<()>;
}

/// The stock formatter
///
/// Full form:
///
/// ```text
/// testlog 2018-08-25T14:02:00 [   ERROR, 2] (net): connection reset
/// ```
///
/// The short form drops the system name and the timestamp. Critical lines are
/// red, errors yellow and warnings blue when the writer supports color.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLineFormatter {
    short: bool,
}

impl DefaultLineFormatter {
    pub fn new() -> Self {
        Self { short: false }
    }

    pub fn short() -> Self {
        Self { short: true }
    }

    pub fn is_short(&self) -> bool {
        self.short
    }

    /// Render a record without colors
    pub fn format(&self, record: &LineRecord<'_>) -> String {
        if self.short {
            format!(
                "[{:>8}, {}] ({}): {}\n",
                record.severity.code(),
                record.verbosity,
                record.subsystem,
                record.line
            )
        } else {
            format!(
                "{} {} [{:>8}, {}] ({}): {}\n",
                record.system,
                record.time.format("%Y-%m-%dT%H:%M:%S"),
                record.severity.code(),
                record.verbosity,
                record.subsystem,
                record.line
            )
        }
    }

    pub fn color_for(severity: Severity) -> Color {
        match severity {
            Severity::Critical => Color::Red,
            Severity::Error => Color::Yellow,
            Severity::Warning => Color::Blue,
            Severity::Info | Severity::Debug => Color::None,
        }
    }
}

impl LineFormatter for DefaultLineFormatter {
    fn write_line(&self, writer: &mut dyn FileWriter, record: &LineRecord<'_>) -> io::Result<()> {
        let color = Self::color_for(record.severity);
        if color != Color::None {
            writer.change_color(color);
        }

        // One write per line keeps lines whole on the underlying file
        let result = writer.write_all(self.format(record).as_bytes());

        if color != Color::None {
            writer.reset_color();
        }
        result
    }
}
