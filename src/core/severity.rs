//! Severity and verbosity definitions
//!
//! Every severity is a distinct bit so a sink's accepted severities can be
//! expressed as a bitwise union ([`SeverityMask`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// Verbosity of a record: lower numbers are more important. As a sink
/// ceiling, `0` disables the sink entirely.
pub type Verbosity = u32;

/// Severity of a log record, ordered Critical > Error > Warning > Info > Debug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum Severity {
    Critical = 1,
    Error = 2,
    Warning = 4,
    Info = 8,
    Debug = 16,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Debug,
    ];

    #[inline]
    pub fn bit(self) -> u32 {
        self as u32
    }

    pub fn code(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CRITICAL" | "FATAL" => Ok(Severity::Critical),
            "ERROR" => Ok(Severity::Error),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "INFO" => Ok(Severity::Info),
            "DEBUG" => Ok(Severity::Debug),
            _ => Err(format!("Invalid severity: '{}'", s)),
        }
    }
}

/// Set of severities accepted by a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityMask(u32);

impl SeverityMask {
    pub const NONE: SeverityMask = SeverityMask(0);
    pub const CRITICAL: SeverityMask = SeverityMask(Severity::Critical as u32);
    pub const ERROR: SeverityMask = SeverityMask(Severity::Error as u32);
    pub const WARNING: SeverityMask = SeverityMask(Severity::Warning as u32);
    pub const INFO: SeverityMask = SeverityMask(Severity::Info as u32);
    pub const DEBUG: SeverityMask = SeverityMask(Severity::Debug as u32);
    /// Everything except debug records
    pub const STD: SeverityMask = SeverityMask(
        Severity::Critical as u32
            | Severity::Error as u32
            | Severity::Warning as u32
            | Severity::Info as u32,
    );
    pub const ALL: SeverityMask = SeverityMask(Self::STD.0 | Severity::Debug as u32);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        SeverityMask(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn contains(self, severity: Severity) -> bool {
        self.0 & severity.bit() != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<Severity> for SeverityMask {
    fn from(severity: Severity) -> Self {
        SeverityMask(severity.bit())
    }
}

impl FromIterator<Severity> for SeverityMask {
    fn from_iter<I: IntoIterator<Item = Severity>>(iter: I) -> Self {
        iter.into_iter()
            .fold(SeverityMask::NONE, |mask, severity| mask | severity)
    }
}

impl BitOr for SeverityMask {
    type Output = SeverityMask;

    fn bitor(self, rhs: SeverityMask) -> SeverityMask {
        SeverityMask(self.0 | rhs.0)
    }
}

impl BitOr<Severity> for SeverityMask {
    type Output = SeverityMask;

    fn bitor(self, rhs: Severity) -> SeverityMask {
        SeverityMask(self.0 | rhs.bit())
    }
}

impl BitOr for Severity {
    type Output = SeverityMask;

    fn bitor(self, rhs: Severity) -> SeverityMask {
        SeverityMask(self.bit() | rhs.bit())
    }
}

impl BitOrAssign<Severity> for SeverityMask {
    fn bitor_assign(&mut self, rhs: Severity) {
        self.0 |= rhs.bit();
    }
}

impl fmt::Display for SeverityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for severity in Severity::ALL.iter().filter(|s| self.contains(**s)) {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(severity.code())?;
            first = false;
        }
        if first {
            f.write_str("NONE")?;
        }
        Ok(())
    }
}
