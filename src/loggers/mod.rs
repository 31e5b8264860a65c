//! Sink adapters implementing [`Logger`](crate::Logger)

#[cfg(feature = "console")]
pub mod console;
pub mod file;
pub mod formatter;

#[cfg(feature = "console")]
pub use console::{ConsoleHolder, ConsoleLogger};
pub use file::FileLogger;
pub use formatter::{DefaultLineFormatter, LineFormatter, LineRecord};
