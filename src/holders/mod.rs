//! File holders: shared owners of the file a logger writes to

pub mod holder;
pub mod pattern_file;
pub mod rotating_file;
pub mod simple_file;
pub mod writer;

pub use holder::FileHolder;
pub use pattern_file::{expand_template, PatternFile, DEFAULT_PATTERN_CHECK_INTERVAL};
pub use rotating_file::{RotatingFile, RotationPolicy};
pub use simple_file::SimpleFile;
pub use writer::{Color, ConsoleStream, ConsoleWriter, FileWriter, SimpleFileWriter};
