//! File writers: the unit of actual byte writing
//!
//! A [`FileWriter`] is an [`io::Write`] stream extended with stat, sync and
//! color markers. Color markers are no-ops unless the target is a terminal.

use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;

/// Output colors used by line formatters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    None,
    Red,
    Yellow,
    Blue,
}

impl Color {
    /// ANSI escape switching the foreground to this color
    #[cfg(feature = "console")]
    fn escape(self) -> Option<String> {
        let color = match self {
            Color::None => return None,
            Color::Red => colored::Color::Red,
            Color::Yellow => colored::Color::Yellow,
            Color::Blue => colored::Color::Blue,
        };
        Some(format!("\x1b[{}m", color.to_fg_str()))
    }

    #[cfg(not(feature = "console"))]
    fn escape(self) -> Option<String> {
        None
    }
}

const RESET_ESCAPE: &str = "\x1b[0m";

fn colors_supported(is_terminal: bool) -> bool {
    #[cfg(feature = "console")]
    {
        is_terminal && colored::control::SHOULD_COLORIZE.should_colorize()
    }
    #[cfg(not(feature = "console"))]
    {
        let _ = is_terminal;
        false
    }
}

/// Generic file writer
pub trait FileWriter: Write + Send {
    /// File metadata, or `None` if it cannot be read
    fn stat(&self) -> Option<Metadata>;

    /// Flush buffered bytes and ask the OS to persist them
    fn sync(&mut self) -> io::Result<()>;

    fn change_color(&mut self, color: Color);

    fn reset_color(&mut self);

    /// Flush and release the underlying file. Later writes fail.
    fn close(&mut self) -> io::Result<()>;
}

fn closed_error() -> io::Error {
    io::Error::other("file writer is closed")
}

/// Buffered writer over one owned file
pub struct SimpleFileWriter {
    file: Option<BufWriter<File>>,
    colors: bool,
}

impl SimpleFileWriter {
    /// Open `path` for appending, creating it and its parent directory if needed
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_file(file))
    }

    pub fn from_file(file: File) -> Self {
        let colors = colors_supported(file.is_terminal());
        Self {
            file: Some(BufWriter::new(file)),
            colors,
        }
    }

    fn write_marker(&mut self, marker: &str) {
        if !self.colors {
            return;
        }
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(marker.as_bytes());
        }
    }
}

impl Write for SimpleFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.write(buf),
            None => Err(closed_error()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl FileWriter for SimpleFileWriter {
    fn stat(&self) -> Option<Metadata> {
        self.file.as_ref()?.get_ref().metadata().ok()
    }

    fn sync(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
            file.get_ref().sync_data()?;
        }
        Ok(())
    }

    fn change_color(&mut self, color: Color) {
        if let Some(escape) = color.escape() {
            self.write_marker(&escape);
        }
    }

    fn reset_color(&mut self) {
        self.write_marker(RESET_ESCAPE);
    }

    fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for SimpleFileWriter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Standard stream targeted by a [`ConsoleWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    Stdout,
    #[default]
    Stderr,
}

/// Unbuffered writer over stdout or stderr; never closes the stream
pub struct ConsoleWriter {
    stream: ConsoleStream,
    colors: bool,
}

impl ConsoleWriter {
    pub fn new(stream: ConsoleStream) -> Self {
        let is_terminal = match stream {
            ConsoleStream::Stdout => io::stdout().is_terminal(),
            ConsoleStream::Stderr => io::stderr().is_terminal(),
        };
        Self {
            stream,
            colors: colors_supported(is_terminal),
        }
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    fn write_marker(&mut self, marker: &str) {
        if self.colors {
            let _ = self.write_all(marker.as_bytes());
        }
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stream {
            ConsoleStream::Stdout => io::stdout().write(buf),
            ConsoleStream::Stderr => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stream {
            ConsoleStream::Stdout => io::stdout().flush(),
            ConsoleStream::Stderr => io::stderr().flush(),
        }
    }
}

impl FileWriter for ConsoleWriter {
    fn stat(&self) -> Option<Metadata> {
        None
    }

    fn sync(&mut self) -> io::Result<()> {
        self.flush()
    }

    fn change_color(&mut self, color: Color) {
        if let Some(escape) = color.escape() {
            self.write_marker(&escape);
        }
    }

    fn reset_color(&mut self) {
        self.write_marker(RESET_ESCAPE);
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}
