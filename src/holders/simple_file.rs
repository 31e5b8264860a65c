//! Non-rotating file holder

use std::path::{Path, PathBuf};

use super::holder::{FileHolder, HolderCore};
use super::writer::{FileWriter, SimpleFileWriter};
use crate::core::error::{LoggerError, Result};

/// Holder for a plain append-only log file
///
/// # Example
///
/// ```no_run
/// use rust_log_dispatch::SimpleFile;
///
/// let holder = SimpleFile::open("/var/log/app.log", false);
/// assert!(holder.is_open());
/// ```
pub struct SimpleFile {
    path: PathBuf,
    core: HolderCore,
}

impl SimpleFile {
    /// Open `path` for appending
    ///
    /// An open failure is reported on stderr and leaves the holder without a
    /// writer, so every write through it is a silent no-op.
    pub fn open<P: AsRef<Path>>(path: P, sync_every_write: bool) -> Self {
        let path = path.as_ref().to_path_buf();
        let writer = match SimpleFileWriter::open(&path) {
            Ok(writer) => Some(Box::new(writer) as Box<dyn FileWriter>),
            Err(e) => {
                eprintln!(
                    "[LOGGER WARNING] Failed to open log file '{}': {}",
                    path.display(),
                    e
                );
                None
            }
        };
        Self::with_writer(path, writer, sync_every_write)
    }

    /// Open `path` for appending, failing if it cannot be opened
    ///
    /// # Errors
    ///
    /// Returns error if the file or its parent directory cannot be created
    pub fn try_open<P: AsRef<Path>>(path: P, sync_every_write: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = SimpleFileWriter::open(&path).map_err(|e| {
            LoggerError::io_operation(
                "open log file",
                format!("Failed to open '{}'", path.display()),
                e,
            )
        })?;
        Ok(Self::with_writer(
            path,
            Some(Box::new(writer)),
            sync_every_write,
        ))
    }

    fn with_writer(
        path: PathBuf,
        writer: Option<Box<dyn FileWriter>>,
        sync_every_write: bool,
    ) -> Self {
        let core = HolderCore::new(path.display().to_string(), writer, sync_every_write);
        Self { path, core }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the holder currently owns an open writer
    pub fn is_open(&self) -> bool {
        self.core.has_writer()
    }

    pub fn sync_every_write(&self) -> bool {
        self.core.sync_every_write()
    }
}

impl FileHolder for SimpleFile {
    fn access_writer(&self, f: &mut dyn FnMut(&mut dyn FileWriter)) {
        self.core.access_writer(f);
    }

    fn acquire(&self) {
        self.core.acquire();
    }

    fn release(&self) {
        self.core.release();
    }
}
