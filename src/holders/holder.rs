//! File holder contract and the shared holder core
//!
//! A holder owns at most one live [`FileWriter`] and serializes every access
//! to it. Rotating holders swap the writer under the same lock, so a write
//! never observes a half-swapped file.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};

use super::writer::FileWriter;

/// Shared owner of a log file
///
/// `acquire`/`release` count the users of the open file. The writer is closed
/// exactly once, when the count drops to zero. The final `release` must not
/// race any other call on the holder.
pub trait FileHolder: Send + Sync {
    /// Run `f` with the live writer under the holder lock
    ///
    /// Does nothing when the holder has no writer (open failure, or already
    /// released).
    fn access_writer(&self, f: &mut dyn FnMut(&mut dyn FileWriter));

    fn acquire(&self);

    fn release(&self);
}

pub(crate) struct HolderState {
    pub(crate) writer: Option<Box<dyn FileWriter>>,
    pub(crate) closed: bool,
}

/// Lock, reference count and sync policy common to every holder
pub(crate) struct HolderCore {
    label: String,
    state: Mutex<HolderState>,
    sync_every_write: bool,
    refcount: AtomicUsize,
}

impl HolderCore {
    /// Create a core with a reference count of one
    pub(crate) fn new(
        label: impl Into<String>,
        writer: Option<Box<dyn FileWriter>>,
        sync_every_write: bool,
    ) -> Self {
        Self {
            label: label.into(),
            state: Mutex::new(HolderState {
                writer,
                closed: false,
            }),
            sync_every_write,
            refcount: AtomicUsize::new(1),
        }
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, HolderState> {
        self.state.lock()
    }

    pub(crate) fn sync_every_write(&self) -> bool {
        self.sync_every_write
    }

    pub(crate) fn refcount(&self) -> usize {
        self.refcount.load(Ordering::Acquire)
    }

    pub(crate) fn has_writer(&self) -> bool {
        self.state.lock().writer.is_some()
    }

    /// Run `f` on the writer, then push the bytes to the OS
    pub(crate) fn access_writer(&self, f: &mut dyn FnMut(&mut dyn FileWriter)) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        if let Some(writer) = state.writer.as_mut() {
            f(writer.as_mut());
            let flushed = if self.sync_every_write {
                writer.sync()
            } else {
                writer.flush()
            };
            if let Err(e) = flushed {
                eprintln!("[LOGGER ERROR] Failed to flush '{}': {}", self.label, e);
            }
        }
    }

    pub(crate) fn acquire(&self) {
        self.refcount.fetch_add(1, Ordering::AcqRel);
    }

    /// Drop one reference; returns true when this call closed the writer
    pub(crate) fn release(&self) -> bool {
        let previous = self
            .refcount
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| count.checked_sub(1));

        match previous {
            Ok(1) => {
                let mut state = self.state.lock();
                state.closed = true;
                if let Some(mut writer) = state.writer.take() {
                    if let Err(e) = writer.close() {
                        eprintln!("[LOGGER ERROR] Failed to close '{}': {}", self.label, e);
                    }
                }
                true
            }
            Ok(_) => false,
            Err(_) => {
                eprintln!(
                    "[LOGGER WARNING] Release of '{}' without a matching acquire",
                    self.label
                );
                false
            }
        }
    }
}
