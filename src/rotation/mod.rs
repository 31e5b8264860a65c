//! Periodic rotation of file holders

pub mod rotator;
pub mod scheduler;

pub use rotator::{LogRotator, RotatableFileHolder, Rotation, MAX_CHECK_INTERVAL};
pub use scheduler::{RotationScheduler, PANIC_BACKOFF};
