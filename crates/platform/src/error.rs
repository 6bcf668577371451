//! Platform errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating or talking to a framebuffer device.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The slot has no sysfs entry, or the entry has no `graphics` child.
    #[error("No framebuffer found for '{slot}' (looked in {searched})")]
    NotFound {
        /// Slot identifier as given by the caller
        slot: String,
        /// Directory that was expected to name the device node
        searched: PathBuf,
    },

    /// Opening, querying or mapping the device failed.
    #[error("Framebuffer {op} failed on {}: {source}", path.display())]
    DeviceIo {
        /// Device node path
        path: PathBuf,
        /// Operation that failed (`open`, `ioctl 0x4600`, `mmap`, ...)
        op: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

impl PlatformError {
    /// Shorthand for a [`PlatformError::DeviceIo`].
    pub fn device_io(path: impl Into<PathBuf>, op: impl Into<String>, source: std::io::Error) -> Self {
        Self::DeviceIo {
            path: path.into(),
            op: op.into(),
            source,
        }
    }

    /// True for resolver misses, false for device failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
