//! Store errors

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load the settings document.
///
/// Lookups never fail: a missing row or an unparsable value is `None`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The document exists but could not be read.
    #[error("Failed to read settings from {}: {source}", path.display())]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid settings JSON.
    #[error("Settings document {} is malformed: {source}", path.display())]
    Parse {
        /// Document path (empty for in-memory documents)
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}
