//! Panel operation errors

use platform::PlatformError;
use thiserror::Error;

/// Errors from display-control operations.
///
/// A setting that is neither given nor stored is not an error; see
/// [`crate::Outcome::Unset`].
#[derive(Error, Debug)]
pub enum ControlError {
    /// Explicit rotation other than 0 or 180 degrees.
    #[error("Invalid rotation {rotation}: must be 0 or 180")]
    InvalidArgument {
        /// The rejected value in degrees
        rotation: u32,
    },

    /// The device could not be opened or rejected a request.
    #[error(transparent)]
    Device(#[from] PlatformError),
}
