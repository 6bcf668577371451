//! Panel operations for Axent LED/LCD displays
//!
//! Everything the command surface does to a panel lives here, built on the
//! device seams of the `platform` crate and the lookups of the `settings`
//! crate:
//!
//! - [`control`] - brightness, grey depth, OE divisor and rotation, from an
//!   explicit value or the stored setting
//! - [`calibration`] - gamma and colour offsets through the external `fbc`
//!   tool
//! - [`render`] - test patterns written into mapped pixel memory
//! - [`patterns`] / [`identify`] / [`canvas`] - the pixel data itself
//!
//! Operations are generic over [`platform::DeviceOpener`] and
//! [`settings::ConfigStore`], so tests drive them with
//! `platform::mocks::MockOpener` and an in-memory store.
//!
//! ```
//! use std::collections::BTreeMap;
//! use panel::{PatternMode, PatternRenderer};
//! use platform::LinuxOpener;
//!
//! let renderer = PatternRenderer::new(LinuxOpener, BTreeMap::new());
//! // Nonexistent nodes are skipped, never fatal.
//! let report = renderer.render_pattern(PatternMode::White, ["/nonexistent/fb0"]);
//! assert_eq!(report.skipped, 1);
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod calibration;
pub mod canvas;
pub mod control;
pub mod error;
pub mod identify;
pub mod patterns;
pub mod render;

pub use calibration::{
    ColorArgs, ColorCalibration, CommandRunner, FbcInvocation, RecordingRunner, SystemRunner,
};
pub use canvas::Canvas;
pub use control::{ApplyReport, DisplayControl, Outcome};
pub use error::ControlError;
pub use patterns::PatternMode;
pub use render::{PatternRenderer, RenderReport};
