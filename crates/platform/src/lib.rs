//! Hardware access layer for Axent LED/LCD matrix panels
//!
//! Panels are exposed by the FPGA soft-device driver as ordinary Linux
//! framebuffer devices. This crate knows how to find them and how to talk to
//! them; it knows nothing about stored settings or test patterns.
//!
//! # Architecture Layers
//!
//! ```text
//! Command surface (ax-display binary)
//!         ↓
//! Panel operations (panel crate: control, calibration, patterns)
//!         ↓
//! Platform (this crate: topology + framebuffer device traits)
//!         ↓
//! Kernel (sysfs, /dev/fbN ioctl + mmap)
//! ```
//!
//! # Modules
//!
//! - [`topology`] - slot name → `/dev/fbN` resolution through sysfs
//! - [`fbdev`] - device-control requests, [`VarScreenInfo`], the
//!   [`FramebufferDevice`] / [`DeviceOpener`] seams
//! - [`linux`] - the real implementation (`ioctl(2)`, `mmap(2)`)
//! - [`mocks`] - recording in-memory devices for tests
//! - [`config`] - default paths and environment overrides
//!
//! # Features
//!
//! - `mocks`: export [`mocks`] to downstream crates' tests
//!
//! # Example
//!
//! ```no_run
//! use platform::{DeviceOpener, FramebufferDevice, LinuxOpener, Topology};
//!
//! # fn main() -> Result<(), platform::PlatformError> {
//! let topology = Topology::default();
//! let path = topology.resolve_device("display0")?;
//! let mut fb = LinuxOpener.open(&path, platform::Access::Control)?;
//! let geometry = fb.var_screen_info()?.geometry();
//! println!("{}x{}", geometry.width, geometry.height);
//! # Ok(())
//! # }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::doc_markdown)] // ioctl names and sysfs paths in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod fbdev;
pub mod linux;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod topology;

pub use config::RuntimeConfig;
pub use error::PlatformError;
pub use fbdev::{
    Access, DeviceOpener, FbRequest, FramebufferDevice, Rotation, ScreenGeometry, VarScreenInfo,
};
pub use linux::{LinuxFramebuffer, LinuxOpener};
pub use topology::Topology;
