//! Default locations and runtime overrides
//!
//! Every path the utilities touch is defined here rather than hardcoded at
//! the call site. Integration rigs and bench setups point the tools at a fake
//! sysfs tree through the `AX_DISPLAY_*` environment variables.

use std::path::PathBuf;

/// The package name shown in CLI banners
pub const APP_NAME: &str = "ax-displayutils";

/// Package version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// sysfs directory holding one entry per FPGA soft-device slot
pub const SYSFS_DEVICES_ROOT: &str = "/sys/bus/axent_fpga_bus/devices";

/// sysfs directory of the LED framebuffer driver; one entry per bound panel
pub const SYSFS_DRIVER_ROOT: &str = "/sys/bus/axent_fpga_bus/drivers/axent_ledfb";

/// Directory holding the framebuffer device nodes
pub const DEV_DIR: &str = "/dev";

/// Per-display settings document
pub const SETTINGS_STORE_PATH: &str = "/usr/share/db/displays.json";

/// External gamma/colour-offset tool
pub const FBC_PROGRAM: &str = "fbc";

/// Environment variable overriding [`SYSFS_DEVICES_ROOT`]
pub const ENV_SYSFS_DEVICES: &str = "AX_DISPLAY_SYSFS_DEVICES";
/// Environment variable overriding [`SYSFS_DRIVER_ROOT`]
pub const ENV_SYSFS_DRIVER: &str = "AX_DISPLAY_SYSFS_DRIVER";
/// Environment variable overriding [`DEV_DIR`]
pub const ENV_DEV_DIR: &str = "AX_DISPLAY_DEV_DIR";
/// Environment variable overriding [`SETTINGS_STORE_PATH`]
pub const ENV_STORE: &str = "AX_DISPLAY_STORE";
/// Environment variable overriding [`FBC_PROGRAM`]
pub const ENV_FBC: &str = "AX_DISPLAY_FBC";

/// Resolved paths for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Slot directory root (see [`SYSFS_DEVICES_ROOT`])
    pub devices_root: PathBuf,
    /// Panel driver directory (see [`SYSFS_DRIVER_ROOT`])
    pub driver_root: PathBuf,
    /// Device node directory (see [`DEV_DIR`])
    pub dev_dir: PathBuf,
    /// Settings document (see [`SETTINGS_STORE_PATH`])
    pub store_path: PathBuf,
    /// Colour calibration program (see [`FBC_PROGRAM`])
    pub fbc_program: PathBuf,
}

impl RuntimeConfig {
    /// Build the configuration from the environment, falling back to the
    /// compiled-in defaults for unset variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).map(PathBuf::from))
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` is this with `std::env::var_os`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let pick = |key: &str, default: &str| lookup(key).unwrap_or_else(|| PathBuf::from(default));
        Self {
            devices_root: pick(ENV_SYSFS_DEVICES, SYSFS_DEVICES_ROOT),
            driver_root: pick(ENV_SYSFS_DRIVER, SYSFS_DRIVER_ROOT),
            dev_dir: pick(ENV_DEV_DIR, DEV_DIR),
            store_path: pick(ENV_STORE, SETTINGS_STORE_PATH),
            fbc_program: pick(ENV_FBC, FBC_PROGRAM),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
