//! Hardware topology: slot name → framebuffer device node
//!
//! Each FPGA soft-device slot appears under the bus `devices` directory. A slot
//! driven by the LED framebuffer driver carries a `graphics` child whose only
//! entry is the kernel name of its framebuffer (`fb0`, `fb1`, ...):
//!
//! ```text
//! /sys/bus/axent_fpga_bus/devices/display0/graphics/fb1   →  /dev/fb1
//! /sys/bus/axent_fpga_bus/drivers/axent_ledfb/display0    →  (symlink to the slot)
//! ```
//!
//! The driver directory is the list of panels currently bound, which is what
//! identify mode uses to label each framebuffer with its slot name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::RuntimeConfig;
use crate::error::PlatformError;

const GRAPHICS_DIR: &str = "graphics";

/// Read-only view of the sysfs topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    devices_root: PathBuf,
    driver_root: PathBuf,
    dev_dir: PathBuf,
}

impl Topology {
    /// Create a topology rooted at explicit directories.
    pub fn new(
        devices_root: impl Into<PathBuf>,
        driver_root: impl Into<PathBuf>,
        dev_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            devices_root: devices_root.into(),
            driver_root: driver_root.into(),
            dev_dir: dev_dir.into(),
        }
    }

    /// Topology using the paths of a [`RuntimeConfig`].
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(
            config.devices_root.clone(),
            config.driver_root.clone(),
            config.dev_dir.clone(),
        )
    }

    /// Resolve a slot to its device node.
    ///
    /// `slot` is normally a slot name relative to the devices root; an
    /// absolute path to a slot directory is used as-is.
    pub fn resolve_device(&self, slot: &str) -> Result<PathBuf, PlatformError> {
        self.resolve_slot_dir(slot, &self.devices_root.join(slot))
    }

    /// Resolve many slots, silently skipping the ones that do not resolve.
    ///
    /// Partial hardware availability is normal during discovery, so a miss is
    /// only logged at debug level.
    pub fn resolve_all<'a, I>(&'a self, slots: I) -> impl Iterator<Item = PathBuf> + 'a
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: 'a,
    {
        slots
            .into_iter()
            .filter_map(move |slot| match self.resolve_device(slot.as_ref()) {
                Ok(path) => Some(path),
                Err(err) => {
                    tracing::debug!(slot = slot.as_ref(), %err, "skipping unresolved slot");
                    None
                }
            })
    }

    /// Map every bound panel's device node back to its slot name.
    ///
    /// Driver-directory entries that are not panels (`bind`, `uevent`, ...)
    /// do not resolve and are left out. An unreadable driver directory yields
    /// an empty map.
    pub fn display_map(&self) -> BTreeMap<PathBuf, String> {
        let entries = match fs::read_dir(&self.driver_root) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(dir = %self.driver_root.display(), %err, "driver directory unreadable");
                return BTreeMap::new();
            }
        };

        let mut map = BTreeMap::new();
        for entry in entries.flatten() {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if let Ok(device) = self.resolve_slot_dir(&name, &entry.path()) {
                map.insert(device, name);
            }
        }
        map
    }

    /// Names of all bound panels, sorted.
    pub fn display_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.display_map().into_values().collect();
        names.sort();
        names
    }

    /// Slot name of the panel behind `device`, if it is a bound panel.
    pub fn display_name_for(&self, device: &Path) -> Option<String> {
        self.display_map().remove(device)
    }

    fn resolve_slot_dir(&self, slot: &str, slot_dir: &Path) -> Result<PathBuf, PlatformError> {
        let graphics = slot_dir.join(GRAPHICS_DIR);
        let not_found = || PlatformError::NotFound {
            slot: slot.to_owned(),
            searched: graphics.clone(),
        };

        let mut nodes: Vec<String> = fs::read_dir(&graphics)
            .map_err(|_| not_found())?
            .flatten()
            .filter_map(|entry| entry.file_name().to_str().map(|s| s.trim().to_owned()))
            .filter(|name| !name.is_empty())
            .collect();
        nodes.sort();

        let node = nodes.into_iter().next().ok_or_else(not_found)?;
        Ok(self.dev_dir.join(node))
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::from_config(&RuntimeConfig::default())
    }
}
