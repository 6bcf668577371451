//! Test pattern rendering
//!
//! Writes straight into mapped pixel memory, one device at a time. A device
//! that cannot be opened, queried or mapped is logged and skipped; the batch
//! always runs to the end.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use platform::{Access, DeviceOpener, FramebufferDevice, PlatformError};

use crate::identify::identify_frame;
use crate::patterns::{fill_scanlines, PatternMode};

/// Counts for one rendering batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Devices whose pixel memory was mapped (and written, for known modes)
    pub rendered: usize,
    /// Devices skipped: open/query/map failure, or no display name in
    /// identify mode
    pub skipped: usize,
}

/// Renders test patterns onto framebuffers.
#[derive(Debug)]
pub struct PatternRenderer<O> {
    opener: O,
    names: BTreeMap<PathBuf, String>,
}

impl<O: DeviceOpener> PatternRenderer<O> {
    /// Renderer labelling devices in identify mode from `names`
    /// (device path → display name).
    pub fn new(opener: O, names: BTreeMap<PathBuf, String>) -> Self {
        Self { opener, names }
    }

    /// Render `mode` on every device in `devices`.
    pub fn render_pattern<I, P>(&self, mode: PatternMode, devices: I) -> RenderReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        if let PatternMode::Unknown(n) = mode {
            tracing::warn!(mode = n, "unknown test mode, pixel memory left untouched");
        }

        let mut report = RenderReport::default();
        for device in devices {
            let device = device.as_ref();
            match self.render_one(mode, device) {
                Ok(true) => report.rendered = report.rendered.saturating_add(1),
                Ok(false) => report.skipped = report.skipped.saturating_add(1),
                Err(err) => {
                    tracing::warn!(device = %device.display(), %err, "skipping device");
                    report.skipped = report.skipped.saturating_add(1);
                }
            }
        }
        tracing::info!(
            mode = mode.number(),
            rendered = report.rendered,
            skipped = report.skipped,
            "test pattern done"
        );
        report
    }

    fn render_one(&self, mode: PatternMode, device: &Path) -> Result<bool, PlatformError> {
        let name = match mode {
            PatternMode::Identify => match self.names.get(device) {
                Some(name) => Some(name.as_str()),
                None => {
                    tracing::debug!(device = %device.display(), "no display name, not identifying");
                    return Ok(false);
                }
            },
            _ => None,
        };

        let mut fb = self.opener.open(device, Access::ReadWrite)?;
        let geometry = fb.var_screen_info()?.geometry();
        let len = match geometry.byte_len() {
            Some(len) if len > 0 => len,
            _ => {
                tracing::warn!(
                    device = %device.display(),
                    width = geometry.width,
                    height = geometry.height,
                    "unusable geometry"
                );
                return Ok(false);
            }
        };

        let mut pixels = fb.map_pixels(len)?;
        let written = match name {
            Some(name) => identify_frame(name, geometry).write_le(&mut pixels),
            None => fill_scanlines(&mut pixels, mode, geometry),
        };
        tracing::debug!(
            device = %device.display(),
            width = geometry.width,
            height = geometry.height,
            written,
            "pattern written"
        );
        Ok(true)
    }
}
