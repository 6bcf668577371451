//! Display control: brightness, grey depth, OE divisor and rotation
//!
//! Each setter takes an optional explicit value. When it is `None` the stored
//! setting for the display is used instead, and when that is missing or does
//! not parse the setter does nothing at all: no device is opened and
//! [`Outcome::Unset`] is returned. A setter that does apply opens the device,
//! issues one request and closes the device again before returning, on the
//! error path too.

use std::path::Path;

use platform::{Access, DeviceOpener, FbRequest, FramebufferDevice, Rotation};
use settings::{ConfigStore, Setting};

use crate::calibration::{ColorArgs, ColorCalibration, CommandRunner, FbcInvocation};
use crate::error::ControlError;

/// What a setter did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The value was written to the device
    Applied(u32),
    /// No explicit or usable stored value; the device was left alone
    Unset,
}

impl Outcome {
    /// True if a value was written
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Result of [`DisplayControl::apply_stored`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    /// Brightness
    pub brightness: Outcome,
    /// Grey depth
    pub grey_depth: Outcome,
    /// OE divisor
    pub oe_divisor: Outcome,
    /// Rotation in degrees
    pub rotation: Outcome,
    /// Calibration command that was run
    pub calibration: FbcInvocation,
}

/// Applies settings to panels through a [`DeviceOpener`].
#[derive(Debug)]
pub struct DisplayControl<S, O> {
    store: S,
    opener: O,
}

impl<S: ConfigStore, O: DeviceOpener> DisplayControl<S, O> {
    /// Control unit reading stored values from `store`.
    pub fn new(store: S, opener: O) -> Self {
        Self { store, opener }
    }

    /// Set the panel brightness.
    pub fn set_brightness(
        &self,
        name: &str,
        device: &Path,
        value: Option<u32>,
    ) -> Result<Outcome, ControlError> {
        self.write_setting(name, device, Setting::Brightness, FbRequest::SetBrightness, value)
    }

    /// Set the number of grey levels per channel.
    pub fn set_grey_depth(
        &self,
        name: &str,
        device: &Path,
        value: Option<u32>,
    ) -> Result<Outcome, ControlError> {
        self.write_setting(name, device, Setting::GreyDepth, FbRequest::SetGreyLevels, value)
    }

    /// Set the output-enable clock divisor.
    pub fn set_oe_divisor(
        &self,
        name: &str,
        device: &Path,
        value: Option<u32>,
    ) -> Result<Outcome, ControlError> {
        self.write_setting(name, device, Setting::OeDivisor, FbRequest::SetOeDivisor, value)
    }

    /// Set the panel rotation (0 or 180 degrees).
    ///
    /// An explicit value outside {0, 180} fails before the device is opened.
    /// A stored one is treated like an unparsable setting.
    pub fn set_rotation(
        &self,
        name: &str,
        device: &Path,
        value: Option<u32>,
    ) -> Result<Outcome, ControlError> {
        let rotation = match value {
            Some(degrees) => Rotation::try_from(degrees)
                .map_err(|rotation| ControlError::InvalidArgument { rotation })?,
            None => match self.store.lookup_u32(name, Setting::Rotation) {
                None => return Ok(self.unset(name, Setting::Rotation)),
                Some(degrees) => match Rotation::try_from(degrees) {
                    Ok(rotation) => rotation,
                    Err(degrees) => {
                        tracing::warn!(display = name, degrees, "ignoring stored rotation");
                        return Ok(Outcome::Unset);
                    }
                },
            },
        };

        let mut fb = self.opener.open(device, Access::Control)?;
        let mut info = fb.var_screen_info()?;
        info.set_rotation(rotation);
        fb.put_var_screen_info(&info)?;

        let degrees = rotation.degrees();
        tracing::info!(display = name, device = %device.display(), degrees, "rotation set");
        Ok(Outcome::Applied(degrees))
    }

    /// Read the current panel brightness.
    pub fn get_brightness(&self, device: &Path) -> Result<u32, ControlError> {
        let mut fb = self.opener.open(device, Access::Control)?;
        Ok(fb.read_u32(FbRequest::GetBrightness)?)
    }

    /// Apply every stored setting of `name`, as the boot-time init does.
    ///
    /// Order: brightness, grey depth, OE divisor, rotation, colour
    /// calibration. The first device error stops the sequence.
    pub fn apply_stored<C, R>(
        &self,
        name: &str,
        device: &Path,
        calibration: &ColorCalibration<C, R>,
    ) -> Result<ApplyReport, ControlError>
    where
        C: ConfigStore,
        R: CommandRunner,
    {
        let brightness = self.set_brightness(name, device, None)?;
        let grey_depth = self.set_grey_depth(name, device, None)?;
        let oe_divisor = self.set_oe_divisor(name, device, None)?;
        let rotation = self.set_rotation(name, device, None)?;
        let calibration = calibration.set_color_calibration(name, device, ColorArgs::default());
        Ok(ApplyReport {
            brightness,
            grey_depth,
            oe_divisor,
            rotation,
            calibration,
        })
    }

    fn write_setting(
        &self,
        name: &str,
        device: &Path,
        setting: Setting,
        request: FbRequest,
        value: Option<u32>,
    ) -> Result<Outcome, ControlError> {
        let Some(value) = value.or_else(|| self.store.lookup_u32(name, setting)) else {
            return Ok(self.unset(name, setting));
        };

        let mut fb = self.opener.open(device, Access::Control)?;
        fb.write_u32(request, value)?;
        tracing::info!(display = name, device = %device.display(), %setting, value, "setting applied");
        Ok(Outcome::Applied(value))
    }

    fn unset(&self, name: &str, setting: Setting) -> Outcome {
        match self.store.lookup(name, setting) {
            Some(raw) => tracing::warn!(display = name, %setting, %raw, "stored value unparsable, left unchanged"),
            None => tracing::debug!(display = name, %setting, "no value, left unchanged"),
        }
        Outcome::Unset
    }
}
