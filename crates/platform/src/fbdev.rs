//! Framebuffer device-control layer
//!
//! The LED framebuffer driver extends the standard fbdev interface with a
//! handful of private requests (brightness, grey levels, OE divisor). All of
//! them exchange a single little-endian `u32`. Rotation has no private
//! request; it lives in the driver-specific `rotate` field of the standard
//! variable screen-info record, which can only be replaced as a whole.
//!
//! # Request encoding
//!
//! Codes follow the Linux `_IOC` layout:
//!
//! ```text
//!  31 30 | 29 .. 16 | 15 .. 8 | 7 .. 0
//!  dir   |  size    |  type   |  nr
//! ```
//!
//! | request            | dir   | type | nr | code         |
//! |--------------------|-------|------|----|--------------|
//! | set brightness     | write | 'x'  | 4  | `0x40047804` |
//! | get brightness     | read  | 'x'  | 5  | `0x80047805` |
//! | set OE divisor     | write | 'x'  | 6  | `0x40047806` |
//! | set grey levels    | write | 'x'  | 7  | `0x40047807` |
//! | FBIOGET_VSCREENINFO| -     | 'F'  | 0  | `0x4600`     |
//! | FBIOPUT_VSCREENINFO| -     | 'F'  | 1  | `0x4601`     |

use core::ops::DerefMut;
use std::path::Path;

use crate::error::PlatformError;

// ---------------------------------------------------------------------------
// Request codes
// ---------------------------------------------------------------------------

const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;
const LEDFB_IOC_TYPE: u8 = b'x';
const U32_PAYLOAD: u32 = 4;

/// Build an `_IOC(dir, type, nr, size)` request code.
#[allow(clippy::arithmetic_side_effects)] // constant operands, fields cannot overlap
const fn ioc(dir: u32, ty: u8, nr: u8, size: u32) -> u32 {
    (dir << 30) | (size << 16) | ((ty as u32) << 8) | nr as u32
}

/// Device-control requests understood by the LED framebuffer driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FbRequest {
    /// Set panel brightness (u32 payload)
    SetBrightness,
    /// Read panel brightness (u32 reply)
    GetBrightness,
    /// Set output-enable clock divisor (u32 payload)
    SetOeDivisor,
    /// Set the number of grey levels per channel (u32 payload)
    SetGreyLevels,
    /// Read the variable screen-info record
    GetVarScreenInfo,
    /// Replace the variable screen-info record
    PutVarScreenInfo,
}

impl FbRequest {
    /// Numeric request code passed to `ioctl(2)`.
    pub const fn code(self) -> u32 {
        match self {
            Self::SetBrightness => ioc(IOC_WRITE, LEDFB_IOC_TYPE, 4, U32_PAYLOAD),
            Self::GetBrightness => ioc(IOC_READ, LEDFB_IOC_TYPE, 5, U32_PAYLOAD),
            Self::SetOeDivisor => ioc(IOC_WRITE, LEDFB_IOC_TYPE, 6, U32_PAYLOAD),
            Self::SetGreyLevels => ioc(IOC_WRITE, LEDFB_IOC_TYPE, 7, U32_PAYLOAD),
            Self::GetVarScreenInfo => 0x4600,
            Self::PutVarScreenInfo => 0x4601,
        }
    }

    /// Short name used in logs and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SetBrightness => "set brightness",
            Self::GetBrightness => "get brightness",
            Self::SetOeDivisor => "set OE divisor",
            Self::SetGreyLevels => "set grey levels",
            Self::GetVarScreenInfo => "FBIOGET_VSCREENINFO",
            Self::PutVarScreenInfo => "FBIOPUT_VSCREENINFO",
        }
    }
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// Panel rotations supported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// 0°
    Normal,
    /// 180°
    UpsideDown,
}

impl Rotation {
    /// Rotation in degrees, as stored in the screen-info record.
    pub const fn degrees(self) -> u32 {
        match self {
            Self::Normal => 0,
            Self::UpsideDown => 180,
        }
    }
}

impl TryFrom<u32> for Rotation {
    /// The rejected value
    type Error = u32;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Self::Normal),
            180 => Ok(Self::UpsideDown),
            other => Err(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Bytes per pixel in the ARGB32 layout used by every panel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Visible resolution reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    /// Pixels per row
    pub width: u32,
    /// Rows
    pub height: u32,
}

impl ScreenGeometry {
    /// Create a geometry
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Length in bytes of the mapped pixel buffer (`width * height * 4`).
    ///
    /// `None` if the product does not fit in `usize`.
    pub fn byte_len(&self) -> Option<usize> {
        self.pixel_count()?.checked_mul(BYTES_PER_PIXEL)
    }

    /// Number of pixels on the panel.
    pub fn pixel_count(&self) -> Option<usize> {
        let w = usize::try_from(self.width).ok()?;
        let h = usize::try_from(self.height).ok()?;
        w.checked_mul(h)
    }
}

// ---------------------------------------------------------------------------
// Variable screen-info record
// ---------------------------------------------------------------------------

/// `struct fb_var_screeninfo` as an opaque fixed-layout byte record.
///
/// Only the fields this tool reads or patches get named accessors; every
/// other byte is carried through untouched so a get → patch → put cycle
/// never disturbs driver state.
#[derive(Clone, PartialEq, Eq)]
pub struct VarScreenInfo {
    raw: [u8; Self::LEN],
}

impl VarScreenInfo {
    /// Size of the record exchanged with the driver.
    pub const LEN: usize = 160;
    /// Offset of `xres` (u32)
    pub const XRES: usize = 0;
    /// Offset of `yres` (u32)
    pub const YRES: usize = 4;
    /// Offset of `xres_virtual` (u32)
    pub const XRES_VIRTUAL: usize = 8;
    /// Offset of `yres_virtual` (u32)
    pub const YRES_VIRTUAL: usize = 12;
    /// Offset of `bits_per_pixel` (u32)
    pub const BITS_PER_PIXEL: usize = 24;
    /// Offset of `rotate`. The driver only looks at the low byte.
    pub const ROTATE: usize = 136;

    /// All-zero record, used as the ioctl output buffer.
    pub const fn zeroed() -> Self {
        Self { raw: [0; Self::LEN] }
    }

    /// Wrap raw bytes received from the driver.
    pub const fn from_bytes(raw: [u8; Self::LEN]) -> Self {
        Self { raw }
    }

    /// Record describing a 32bpp panel of the given size, for mocks and tests.
    pub fn with_geometry(geometry: ScreenGeometry) -> Self {
        let mut info = Self::zeroed();
        info.set_u32(Self::XRES, geometry.width);
        info.set_u32(Self::YRES, geometry.height);
        info.set_u32(Self::XRES_VIRTUAL, geometry.width);
        info.set_u32(Self::YRES_VIRTUAL, geometry.height);
        info.set_u32(Self::BITS_PER_PIXEL, 32);
        info
    }

    /// Raw bytes, as handed to `FBIOPUT_VSCREENINFO`.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.raw
    }

    /// Mutable raw bytes, as filled by `FBIOGET_VSCREENINFO`.
    pub fn as_mut_bytes(&mut self) -> &mut [u8; Self::LEN] {
        &mut self.raw
    }

    /// Visible resolution
    pub fn geometry(&self) -> ScreenGeometry {
        ScreenGeometry::new(self.u32_at(Self::XRES), self.u32_at(Self::YRES))
    }

    /// Colour depth
    pub fn bits_per_pixel(&self) -> u32 {
        self.u32_at(Self::BITS_PER_PIXEL)
    }

    /// Raw rotation byte
    pub fn rotate_byte(&self) -> u8 {
        self.raw.get(Self::ROTATE).copied().unwrap_or(0)
    }

    /// Current rotation, `None` if the driver reports something unexpected.
    pub fn rotation(&self) -> Option<Rotation> {
        Rotation::try_from(u32::from(self.rotate_byte())).ok()
    }

    /// Patch the rotation. Touches exactly one byte of the record.
    #[allow(clippy::cast_possible_truncation)] // degrees() is 0 or 180
    pub fn set_rotation(&mut self, rotation: Rotation) {
        if let Some(byte) = self.raw.get_mut(Self::ROTATE) {
            *byte = rotation.degrees() as u8;
        }
    }

    fn u32_at(&self, offset: usize) -> u32 {
        let mut word = [0u8; 4];
        if let Some(bytes) = self.raw.get(offset..offset.saturating_add(4)) {
            word.copy_from_slice(bytes);
        }
        u32::from_le_bytes(word)
    }

    fn set_u32(&mut self, offset: usize, value: u32) {
        if let Some(bytes) = self.raw.get_mut(offset..offset.saturating_add(4)) {
            bytes.copy_from_slice(&value.to_le_bytes());
        }
    }
}

impl Default for VarScreenInfo {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl core::fmt::Debug for VarScreenInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let geometry = self.geometry();
        f.debug_struct("VarScreenInfo")
            .field("xres", &geometry.width)
            .field("yres", &geometry.height)
            .field("bits_per_pixel", &self.bits_per_pixel())
            .field("rotate", &self.rotate_byte())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Device seams
// ---------------------------------------------------------------------------

/// How a device is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Device-control requests only (read-only open is enough for ioctl)
    Control,
    /// Read-write, needed to map pixel memory
    ReadWrite,
}

/// An open framebuffer device.
///
/// Dropping the value closes the device; dropping a [`Self::Pixels`] map
/// unmaps it.
pub trait FramebufferDevice {
    /// Writable view of the device's pixel memory
    type Pixels<'a>: DerefMut<Target = [u8]>
    where
        Self: 'a;

    /// Path the device was opened from
    fn path(&self) -> &Path;

    /// Issue a write request carrying a 4-byte little-endian payload.
    fn write_u32(&mut self, request: FbRequest, value: u32) -> Result<(), PlatformError>;

    /// Issue a read request returning a 4-byte little-endian value.
    fn read_u32(&mut self, request: FbRequest) -> Result<u32, PlatformError>;

    /// `FBIOGET_VSCREENINFO`
    fn var_screen_info(&mut self) -> Result<VarScreenInfo, PlatformError>;

    /// `FBIOPUT_VSCREENINFO`
    fn put_var_screen_info(&mut self, info: &VarScreenInfo) -> Result<(), PlatformError>;

    /// Map the first `len` bytes of pixel memory.
    fn map_pixels(&mut self, len: usize) -> Result<Self::Pixels<'_>, PlatformError>;
}

/// Opens framebuffer devices by path.
pub trait DeviceOpener {
    /// Device type produced
    type Device: FramebufferDevice;

    /// Open `path`.
    fn open(&self, path: &Path, access: Access) -> Result<Self::Device, PlatformError>;
}

impl<O: DeviceOpener + ?Sized> DeviceOpener for &O {
    type Device = O::Device;

    fn open(&self, path: &Path, access: Access) -> Result<Self::Device, PlatformError> {
        (**self).open(path, access)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::indexing_slicing)]
    use super::*;

    #[test]
    fn request_codes_match_driver_header() {
        assert_eq!(FbRequest::SetBrightness.code(), 0x4004_7804);
        assert_eq!(FbRequest::GetBrightness.code(), 0x8004_7805);
        assert_eq!(FbRequest::SetOeDivisor.code(), 0x4004_7806);
        assert_eq!(FbRequest::SetGreyLevels.code(), 0x4004_7807);
        assert_eq!(FbRequest::GetVarScreenInfo.code(), 0x4600);
        assert_eq!(FbRequest::PutVarScreenInfo.code(), 0x4601);
    }

    #[test]
    fn rotation_accepts_only_0_and_180() {
        assert_eq!(Rotation::try_from(0), Ok(Rotation::Normal));
        assert_eq!(Rotation::try_from(180), Ok(Rotation::UpsideDown));
        assert_eq!(Rotation::try_from(90), Err(90));
        assert_eq!(Rotation::try_from(360), Err(360));
    }

    #[test]
    fn geometry_reads_little_endian_words() {
        let mut raw = [0u8; VarScreenInfo::LEN];
        raw[0..4].copy_from_slice(&[0x40, 0x01, 0x00, 0x00]);
        raw[4..8].copy_from_slice(&[0x20, 0x00, 0x00, 0x00]);
        let info = VarScreenInfo::from_bytes(raw);
        assert_eq!(info.geometry(), ScreenGeometry::new(320, 32));
    }

    #[test]
    fn set_rotation_patches_single_byte() {
        let mut info = VarScreenInfo::with_geometry(ScreenGeometry::new(64, 32));
        let before = info.clone();
        info.set_rotation(Rotation::UpsideDown);

        let changed: Vec<usize> = before
            .as_bytes()
            .iter()
            .zip(info.as_bytes().iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(changed, vec![VarScreenInfo::ROTATE]);
        assert_eq!(info.rotation(), Some(Rotation::UpsideDown));
    }

    #[test]
    fn byte_len_is_four_bytes_per_pixel() {
        assert_eq!(ScreenGeometry::new(64, 32).byte_len(), Some(64 * 32 * 4));
        assert_eq!(ScreenGeometry::new(0, 32).byte_len(), Some(0));
    }
}
