//! Mock implementations for testing
//!
//! [`MockOpener`] hands out [`MockFramebuffer`]s backed by shared
//! [`MockPanel`] state, so a test can run an operation and then inspect every
//! request the operation issued, the resulting screen-info record and the
//! pixel memory it wrote.

use std::cell::{RefCell, RefMut};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::PlatformError;
use crate::fbdev::{
    Access, DeviceOpener, FbRequest, FramebufferDevice, ScreenGeometry, VarScreenInfo,
};

/// Fill byte for pixel memory nobody has written yet.
pub const STALE_BYTE: u8 = 0xA5;

/// One request observed by a mock device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    /// A 4-byte write request with its exact payload bytes
    Write {
        /// Request issued
        request: FbRequest,
        /// Payload as it would reach the driver
        payload: [u8; 4],
    },
    /// A 4-byte read request
    Read(FbRequest),
    /// `FBIOGET_VSCREENINFO`
    GetVar,
    /// `FBIOPUT_VSCREENINFO` with the record written
    PutVar(VarScreenInfo),
    /// Pixel memory mapped with this length
    Map(usize),
}

/// State of one simulated panel.
#[derive(Debug)]
pub struct MockPanel {
    /// Screen-info record returned by `FBIOGET_VSCREENINFO`
    pub var: VarScreenInfo,
    /// Pixel memory
    pub pixels: Vec<u8>,
    /// Every request in order
    pub requests: Vec<Recorded>,
    /// Value reported for `GetBrightness`, updated by `SetBrightness`
    pub brightness: u32,
    /// Number of successful opens
    pub opens: usize,
    /// Handles currently open (decremented on drop)
    pub open_handles: usize,
    /// Make every ioctl fail with `EIO`
    pub fail_ioctl: bool,
    /// Make mapping pixel memory fail with `ENOMEM`
    pub fail_map: bool,
}

impl MockPanel {
    /// Panel of the given size with stale pixel memory.
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self {
            var: VarScreenInfo::with_geometry(geometry),
            pixels: vec![STALE_BYTE; geometry.byte_len().unwrap_or(0)],
            requests: Vec::new(),
            brightness: 0,
            opens: 0,
            open_handles: 0,
            fail_ioctl: false,
            fail_map: false,
        }
    }

    /// Requests that change device state (4-byte writes and screen-info puts).
    pub fn control_writes(&self) -> Vec<&Recorded> {
        self.requests
            .iter()
            .filter(|r| matches!(r, Recorded::Write { .. } | Recorded::PutVar(_)))
            .collect()
    }

    /// Pixel memory as ARGB32 words (little-endian).
    pub fn words(&self) -> Vec<u32> {
        self.pixels
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(<[u8; 4]>::try_from(c).unwrap_or_default()))
            .collect()
    }
}

/// Shared handle to a [`MockPanel`].
pub type SharedPanel = Rc<RefCell<MockPanel>>;

/// Opener over a fixed set of simulated device nodes.
#[derive(Debug, Default)]
pub struct MockOpener {
    panels: BTreeMap<PathBuf, SharedPanel>,
}

impl MockOpener {
    /// Opener with no devices
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a panel at `path`.
    pub fn add_panel(&mut self, path: impl Into<PathBuf>, geometry: ScreenGeometry) -> SharedPanel {
        let panel = Rc::new(RefCell::new(MockPanel::new(geometry)));
        self.panels.insert(path.into(), Rc::clone(&panel));
        panel
    }

    /// Panel registered at `path`
    pub fn panel(&self, path: impl AsRef<Path>) -> Option<SharedPanel> {
        self.panels.get(path.as_ref()).cloned()
    }
}

impl DeviceOpener for MockOpener {
    type Device = MockFramebuffer;

    fn open(&self, path: &Path, _access: Access) -> Result<Self::Device, PlatformError> {
        let panel = self.panel(path).ok_or_else(|| {
            PlatformError::device_io(
                path,
                "open",
                std::io::Error::from(std::io::ErrorKind::NotFound),
            )
        })?;
        {
            let mut state = panel.borrow_mut();
            state.opens = state.opens.saturating_add(1);
            state.open_handles = state.open_handles.saturating_add(1);
        }
        Ok(MockFramebuffer {
            path: path.to_path_buf(),
            panel,
        })
    }
}

/// Open handle to a [`MockPanel`].
#[derive(Debug)]
pub struct MockFramebuffer {
    path: PathBuf,
    panel: SharedPanel,
}

impl MockFramebuffer {
    fn check(&self, request: FbRequest) -> Result<(), PlatformError> {
        if self.panel.borrow().fail_ioctl {
            return Err(PlatformError::device_io(
                &self.path,
                format!("ioctl {}", request.name()),
                std::io::Error::from_raw_os_error(libc::EIO),
            ));
        }
        Ok(())
    }
}

impl Drop for MockFramebuffer {
    fn drop(&mut self) {
        let mut state = self.panel.borrow_mut();
        state.open_handles = state.open_handles.saturating_sub(1);
    }
}

impl FramebufferDevice for MockFramebuffer {
    type Pixels<'a> = RefMut<'a, [u8]>
    where
        Self: 'a;

    fn path(&self) -> &Path {
        &self.path
    }

    fn write_u32(&mut self, request: FbRequest, value: u32) -> Result<(), PlatformError> {
        self.check(request)?;
        let mut state = self.panel.borrow_mut();
        state.requests.push(Recorded::Write {
            request,
            payload: value.to_le_bytes(),
        });
        if request == FbRequest::SetBrightness {
            state.brightness = value;
        }
        Ok(())
    }

    fn read_u32(&mut self, request: FbRequest) -> Result<u32, PlatformError> {
        self.check(request)?;
        let mut state = self.panel.borrow_mut();
        state.requests.push(Recorded::Read(request));
        Ok(match request {
            FbRequest::GetBrightness => state.brightness,
            _ => 0,
        })
    }

    fn var_screen_info(&mut self) -> Result<VarScreenInfo, PlatformError> {
        self.check(FbRequest::GetVarScreenInfo)?;
        let mut state = self.panel.borrow_mut();
        state.requests.push(Recorded::GetVar);
        Ok(state.var.clone())
    }

    fn put_var_screen_info(&mut self, info: &VarScreenInfo) -> Result<(), PlatformError> {
        self.check(FbRequest::PutVarScreenInfo)?;
        let mut state = self.panel.borrow_mut();
        state.requests.push(Recorded::PutVar(info.clone()));
        state.var = info.clone();
        Ok(())
    }

    fn map_pixels(&mut self, len: usize) -> Result<Self::Pixels<'_>, PlatformError> {
        let mut state = self.panel.borrow_mut();
        if state.fail_map {
            return Err(PlatformError::device_io(
                &self.path,
                "mmap",
                std::io::Error::from_raw_os_error(libc::ENOMEM),
            ));
        }
        if state.pixels.len() < len {
            state.pixels.resize(len, STALE_BYTE);
        }
        state.requests.push(Recorded::Map(len));
        Ok(RefMut::map(state, |s| s.pixels.split_at_mut(len).0))
    }
}
