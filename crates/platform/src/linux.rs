//! Linux framebuffer implementation
//!
//! Thin wrapper over `/dev/fbN`: private LED requests and the screen-info
//! exchange go through `ioctl(2)`, pixel memory through a shared `mmap(2)`.
//! The file descriptor closes when [`LinuxFramebuffer`] drops and the mapping
//! unmaps when its [`MmapMut`] drops, so early returns never leak either.

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use memmap::{MmapMut, MmapOptions};

use crate::error::PlatformError;
use crate::fbdev::{Access, DeviceOpener, FbRequest, FramebufferDevice, VarScreenInfo};

/// Opens real device nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxOpener;

impl DeviceOpener for LinuxOpener {
    type Device = LinuxFramebuffer;

    fn open(&self, path: &Path, access: Access) -> Result<Self::Device, PlatformError> {
        let mut options = OpenOptions::new();
        options.read(true);
        if access == Access::ReadWrite {
            options.write(true);
        }
        let file = options
            .open(path)
            .map_err(|e| PlatformError::device_io(path, "open", e))?;
        tracing::trace!(device = %path.display(), ?access, "opened framebuffer");
        Ok(LinuxFramebuffer {
            file,
            path: path.to_path_buf(),
        })
    }
}

/// An open `/dev/fbN` node.
#[derive(Debug)]
pub struct LinuxFramebuffer {
    file: File,
    path: PathBuf,
}

impl LinuxFramebuffer {
    fn ioctl(&self, request: FbRequest, arg: *mut libc::c_void) -> Result<(), PlatformError> {
        // SAFETY: `arg` points to a live, writable buffer at least as large as
        // the payload the request code declares (4 bytes for the LED requests,
        // `VarScreenInfo::LEN` for the screen-info pair); the fd is owned by
        // `self.file` and stays open for the duration of the call.
        let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), request.code() as _, arg) };
        if ret < 0 {
            return Err(PlatformError::device_io(
                &self.path,
                format!("ioctl {:#06x} ({})", request.code(), request.name()),
                std::io::Error::last_os_error(),
            ));
        }
        Ok(())
    }
}

impl FramebufferDevice for LinuxFramebuffer {
    type Pixels<'a> = MmapMut
    where
        Self: 'a;

    fn path(&self) -> &Path {
        &self.path
    }

    fn write_u32(&mut self, request: FbRequest, value: u32) -> Result<(), PlatformError> {
        let mut payload = value.to_le_bytes();
        self.ioctl(request, payload.as_mut_ptr().cast())
    }

    fn read_u32(&mut self, request: FbRequest) -> Result<u32, PlatformError> {
        let mut payload = [0u8; 4];
        self.ioctl(request, payload.as_mut_ptr().cast())?;
        Ok(u32::from_le_bytes(payload))
    }

    fn var_screen_info(&mut self) -> Result<VarScreenInfo, PlatformError> {
        let mut info = VarScreenInfo::zeroed();
        self.ioctl(
            FbRequest::GetVarScreenInfo,
            info.as_mut_bytes().as_mut_ptr().cast(),
        )?;
        Ok(info)
    }

    fn put_var_screen_info(&mut self, info: &VarScreenInfo) -> Result<(), PlatformError> {
        // The driver copies the accepted record back; give it a scratch copy.
        let mut scratch = *info.as_bytes();
        self.ioctl(FbRequest::PutVarScreenInfo, scratch.as_mut_ptr().cast())
    }

    fn map_pixels(&mut self, len: usize) -> Result<Self::Pixels<'_>, PlatformError> {
        // SAFETY: the map is MAP_SHARED over driver-owned pixel memory. Nothing
        // else in this process aliases it, and the fd outlives the call.
        // Concurrent writers from other processes are excluded by the caller.
        let map = unsafe { MmapOptions::new().len(len).map_mut(&self.file) }
            .map_err(|e| PlatformError::device_io(&self.path, "mmap", e))?;
        tracing::trace!(device = %self.path.display(), len, "mapped pixel memory");
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn open_missing_node_is_device_io() {
        let err = LinuxOpener
            .open(Path::new("/nonexistent/fb42"), Access::Control)
            .unwrap_err();
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("open"));
    }

    #[test]
    fn ioctl_on_regular_file_reports_request() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut fb = LinuxOpener.open(tmp.path(), Access::Control).unwrap();
        let err = fb.write_u32(FbRequest::SetBrightness, 10).unwrap_err();
        assert!(err.to_string().contains("0x40047804"), "{err}");
    }
}
