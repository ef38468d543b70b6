//! SBE FIFO device handle.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::protocol::{Error, Result};

/// Byte stream the FIFO handshake runs over.
///
/// The descriptor must support `poll(2)`; reads and writes may be
/// non-blocking since the transport waits for readiness first.
pub trait FifoDevice: Read + Write + AsFd {
    /// Path the device was opened from, used for error context.
    fn path(&self) -> &Path;
}

/// Exclusively owned, open SBE FIFO device.
///
/// The descriptor is closed exactly once, when the handle is dropped. The
/// handle cannot be cloned, only moved.
#[derive(Debug)]
pub struct DeviceHandle {
    file: File,
    path: PathBuf,
}

impl DeviceHandle {
    /// Open the device read/write in non-blocking mode.
    ///
    /// The mode is always `O_RDWR | O_NONBLOCK`: every operation writes a
    /// command and reads its reply over the same descriptor, and the
    /// transport relies on `poll(2)` rather than blocking I/O.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| Error::DeviceOpen {
                path: path.to_path_buf(),
                source,
            })?;

        trace!(path = %path.display(), "opened SBE FIFO device");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl FifoDevice for DeviceHandle {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl AsFd for DeviceHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl Read for DeviceHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for DeviceHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        trace!(path = %self.path.display(), "closing SBE FIFO device");
    }
}
