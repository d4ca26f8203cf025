//! Open file handles.
//!
//! A [`File`] is what a successful open returns. It holds the driver's
//! operation table, the device number it was opened through, the access
//! mode, and the file position. Dropping it releases the device.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use bitflags::bitflags;

use crate::{DevNum, FileOperations, FsError};

bitflags! {
    /// Access mode requested at open time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// Open for reading.
        const READ  = 0b01;
        /// Open for writing.
        const WRITE = 0b10;
    }
}

/// An open character device.
pub struct File {
    fops: Arc<dyn FileOperations>,
    dev: DevNum,
    flags: OpenFlags,
    /// Current file position. Starts at zero on every open.
    pos: i64,
}

impl File {
    /// Wraps a device that has already accepted the open.
    pub(crate) fn new(fops: Arc<dyn FileOperations>, dev: DevNum, flags: OpenFlags) -> Self {
        Self {
            fops,
            dev,
            flags,
            pos: 0,
        }
    }

    /// The device number this file was opened through.
    #[must_use]
    pub fn dev(&self) -> DevNum {
        self.dev
    }

    /// The current file position.
    #[must_use]
    pub fn pos(&self) -> i64 {
        self.pos
    }

    /// Reads up to `buf.len()` bytes at the current position.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::BadFd`] if the file was not opened for reading,
    /// otherwise whatever the driver reports. A failed read leaves the
    /// position where it was.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        if !self.flags.contains(OpenFlags::READ) {
            return Err(FsError::BadFd);
        }
        let mut pos = self.pos;
        let n = self.fops.read(self.dev, buf, &mut pos)?;
        self.pos = pos;
        Ok(n)
    }

    /// Writes `buf` at the current position.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::BadFd`] if the file was not opened for writing,
    /// otherwise whatever the driver reports.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, FsError> {
        if !self.flags.contains(OpenFlags::WRITE) {
            return Err(FsError::BadFd);
        }
        let mut pos = self.pos;
        let n = self.fops.write(self.dev, buf, &mut pos)?;
        self.pos = pos;
        Ok(n)
    }

    /// Reads until the driver reports end of file, appending to `out`.
    ///
    /// Uses `chunk`-sized reads, the way `cat` drains a device.
    ///
    /// # Errors
    ///
    /// Propagates the first read error; bytes read before it stay in `out`.
    pub fn read_to_end(&mut self, out: &mut Vec<u8>, chunk: usize) -> Result<usize, FsError> {
        let mut buf = vec![0u8; chunk.max(1)];
        let start = out.len();
        loop {
            let n = self.read(&mut buf)?;
            if n == 0 {
                return Ok(out.len() - start);
            }
            out.extend_from_slice(&buf[..n]);
        }
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("dev", &self.dev)
            .field("flags", &self.flags)
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

impl Drop for File {
    fn drop(&mut self) {
        self.fops.release(self.dev);
    }
}
