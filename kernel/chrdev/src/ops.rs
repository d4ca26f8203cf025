//! The operation table a character driver registers.

use crate::{DevNum, FsError};

/// Operations a character driver provides for its device numbers.
///
/// The registry calls [`open`](Self::open) before handing out a
/// [`File`](crate::File) and [`release`](Self::release) exactly once when
/// that file is dropped. `read` and `write` receive the handle's file
/// position and advance it themselves; the position is never shared
/// between handles.
///
/// Calls on a single handle are serialized by `&mut File`; implementations
/// only need to synchronize state they share across handles.
pub trait FileOperations: Send + Sync {
    /// Called when a device node with this driver's major is opened.
    ///
    /// # Errors
    ///
    /// Any error is returned to the opener and no file is created.
    fn open(&self, _dev: DevNum) -> Result<(), FsError> {
        Ok(())
    }

    /// Called once when the last reference to an open file goes away.
    fn release(&self, _dev: DevNum) {}

    /// Reads into `buf` starting at `*pos`, advancing `*pos` by the count
    /// returned. Returning `Ok(0)` for a non-empty `buf` signals end of file.
    ///
    /// # Errors
    ///
    /// Defaults to [`FsError::InvalidArgument`] for write-only devices.
    fn read(&self, _dev: DevNum, _buf: &mut [u8], _pos: &mut i64) -> Result<usize, FsError> {
        Err(FsError::InvalidArgument)
    }

    /// Writes `buf` at `*pos`, returning the number of bytes accepted.
    ///
    /// # Errors
    ///
    /// Defaults to [`FsError::InvalidArgument`] for read-only devices.
    fn write(&self, _dev: DevNum, _buf: &[u8], _pos: &mut i64) -> Result<usize, FsError> {
        Err(FsError::InvalidArgument)
    }
}
