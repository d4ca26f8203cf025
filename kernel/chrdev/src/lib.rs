//! Character device layer.
//!
//! This crate is the environment a character driver plugs into:
//!
//! - [`ChrdevRegistry`] -- the major-number table binding a device number to
//!   a driver's [`FileOperations`].
//! - [`DevFs`] -- named device nodes (`mknod`, `chmod`, `unlink`) carrying a
//!   [`DevNum`] and a permission [`Mode`].
//! - [`File`] -- an open handle that owns the file position and calls the
//!   driver's `release` when dropped.
//!
//! Every operation is synchronous and completes on the calling thread.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use core::fmt;

pub mod devfs;
pub mod errno;
pub mod file;
pub mod ops;
pub mod registry;

pub use devfs::{DevFs, DevNode, Mode};
pub use file::{File, OpenFlags};
pub use ops::FileOperations;
pub use registry::{ChrdevRegistry, Registration, RegistrationError};

/// A device number: the major selects the driver, the minor the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DevNum {
    /// Driver selector.
    pub major: u32,
    /// Instance within the driver.
    pub minor: u32,
}

impl DevNum {
    /// Creates a device number from its two halves.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for DevNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Errors returned by device and file operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// No device node with the given name.
    NotFound,
    /// The node refers to a major with no registered driver.
    NoDevice,
    /// The handle was not opened with the access the operation needs.
    BadFd,
    /// A transient buffer could not be obtained.
    OutOfMemory,
    /// The caller lacks permission on the device node.
    PermissionDenied,
    /// The device or major number is already in use.
    Busy,
    /// A node with the given name already exists.
    AlreadyExists,
    /// An argument was out of range (major number, negative file position).
    InvalidArgument,
}

impl FsError {
    /// Returns the positive POSIX errno for this error.
    #[must_use]
    pub const fn to_errno(self) -> isize {
        match self {
            Self::NotFound => errno::ENOENT,
            Self::NoDevice => errno::ENXIO,
            Self::BadFd => errno::EBADF,
            Self::OutOfMemory => errno::ENOMEM,
            Self::PermissionDenied => errno::EACCES,
            Self::Busy => errno::EBUSY,
            Self::AlreadyExists => errno::EEXIST,
            Self::InvalidArgument => errno::EINVAL,
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("no such file or directory"),
            Self::NoDevice => f.write_str("no such device or address"),
            Self::BadFd => f.write_str("bad file descriptor"),
            Self::OutOfMemory => f.write_str("out of memory"),
            Self::PermissionDenied => f.write_str("permission denied"),
            Self::Busy => f.write_str("device or resource busy"),
            Self::AlreadyExists => f.write_str("file exists"),
            Self::InvalidArgument => f.write_str("invalid argument"),
        }
    }
}

impl core::error::Error for FsError {}
