//! POSIX error numbers returned to callers as negative values.

/// `ENOENT`: no such file or directory.
pub const ENOENT: isize = 2;
/// `ENXIO`: no such device or address.
pub const ENXIO: isize = 6;
/// `EBADF`: bad file descriptor.
pub const EBADF: isize = 9;
/// `ENOMEM`: out of memory.
pub const ENOMEM: isize = 12;
/// `EACCES`: permission denied.
pub const EACCES: isize = 13;
/// `EBUSY`: device or resource busy.
pub const EBUSY: isize = 16;
/// `EEXIST`: file exists.
pub const EEXIST: isize = 17;
/// `EINVAL`: invalid argument.
pub const EINVAL: isize = 22;
