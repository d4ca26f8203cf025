//! Device nodes (`/dev`).
//!
//! Nodes are created by the operator with [`DevFs::mknod`] and opened by
//! name. A node only records a [`DevNum`] and a permission [`Mode`]; the
//! driver behind it is found in the [`ChrdevRegistry`] at open time, so a
//! node can exist before its driver is loaded and outlive it.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;

use bitflags::bitflags;

use bytecounter_core::sync::SpinLock;

use crate::{ChrdevRegistry, DevNum, File, FsError, OpenFlags};

/// User id that bypasses permission checks and owns every node.
pub const ROOT_UID: u32 = 0;

bitflags! {
    /// Permission bits of a device node, laid out like `st_mode & 0o777`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mode: u16 {
        /// Owner may read.
        const OWNER_READ  = 0o400;
        /// Owner may write.
        const OWNER_WRITE = 0o200;
        /// Group may read.
        const GROUP_READ  = 0o040;
        /// Group may write.
        const GROUP_WRITE = 0o020;
        /// Anyone may read.
        const OTHER_READ  = 0o004;
        /// Anyone may write.
        const OTHER_WRITE = 0o002;
    }
}

impl Mode {
    /// `0o600`: what `mknod` creates before the operator widens it.
    pub const DEFAULT: Self = Self::OWNER_READ.union(Self::OWNER_WRITE);

    /// Builds a mode from octal bits, ignoring anything this layer does not model.
    #[must_use]
    pub const fn from_octal(bits: u16) -> Self {
        Self::from_bits_truncate(bits)
    }

    /// Whether a caller with the given uid may open with `flags`.
    ///
    /// Nodes are owned by root, so non-root callers are checked against the
    /// "other" bits.
    #[must_use]
    pub fn permits(self, uid: u32, flags: OpenFlags) -> bool {
        if uid == ROOT_UID {
            return true;
        }
        (!flags.contains(OpenFlags::READ) || self.contains(Self::OTHER_READ))
            && (!flags.contains(OpenFlags::WRITE) || self.contains(Self::OTHER_WRITE))
    }
}

/// A character special file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevNode {
    /// Device the node refers to.
    pub dev: DevNum,
    /// Permission bits.
    pub mode: Mode,
}

/// The device directory.
pub struct DevFs {
    registry: Arc<ChrdevRegistry>,
    nodes: SpinLock<BTreeMap<String, DevNode>>,
}

impl DevFs {
    /// Creates an empty device directory resolving drivers through `registry`.
    #[must_use]
    pub fn new(registry: Arc<ChrdevRegistry>) -> Self {
        Self {
            registry,
            nodes: SpinLock::named("DEVFS", BTreeMap::new()),
        }
    }

    /// The registry nodes are resolved against.
    #[must_use]
    pub fn registry(&self) -> &Arc<ChrdevRegistry> {
        &self.registry
    }

    /// Creates a character node `name` for `dev` with [`Mode::DEFAULT`].
    ///
    /// # Errors
    ///
    /// [`FsError::AlreadyExists`] if `name` is taken,
    /// [`FsError::InvalidArgument`] if `name` is empty or contains `/`.
    pub fn mknod(&self, name: &str, dev: DevNum) -> Result<(), FsError> {
        if name.is_empty() || name.contains('/') {
            return Err(FsError::InvalidArgument);
        }
        let mut nodes = self.nodes.lock();
        if nodes.contains_key(name) {
            return Err(FsError::AlreadyExists);
        }
        nodes.insert(
            name.to_string(),
            DevNode {
                dev,
                mode: Mode::DEFAULT,
            },
        );
        Ok(())
    }

    /// Replaces the permission bits of `name`.
    ///
    /// # Errors
    ///
    /// [`FsError::NotFound`] if there is no such node.
    pub fn chmod(&self, name: &str, mode: Mode) -> Result<(), FsError> {
        let mut nodes = self.nodes.lock();
        let node = nodes.get_mut(name).ok_or(FsError::NotFound)?;
        node.mode = mode;
        Ok(())
    }

    /// Removes `name`. Files already open through it stay usable.
    ///
    /// # Errors
    ///
    /// [`FsError::NotFound`] if there is no such node.
    pub fn unlink(&self, name: &str) -> Result<(), FsError> {
        self.nodes
            .lock()
            .remove(name)
            .map(|_| ())
            .ok_or(FsError::NotFound)
    }

    /// Returns the node `name`.
    ///
    /// # Errors
    ///
    /// [`FsError::NotFound`] if there is no such node.
    pub fn stat(&self, name: &str) -> Result<DevNode, FsError> {
        self.nodes.lock().get(name).copied().ok_or(FsError::NotFound)
    }

    /// Opens `name` on behalf of `uid`.
    ///
    /// # Errors
    ///
    /// [`FsError::NotFound`] for a missing node,
    /// [`FsError::PermissionDenied`] if the mode forbids the access,
    /// otherwise anything [`ChrdevRegistry::open`] returns.
    pub fn open(&self, name: &str, flags: OpenFlags, uid: u32) -> Result<File, FsError> {
        let node = self.stat(name)?;
        if !node.mode.permits(uid, flags) {
            return Err(FsError::PermissionDenied);
        }
        self.registry.open(node.dev, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileOperations;

    const USER: u32 = 1000;

    struct Nop;
    impl FileOperations for Nop {}

    fn devfs_with_driver() -> DevFs {
        let registry = Arc::new(ChrdevRegistry::new());
        registry.register(62, "nop", Arc::new(Nop)).unwrap();
        DevFs::new(registry)
    }

    #[test]
    fn mknod_rejects_duplicates_and_bad_names() {
        let devfs = devfs_with_driver();
        devfs.mknod("node", DevNum::new(62, 0)).unwrap();
        assert_eq!(
            devfs.mknod("node", DevNum::new(62, 1)),
            Err(FsError::AlreadyExists)
        );
        assert_eq!(devfs.mknod("", DevNum::new(62, 0)), Err(FsError::InvalidArgument));
        assert_eq!(devfs.mknod("a/b", DevNum::new(62, 0)), Err(FsError::InvalidArgument));
    }

    #[test]
    fn default_mode_is_root_only() {
        let devfs = devfs_with_driver();
        devfs.mknod("node", DevNum::new(62, 0)).unwrap();
        assert_eq!(devfs.stat("node").unwrap().mode, Mode::from_octal(0o600));
        assert_eq!(
            devfs.open("node", OpenFlags::READ, USER).unwrap_err(),
            FsError::PermissionDenied
        );
        assert!(devfs.open("node", OpenFlags::READ, ROOT_UID).is_ok());
    }

    #[test]
    fn chmod_666_opens_to_everyone() {
        let devfs = devfs_with_driver();
        devfs.mknod("node", DevNum::new(62, 0)).unwrap();
        devfs.chmod("node", Mode::from_octal(0o666)).unwrap();
        assert!(devfs.open("node", OpenFlags::READ | OpenFlags::WRITE, USER).is_ok());
    }

    #[test]
    fn write_needs_write_bit() {
        let devfs = devfs_with_driver();
        devfs.mknod("node", DevNum::new(62, 0)).unwrap();
        devfs.chmod("node", Mode::from_octal(0o644)).unwrap();
        assert!(devfs.open("node", OpenFlags::READ, USER).is_ok());
        assert_eq!(
            devfs.open("node", OpenFlags::WRITE, USER).unwrap_err(),
            FsError::PermissionDenied
        );
    }

    #[test]
    fn missing_node_and_missing_driver() {
        let devfs = devfs_with_driver();
        assert_eq!(
            devfs.open("ghost", OpenFlags::READ, ROOT_UID).unwrap_err(),
            FsError::NotFound
        );
        devfs.mknod("orphan", DevNum::new(99, 0)).unwrap();
        assert_eq!(
            devfs.open("orphan", OpenFlags::READ, ROOT_UID).unwrap_err(),
            FsError::NoDevice
        );
    }

    #[test]
    fn unlink_keeps_open_files() {
        let devfs = devfs_with_driver();
        devfs.mknod("node", DevNum::new(62, 0)).unwrap();
        let file = devfs.open("node", OpenFlags::READ, ROOT_UID).unwrap();
        devfs.unlink("node").unwrap();
        assert_eq!(devfs.stat("node"), Err(FsError::NotFound));
        assert_eq!(devfs.unlink("node"), Err(FsError::NotFound));
        assert_eq!(file.dev(), DevNum::new(62, 0));
    }
}
