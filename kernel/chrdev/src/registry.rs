//! Character device major-number table.
//!
//! Drivers claim a major number together with their [`FileOperations`].
//! Opening a device node looks the major up here and asks the driver to
//! accept the open. [`Registration`] ties a claim to a value's lifetime so
//! that teardown happens exactly once.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::RangeInclusive;

use bytecounter_core::sync::SpinLock;
use bytecounter_core::{kdebug, ktrace};

use crate::{DevNum, File, FileOperations, FsError, OpenFlags};

/// Highest valid major number.
pub const MAX_MAJOR: u32 = 511;

/// Majors handed out when a driver asks for major 0, searched from the top.
const DYNAMIC_MAJORS: RangeInclusive<u32> = 234..=254;

/// A failed attempt to claim a major number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationError {
    /// The major that was requested (0 for a dynamic request).
    pub major: u32,
    /// Why the registry refused it.
    pub reason: FsError,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "can't obtain major number {}: {}", self.major, self.reason)
    }
}

impl core::error::Error for RegistrationError {}

struct ChrdevEntry {
    name: &'static str,
    fops: Arc<dyn FileOperations>,
}

/// The table of registered character drivers, keyed by major.
pub struct ChrdevRegistry {
    majors: SpinLock<BTreeMap<u32, ChrdevEntry>>,
}

impl Default for ChrdevRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChrdevRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            majors: SpinLock::named("CHRDEVS", BTreeMap::new()),
        }
    }

    /// Binds `major` to `fops` under `name`.
    ///
    /// A `major` of 0 asks for a free major from the dynamic range. Returns
    /// the major actually claimed.
    ///
    /// # Errors
    ///
    /// [`FsError::InvalidArgument`] if `major` exceeds [`MAX_MAJOR`],
    /// [`FsError::Busy`] if it is taken or the dynamic range is exhausted.
    /// The table is unchanged on error.
    pub fn register(
        &self,
        major: u32,
        name: &'static str,
        fops: Arc<dyn FileOperations>,
    ) -> Result<u32, RegistrationError> {
        let fail = |reason| RegistrationError { major, reason };
        if major > MAX_MAJOR {
            return Err(fail(FsError::InvalidArgument));
        }

        let mut majors = self.majors.lock();
        let claimed = if major == 0 {
            DYNAMIC_MAJORS
                .rev()
                .find(|m| !majors.contains_key(m))
                .ok_or(fail(FsError::Busy))?
        } else if majors.contains_key(&major) {
            return Err(fail(FsError::Busy));
        } else {
            major
        };
        majors.insert(claimed, ChrdevEntry { name, fops });
        drop(majors);

        kdebug!("chrdev: registered major {claimed} ({name})");
        Ok(claimed)
    }

    /// Releases `major` if it is held under `name`.
    ///
    /// Returns `false` if the major is free or owned by another name.
    pub fn unregister(&self, major: u32, name: &'static str) -> bool {
        let mut majors = self.majors.lock();
        if majors.get(&major).is_none_or(|entry| entry.name != name) {
            return false;
        }
        majors.remove(&major);
        drop(majors);

        kdebug!("chrdev: unregistered major {major} ({name})");
        true
    }

    /// Returns the operations bound to `major`.
    #[must_use]
    pub fn lookup(&self, major: u32) -> Option<Arc<dyn FileOperations>> {
        self.majors
            .lock()
            .get(&major)
            .map(|entry| Arc::clone(&entry.fops))
    }

    /// Lists `(major, name)` pairs in ascending major order.
    #[must_use]
    pub fn registered(&self) -> Vec<(u32, &'static str)> {
        self.majors
            .lock()
            .iter()
            .map(|(major, entry)| (*major, entry.name))
            .collect()
    }

    /// Opens `dev` through its driver.
    ///
    /// The driver's `open` runs without the table lock held.
    ///
    /// # Errors
    ///
    /// [`FsError::NoDevice`] if no driver holds `dev.major`, otherwise
    /// whatever the driver's `open` returns.
    pub fn open(&self, dev: DevNum, flags: OpenFlags) -> Result<File, FsError> {
        let fops = self.lookup(dev.major).ok_or(FsError::NoDevice)?;
        fops.open(dev)?;
        ktrace!("chrdev: opened {dev}");
        Ok(File::new(fops, dev, flags))
    }
}

/// A claimed major number, released when dropped.
pub struct Registration {
    registry: Arc<ChrdevRegistry>,
    major: u32,
    name: &'static str,
}

impl Registration {
    /// Claims `major` in `registry`; see [`ChrdevRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns the registry's [`RegistrationError`] unchanged.
    pub fn new(
        registry: &Arc<ChrdevRegistry>,
        major: u32,
        name: &'static str,
        fops: Arc<dyn FileOperations>,
    ) -> Result<Self, RegistrationError> {
        let major = registry.register(major, name, fops)?;
        Ok(Self {
            registry: Arc::clone(registry),
            major,
            name,
        })
    }

    /// The major number held by this registration.
    #[must_use]
    pub fn major(&self) -> u32 {
        self.major
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("major", &self.major)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(self.major, self.name);
    }
}
