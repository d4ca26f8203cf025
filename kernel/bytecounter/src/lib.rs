//! bytecounter: counts bytes written to a character device and reports the
//! total on read.
//!
//! Writes of any content add their length to a running total. Reads return
//! that total as decimal ASCII, honoring the file position so `cat` sees a
//! short file that ends after the last digit. Only one handle may hold the
//! device open at a time.
//!
//! The operator creates the node with major [`MAJOR`], minor 0:
//!
//! ```text
//! mknod /dev/bytecounter c 62 0
//! chmod 666 /dev/bytecounter
//! echo -n "hello world" > /dev/bytecounter
//! cat /dev/bytecounter          # 11
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::sync::Arc;

use bytecounter_chrdev::{ChrdevRegistry, Registration, RegistrationError};
use bytecounter_core::{kinfo, kwarn};

pub mod counter;
pub mod device;
pub mod gate;

pub use counter::{Counter, Digits, MAX_DIGITS};
pub use device::ByteCounter;
pub use gate::OpenGate;

/// Major number the driver claims.
pub const MAJOR: u32 = 62;

/// Name the major is registered under.
pub const NAME: &str = "bytecounter";

/// A loaded driver: the device state plus its claim on [`MAJOR`].
///
/// Dropping the module (or calling [`exit`](Self::exit)) unregisters the
/// major; since the module is consumed, that happens once per load.
pub struct ByteCounterModule {
    device: Arc<ByteCounter>,
    // Always `Some` until `drop` takes it.
    registration: Option<Registration>,
}

impl ByteCounterModule {
    /// Registers the driver in `registry` with a fresh zero total.
    ///
    /// # Errors
    ///
    /// Returns the [`RegistrationError`] if [`MAJOR`] cannot be claimed;
    /// nothing stays registered in that case.
    pub fn init(registry: &Arc<ChrdevRegistry>) -> Result<Self, RegistrationError> {
        let device = Arc::new(ByteCounter::new());
        let registration = Registration::new(registry, MAJOR, NAME, device.clone())
            .inspect_err(|e| kwarn!("{NAME}: can't obtain major number {MAJOR}: {}", e.reason))?;

        kinfo!("{NAME}: inserting module");
        Ok(Self {
            device,
            registration: Some(registration),
        })
    }

    /// The device state shared with every open file.
    #[must_use]
    pub fn device(&self) -> &Arc<ByteCounter> {
        &self.device
    }

    /// The major number held.
    #[must_use]
    pub fn major(&self) -> u32 {
        self.registration.as_ref().map_or(MAJOR, Registration::major)
    }

    /// Unloads the driver.
    pub fn exit(self) {
        drop(self);
    }
}

impl Drop for ByteCounterModule {
    fn drop(&mut self) {
        drop(self.registration.take());
        kinfo!("{NAME}: removing module");
    }
}

#[cfg(all(test, not(any(loom, shuttle))))]
mod tests {
    use super::*;
    use bytecounter_chrdev::{DevNum, FileOperations, FsError};

    struct Squatter;
    impl FileOperations for Squatter {}

    #[test]
    fn init_claims_major_62() {
        let registry = Arc::new(ChrdevRegistry::new());
        let module = ByteCounterModule::init(&registry).unwrap();
        assert_eq!(module.major(), MAJOR);
        assert_eq!(registry.registered(), vec![(MAJOR, NAME)]);
        assert_eq!(module.device().total(), 0);
    }

    #[test]
    fn init_fails_when_major_taken() {
        let registry = Arc::new(ChrdevRegistry::new());
        registry.register(MAJOR, "squatter", Arc::new(Squatter)).unwrap();

        let err = ByteCounterModule::init(&registry).err().unwrap();
        assert_eq!(err.major, MAJOR);
        assert_eq!(err.reason, FsError::Busy);
        assert_eq!(registry.registered(), vec![(MAJOR, "squatter")]);
    }

    #[test]
    fn exit_frees_the_major() {
        let registry = Arc::new(ChrdevRegistry::new());
        ByteCounterModule::init(&registry).unwrap().exit();
        assert!(registry.registered().is_empty());
        assert!(ByteCounterModule::init(&registry).is_ok());
    }

    #[test]
    fn reload_starts_from_zero() {
        let registry = Arc::new(ChrdevRegistry::new());
        let module = ByteCounterModule::init(&registry).unwrap();
        module.device().accumulate(b"abc");
        module.exit();

        let module = ByteCounterModule::init(&registry).unwrap();
        assert_eq!(module.device().total(), 0);
    }

    #[test]
    fn files_reach_the_module_state() {
        let registry = Arc::new(ChrdevRegistry::new());
        let module = ByteCounterModule::init(&registry).unwrap();
        let mut file = registry
            .open(DevNum::new(MAJOR, 0), bytecounter_chrdev::OpenFlags::all())
            .unwrap();
        assert_eq!(file.write(b"hello world"), Ok(11));
        assert_eq!(module.device().total(), 11);
        assert!(module.device().is_open());
        drop(file);
        assert!(!module.device().is_open());
    }
}
