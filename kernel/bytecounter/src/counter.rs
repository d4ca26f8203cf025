//! The running byte total and its decimal rendering.

use core::fmt::{self, Write};

use bytecounter_chrdev::FsError;
use bytecounter_core::sync::atomic::{AtomicU64, Ordering};
use planck_noalloc::vec::ArrayVec;

/// Decimal digits in `u64::MAX`.
pub const MAX_DIGITS: usize = 20;

/// A rendered counter value: ASCII digits, no sign, no leading zeros.
pub type Digits = ArrayVec<u8, MAX_DIGITS>;

/// Total number of bytes ever written to the device.
///
/// Only grows. Wraps on overflow, which at one byte per nanosecond takes
/// several centuries.
pub struct Counter {
    total: AtomicU64,
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Counter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
        }
    }

    /// Adds `len` bytes to the total.
    pub fn add(&self, len: usize) {
        self.total.fetch_add(len as u64, Ordering::Relaxed);
    }

    /// The current total.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Renders the current total.
    ///
    /// # Errors
    ///
    /// [`FsError::OutOfMemory`] if the digits do not fit, which cannot
    /// happen for a `u64` but is reported rather than truncated.
    pub fn render(&self) -> Result<Digits, FsError> {
        render(self.get())
    }
}

/// Writes a value's digits into a fixed-capacity buffer.
struct DigitSink<'a, const N: usize>(&'a mut ArrayVec<u8, N>);

impl<const N: usize> Write for DigitSink<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.0.try_push(byte).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

/// Renders `value` as minimal decimal ASCII into an `N`-byte stack buffer.
///
/// # Errors
///
/// [`FsError::OutOfMemory`] if `value` needs more than `N` digits.
pub fn render<const N: usize>(value: u64) -> Result<ArrayVec<u8, N>, FsError> {
    let mut digits = ArrayVec::new();
    write!(DigitSink(&mut digits), "{value}").map_err(|_| FsError::OutOfMemory)?;
    Ok(digits)
}

#[cfg(all(test, not(any(loom, shuttle))))]
mod tests {
    use super::*;

    fn text(digits: &Digits) -> &str {
        core::str::from_utf8(digits.as_slice()).unwrap()
    }

    #[test]
    fn starts_at_zero_and_renders_zero() {
        let counter = Counter::new();
        assert_eq!(counter.get(), 0);
        assert_eq!(text(&counter.render().unwrap()), "0");
    }

    #[test]
    fn sums_lengths() {
        let counter = Counter::new();
        for len in [3, 0, 17, 80] {
            counter.add(len);
        }
        assert_eq!(counter.get(), 100);
        assert_eq!(text(&counter.render().unwrap()), "100");
    }

    #[test]
    fn u64_max_fits() {
        let digits: Digits = render(u64::MAX).unwrap();
        assert_eq!(digits.len(), MAX_DIGITS);
        assert_eq!(text(&digits), "18446744073709551615");
    }

    #[test]
    fn overflowing_buffer_is_out_of_memory() {
        assert!(matches!(render::<3>(12_345), Err(FsError::OutOfMemory)));
        assert_eq!(render::<5>(12_345).unwrap().as_slice(), b"12345");
    }

    #[test]
    fn total_wraps() {
        let counter = Counter::new();
        counter.add(usize::MAX);
        counter.add(usize::MAX);
        counter.add(2);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(counter.get(), 0);
    }
}

#[cfg(all(test, loom))]
mod loom_tests {
    use super::*;
    use loom::sync::Arc;
    use loom::thread;

    #[test]
    fn racing_adds_are_not_lost() {
        loom::model(|| {
            let counter = Arc::new(Counter::new());
            let other = Arc::clone(&counter);
            let handle = thread::spawn(move || other.add(5));
            counter.add(95);
            handle.join().unwrap();
            assert_eq!(counter.get(), 100);
        });
    }
}

#[cfg(all(test, shuttle))]
mod shuttle_tests {
    use super::*;
    use shuttle::sync::Arc;
    use shuttle::thread;

    #[test]
    fn concurrent_writes_are_not_lost() {
        shuttle::check_random(
            || {
                let counter = Arc::new(Counter::new());
                let handles: Vec<_> = [5_usize, 95]
                    .into_iter()
                    .map(|len| {
                        let counter = Arc::clone(&counter);
                        thread::spawn(move || counter.add(len))
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
                assert_eq!(counter.get(), 100);
            },
            100,
        );
    }
}
