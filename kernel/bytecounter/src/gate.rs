//! Single-open exclusivity.

use bytecounter_chrdev::FsError;
use bytecounter_core::sync::atomic::{AtomicBool, Ordering};

/// Two-state gate: closed (initial) or open.
///
/// At most one open is outstanding. A second open is refused immediately
/// with [`FsError::Busy`]; nothing queues or blocks.
pub struct OpenGate {
    open: AtomicBool,
}

impl Default for OpenGate {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenGate {
    /// Creates a closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(false),
        }
    }

    /// Closed → open.
    ///
    /// # Errors
    ///
    /// [`FsError::Busy`] if the gate is already open; the state is unchanged.
    pub fn try_open(&self) -> Result<(), FsError> {
        self.open
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| ())
            .map_err(|_| FsError::Busy)
    }

    /// Open → closed. Must pair with exactly one successful [`try_open`](Self::try_open).
    pub fn release(&self) {
        self.open.store(false, Ordering::Release);
    }

    /// Whether an open is outstanding.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}
