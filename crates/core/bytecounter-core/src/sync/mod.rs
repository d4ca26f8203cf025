//! Synchronization primitives.
//!
//! Provides [`SpinLock`] for the host-side device tables and the [`atomic`]
//! shim used by driver state that must be model-checkable.

pub mod atomic;
mod spinlock;

pub use spinlock::{SpinLock, SpinLockGuard};
