//! Atomics compatibility shim.
//!
//! When compiled with `cfg(loom)`, re-exports loom's atomics; with
//! `cfg(shuttle)`, shuttle's. Otherwise, re-exports `core::sync::atomic`.
//!
//! Driver state (the byte counter and the open gate) imports its atomics from
//! here so the same code runs under loom's exhaustive scheduler, shuttle's
//! randomized scheduler, or natively.
//!
//! The shimmed types are not `const`-constructible under loom or shuttle, so
//! anything placed in a `static` must use `core::sync::atomic` directly.

// ---------------------------------------------------------------------------
// Loom mode
// ---------------------------------------------------------------------------

#[cfg(loom)]
pub use loom::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// Shuttle mode
// ---------------------------------------------------------------------------

#[cfg(all(shuttle, not(loom)))]
pub use shuttle::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

#[cfg(not(any(loom, shuttle)))]
pub use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
