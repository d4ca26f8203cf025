//! Core types shared by the bytecounter driver and its host environment.
//!
//! This crate holds the pieces that neither the character-device layer nor
//! the driver should own: the leveled logging facade and the synchronization
//! primitives (a spin lock and an atomics shim that swaps in `loom` or
//! `shuttle` types for model-checked builds).
//!
//! Everything here is `no_std` and host-testable with `cargo test`.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod log;
pub mod sync;
