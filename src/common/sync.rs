// src/common/sync.rs

//! Lock used for the registry map and per-device state.
//!
//! `parking_lot` with `std`, a spinlock otherwise. Both hand out a guard from
//! `lock()` without poisoning, so callers never see a lock error.

#[cfg(feature = "std")]
pub use parking_lot::{Mutex, MutexGuard};

#[cfg(not(feature = "std"))]
pub use spin::{Mutex, MutexGuard};
