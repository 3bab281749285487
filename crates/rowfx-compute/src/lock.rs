//! Scoped mutual exclusion for kernels with cross-row state.
//!
//! The engine's own output path needs no locking: bands never share a row.
//! Kernels that accumulate across rows (histograms, statistics) wrap their
//! shared state in a [`KernelMutex`]. The guard is acquired on construction
//! and released on every exit path, including unwinding.
//!
//! ```rust
//! use rowfx_compute::KernelMutex;
//!
//! let total = KernelMutex::new(0u64);
//! std::thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| *total.lock() += 1);
//!     }
//! });
//! assert_eq!(total.into_inner(), 4);
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

/// Mutex whose guard never reports poisoning.
///
/// A panic in one worker must not wedge the other workers of the same job,
/// so a poisoned lock is recovered and the data handed out as is.
#[derive(Debug, Default)]
pub struct KernelMutex<T> {
    inner: Mutex<T>,
}

impl<T> KernelMutex<T> {
    /// Wraps `value`.
    pub const fn new(value: T) -> Self {
        Self { inner: Mutex::new(value) }
    }

    /// Blocks until the lock is held.
    pub fn lock(&self) -> ScopedLock<'_, T> {
        let guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ScopedLock { guard }
    }

    /// Runs `f` with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Consumes the mutex, returning the value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Held lock; releases on drop.
pub struct ScopedLock<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> Deref for ScopedLock<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for ScopedLock<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
