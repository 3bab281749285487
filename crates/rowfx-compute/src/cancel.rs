//! Cooperative cancellation.
//!
//! The host owns an abort query; the engine polls it once before each
//! output scanline. Cancellation never interrupts a row in progress and is
//! not an error: the worker simply stops, leaving the rows it already wrote.
//!
//! Any `Fn() -> bool + Sync` closure or an [`AbortFlag`] can serve as the
//! query.
//!
//! ```rust
//! use rowfx_compute::{AbortFlag, AbortQuery};
//!
//! let flag = AbortFlag::new();
//! let worker_view = flag.clone();
//! assert!(!worker_view.should_abort());
//!
//! flag.abort();
//! assert!(worker_view.should_abort());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Poll-style "should this job stop?" query.
pub trait AbortQuery: Sync {
    /// Returns `true` once the render should stop.
    fn should_abort(&self) -> bool;
}

impl<F> AbortQuery for F
where
    F: Fn() -> bool + Sync,
{
    #[inline]
    fn should_abort(&self) -> bool {
        self()
    }
}

/// Query that never aborts. Used when the caller supplies none.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAbort;

impl AbortQuery for NeverAbort {
    #[inline]
    fn should_abort(&self) -> bool {
        false
    }
}

/// Shared abort switch.
///
/// Clones observe the same flag; the host keeps one clone and hands another
/// to the job.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    /// Creates a flag in the "keep going" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Clears a previous request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

impl AbortQuery for AbortFlag {
    #[inline]
    fn should_abort(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
