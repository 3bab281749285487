//! Row-band partitioning for the CPU path.
//!
//! A processing window is split into contiguous, non-overlapping bands of
//! rows, one per worker. Because no two bands share a row, workers write the
//! destination concurrently without any locking.
//!
//! # Worker Count
//!
//! ```text
//! workers = clamp(floor(width * height / min_pixels), 1, max_workers)
//! band_h  = ceil(height / workers)
//! band k  = [y1 + k*band_h, y1 + min((k+1)*band_h, height))
//! ```
//!
//! Every worker gets at least `min_pixels` (4096 by default) of work, so tiny
//! windows are not over-subscribed while large ones use every CPU.
//!
//! # Example
//!
//! ```rust
//! use rowfx_compute::RowPartition;
//! use rowfx_core::Window;
//!
//! let part = RowPartition::new(&Window::new(0, 0, 4096, 16), 8);
//! assert_eq!(part.worker_count(), 8);
//! assert_eq!(part.band(0), 0..2);
//! assert_eq!(part.band(7), 14..16);
//! ```

use std::ops::Range;

use rowfx_core::Window;

/// Minimum pixels of work handed to one worker.
pub const MIN_PIXELS_PER_WORKER: usize = 4096;

/// Deterministic split of a window's rows into worker bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPartition {
    y1: i32,
    height: usize,
    workers: usize,
    band_height: usize,
}

impl RowPartition {
    /// Partitions `window` for at most `max_workers` workers.
    pub fn new(window: &Window, max_workers: usize) -> Self {
        Self::with_min_pixels(window, max_workers, MIN_PIXELS_PER_WORKER)
    }

    /// Partitions with a custom per-worker pixel minimum.
    pub fn with_min_pixels(window: &Window, max_workers: usize, min_pixels: usize) -> Self {
        let height = window.height();
        let work = window.width().saturating_mul(height);
        let workers = (work / min_pixels.max(1)).clamp(1, max_workers.max(1));
        let band_height = height.div_ceil(workers);
        Self { y1: window.y1, height, workers, band_height }
    }

    /// Number of workers to launch.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Rows per band (the last band may be shorter).
    #[inline]
    pub fn band_height(&self) -> usize {
        self.band_height
    }

    /// Absolute row range of worker `k`.
    ///
    /// Empty when the worker's first row falls past the window, which the
    /// worker treats as "nothing to do".
    pub fn band(&self, k: usize) -> Range<i32> {
        let start = k.saturating_mul(self.band_height);
        if start >= self.height {
            return self.y1..self.y1;
        }
        let end = (start + self.band_height).min(self.height);
        (self.y1 + start as i32)..(self.y1 + end as i32)
    }

    /// Row ranges of all workers, in worker order.
    pub fn bands(&self) -> impl Iterator<Item = Range<i32>> + '_ {
        (0..self.workers).map(move |k| self.band(k))
    }
}
