//! Engine configuration.
//!
//! ```rust
//! use rowfx_compute::EngineConfig;
//!
//! let config = EngineConfig::default().max_workers(4);
//! assert_eq!(config.effective_max_workers(), 4);
//! ```

use crate::partition::MIN_PIXELS_PER_WORKER;

/// CPU path tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on parallel workers (None = CPU count).
    pub max_workers: Option<usize>,
    /// Minimum pixels of work per worker.
    pub min_pixels_per_worker: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            min_pixels_per_worker: MIN_PIXELS_PER_WORKER,
        }
    }
}

impl EngineConfig {
    /// Caps the worker count.
    pub fn max_workers(mut self, n: usize) -> Self {
        self.max_workers = Some(n);
        self
    }

    /// Sets the per-worker pixel minimum.
    pub fn min_pixels_per_worker(mut self, n: usize) -> Self {
        self.min_pixels_per_worker = n;
        self
    }

    /// Worker bound actually used, never below 1.
    pub fn effective_max_workers(&self) -> usize {
        self.max_workers.unwrap_or_else(detect_cpu_count).max(1)
    }
}

/// Platform CPU count, falling back to the rayon pool size.
fn detect_cpu_count() -> usize {
    sys_info::cpu_num()
        .map(|n| n as usize)
        .unwrap_or_else(|_| rayon::current_num_threads())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.min_pixels_per_worker, 4096);
        assert!(config.effective_max_workers() >= 1);
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(EngineConfig::default().max_workers(0).effective_max_workers(), 1);
    }
}
