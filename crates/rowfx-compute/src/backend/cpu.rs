//! CPU fork-join executor.

use rayon::prelude::*;
use rowfx_core::{Component, RowSpan};
use tracing::trace;

use crate::cancel::AbortQuery;
use crate::kernel::{Inputs, Kernel};
use crate::partition::RowPartition;

/// Runs `kernel` over `rows`, one band per worker, and waits for all bands.
///
/// `rows` are the window's destination scanlines in ascending `y`. Returns
/// the total number of rows written, which is less than `rows.len()` only if
/// the job was aborted.
pub(crate) fn run_bands<T, K>(
    kernel: &K,
    rows: &mut [RowSpan<'_, T>],
    partition: &RowPartition,
    inputs: &Inputs<'_>,
    abort: &dyn AbortQuery,
) -> usize
where
    T: Component,
    K: Kernel,
{
    if rows.is_empty() {
        return 0;
    }

    let run = |k: usize, band: &mut [RowSpan<'_, T>]| {
        let written = kernel.process_band(band, inputs, abort);
        trace!(worker = k, rows = ?partition.band(k), written, "Band finished");
        written
    };

    if partition.worker_count() == 1 {
        return run(0, rows);
    }

    rows.par_chunks_mut(partition.band_height().max(1))
        .enumerate()
        .map(|(k, band)| run(k, band))
        .sum()
}
