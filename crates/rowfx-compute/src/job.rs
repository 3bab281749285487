//! One render call: buffers, window, backend and kernel tied together.
//!
//! # Pipeline
//!
//! ```text
//! process()
//!   1. bounds check     window empty or outside dst bounds -> Ok(()), nothing written
//!   2. format check     connected source != dst format     -> SourceMismatch
//!   3. select backend   OpenCL > CUDA > Metal > CPU
//!   4. run              accelerator: one Kernel::run_* call
//!                       CPU: RowPartition bands on rayon, join, return
//! ```
//!
//! Accelerator jobs may carry device storage instead of host views, see
//! [`ProcessingJob::device_destination`]. Per slot, device storage takes
//! precedence over a host view.
//!
//! # Example
//!
//! ```rust
//! use rowfx_compute::{ProcessingJob, ScaleKernel};
//! use rowfx_core::{ImageBuf, Window};
//!
//! let bounds = Window::new(0, 0, 64, 64);
//! let src = ImageBuf::<f32>::filled(bounds, 4, &[0.25; 4]).unwrap();
//! let mut dst = ImageBuf::<f32>::new(bounds, 4).unwrap();
//!
//! ProcessingJob::new(ScaleKernel::uniform(2.0), bounds)
//!     .destination(dst.view_mut())
//!     .source(ScaleKernel::SOURCE, Some(src.view()))
//!     .process()
//!     .unwrap();
//!
//! assert_eq!(dst.pixel(10, 10), Some(&[0.5f32; 4][..]));
//! ```

use std::ffi::c_void;

use rowfx_core::{BitDepth, Component, ImageMut, ImageRef, Window, f16};
use tracing::debug;

use crate::backend::{
    AcceleratorLaunch, Backend, BackendHandles, CapabilityFlags, DeviceImage, launch, run_bands,
    select_backend,
};
use crate::cancel::{AbortQuery, NeverAbort};
use crate::config::EngineConfig;
use crate::kernel::{Inputs, Kernel, MissingSource};
use crate::partition::RowPartition;
use crate::{ComputeError, ComputeResult};

/// Whether `window` may be processed against a destination with `bounds`.
///
/// The window must be non-empty and lie entirely inside the destination.
/// Without a destination only emptiness is checked.
pub fn window_is_valid(window: &Window, bounds: Option<&Window>) -> bool {
    match bounds {
        Some(b) => b.contains_window(window),
        None => !window.is_empty(),
    }
}

/// A single render request. Built, processed once, dropped.
pub struct ProcessingJob<'a, K: Kernel> {
    kernel: K,
    window: Window,
    destination: Option<ImageMut<'a>>,
    sources: Vec<Option<ImageRef<'a>>>,
    device_destination: Option<DeviceImage<*mut c_void>>,
    device_sources: Vec<Option<DeviceImage<*const c_void>>>,
    capabilities: CapabilityFlags,
    handles: BackendHandles<'a>,
    abort: &'a dyn AbortQuery,
    missing: MissingSource,
    config: EngineConfig,
}

impl<'a, K: Kernel> ProcessingJob<'a, K> {
    /// Creates a CPU job for `kernel` over `window` with no buffers attached.
    pub fn new(kernel: K, window: Window) -> Self {
        Self {
            kernel,
            window,
            destination: None,
            sources: Vec::new(),
            device_destination: None,
            device_sources: Vec::new(),
            capabilities: CapabilityFlags::cpu(),
            handles: BackendHandles::new(),
            abort: &NeverAbort,
            missing: MissingSource::default(),
            config: EngineConfig::default(),
        }
    }

    /// Attaches the destination buffer.
    pub fn destination(mut self, dst: ImageMut<'a>) -> Self {
        self.destination = Some(dst);
        self
    }

    /// Connects (or disconnects, with `None`) source `slot`.
    pub fn source(mut self, slot: usize, src: Option<ImageRef<'a>>) -> Self {
        if self.sources.len() <= slot {
            self.sources.resize(slot + 1, None);
        }
        self.sources[slot] = src;
        self
    }

    /// Attaches destination storage the host holds on the device.
    ///
    /// Takes precedence over a host destination, and its `bounds` drive the
    /// window check. Only accelerator backends can run such a job; the CPU path
    /// fails with [`ComputeError::DeviceStorageOnCpu`].
    pub fn device_destination(mut self, dst: DeviceImage<*mut c_void>) -> Self {
        self.device_destination = Some(dst);
        self
    }

    /// Connects (or disconnects) source `slot` to device storage.
    pub fn device_source(mut self, slot: usize, src: Option<DeviceImage<*const c_void>>) -> Self {
        if self.device_sources.len() <= slot {
            self.device_sources.resize(slot + 1, None);
        }
        self.device_sources[slot] = src;
        self
    }

    /// Sets the accelerators the host enabled for this call.
    pub fn capabilities(mut self, flags: CapabilityFlags) -> Self {
        self.capabilities = flags;
        self
    }

    /// Sets the host device handles.
    pub fn handles(mut self, handles: BackendHandles<'a>) -> Self {
        self.handles = handles;
        self
    }

    /// Sets the abort query polled once per row.
    pub fn abort(mut self, abort: &'a dyn AbortQuery) -> Self {
        self.abort = abort;
        self
    }

    /// Sets what kernels write where source data is missing.
    pub fn missing_source(mut self, missing: MissingSource) -> Self {
        self.missing = missing;
        self
    }

    /// Sets CPU path tuning.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The kernel.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// The processing window.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Backend this job would run on.
    pub fn backend(&self) -> Backend {
        select_backend(&self.capabilities)
    }

    /// Runs the job to completion.
    ///
    /// An empty or out-of-bounds window and an aborted run both return
    /// `Ok(())`; only rows processed before the abort was seen are written.
    pub fn process(mut self) -> ComputeResult<()> {
        let kernel = self.kernel.name();
        let bounds = self
            .device_destination
            .map(|d| d.bounds)
            .or_else(|| self.destination.as_ref().map(|d| d.bounds()));

        if !window_is_valid(&self.window, bounds.as_ref()) {
            debug!(
                kernel,
                window = %self.window,
                bounds = ?bounds,
                "Window rejected, nothing to do"
            );
            return Ok(());
        }

        self.check_sources()?;

        let backend = select_backend(&self.capabilities);
        debug!(kernel, window = %self.window, %backend, flags = %self.capabilities, "Processing job");

        if backend.is_accelerator() {
            let sources = merge_sources(&self.sources, &self.device_sources);
            let destination = self
                .device_destination
                .or_else(|| self.destination.as_mut().map(DeviceImage::from_host_mut));
            let desc = AcceleratorLaunch::from_devices(self.window, sources, destination);
            return launch(backend, &self.kernel, &self.handles, &desc);
        }

        if self.has_device_storage() {
            return Err(ComputeError::DeviceStorageOnCpu);
        }

        let Some(mut dst) = self.destination.take() else {
            debug!(kernel, "No destination, nothing to do");
            return Ok(());
        };

        let partition = RowPartition::with_min_pixels(
            &self.window,
            self.config.effective_max_workers(),
            self.config.min_pixels_per_worker,
        );
        let inputs = Inputs::new(std::mem::take(&mut self.sources), self.missing);
        let ctx = CpuRun {
            kernel: &self.kernel,
            window: &self.window,
            partition: &partition,
            inputs: &inputs,
            abort: self.abort,
        };

        let written = match dst.depth() {
            BitDepth::U8 => ctx.run::<u8>(&mut dst),
            BitDepth::U16 => ctx.run::<u16>(&mut dst),
            BitDepth::F16 => ctx.run::<f16>(&mut dst),
            BitDepth::F32 => ctx.run::<f32>(&mut dst),
        };

        let height = self.window.height();
        if written < height {
            debug!(kernel, written, height, "Job aborted");
        } else {
            debug!(kernel, workers = partition.worker_count(), rows = written, "Job finished");
        }
        Ok(())
    }

    fn check_sources(&self) -> ComputeResult<()> {
        let expected = match (&self.device_destination, &self.destination) {
            (Some(dst), _) => (dst.components, dst.depth),
            (None, Some(dst)) => (dst.components(), dst.depth()),
            (None, None) => return Ok(()),
        };
        let host = self.sources.iter().enumerate().filter_map(|(slot, src)| {
            src.as_ref().map(|s| (slot, (s.components(), s.depth())))
        });
        let device = self.device_sources.iter().enumerate().filter_map(|(slot, src)| {
            src.as_ref().map(|s| (slot, (s.components, s.depth)))
        });

        for (slot, actual) in host.chain(device) {
            if actual != expected {
                return Err(ComputeError::SourceMismatch {
                    slot,
                    expected: format_name(expected.0, expected.1),
                    actual: format_name(actual.0, actual.1),
                });
            }
        }
        Ok(())
    }

    fn has_device_storage(&self) -> bool {
        self.device_destination.is_some() || self.device_sources.iter().any(Option::is_some)
    }

}

impl<K: Kernel + std::fmt::Debug> std::fmt::Debug for ProcessingJob<'_, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingJob")
            .field("kernel", &self.kernel)
            .field("window", &self.window)
            .field("destination", &self.destination)
            .field("sources", &self.sources)
            .field("device_destination", &self.device_destination)
            .field("device_sources", &self.device_sources)
            .field("capabilities", &self.capabilities)
            .field("missing", &self.missing)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Device storage first, then host views, slot by slot.
fn merge_sources(
    host: &[Option<ImageRef<'_>>],
    device: &[Option<DeviceImage<*const c_void>>],
) -> Vec<Option<DeviceImage<*const c_void>>> {
    (0..host.len().max(device.len()))
        .map(|slot| {
            device
                .get(slot)
                .copied()
                .flatten()
                .or_else(|| host.get(slot).and_then(Option::as_ref).map(DeviceImage::from_host))
        })
        .collect()
}

fn format_name(components: usize, depth: BitDepth) -> String {
    format!("{components}x{depth}")
}

/// Borrowed state for one CPU pass.
struct CpuRun<'r, 'i, K> {
    kernel: &'r K,
    window: &'r Window,
    partition: &'r RowPartition,
    inputs: &'r Inputs<'i>,
    abort: &'r dyn AbortQuery,
}

impl<K: Kernel> CpuRun<'_, '_, K> {
    fn run<T: Component>(&self, dst: &mut ImageMut<'_>) -> usize {
        match dst.rows_mut::<T>(self.window) {
            Some(mut rows) => run_bands(self.kernel, &mut rows, self.partition, self.inputs, self.abort),
            None => 0,
        }
    }
}
