//! Per-frame render engine for image-processing plugins.
//!
//! Takes one destination buffer, zero or more sources, a processing window
//! and a [`Kernel`], validates the window, picks exactly one execution
//! backend and runs the kernel over every pixel of the window.
//!
//! # Architecture
//!
//! ```text
//! ProcessingJob
//!     ├── window_is_valid        (silent no-op on empty / out-of-bounds)
//!     ├── select_backend         (OpenCL > CUDA > Metal > CPU)
//!     │       ├── accelerator    Kernel::run_* with an AcceleratorLaunch
//!     │       └── CPU            RowPartition -> rayon bands -> Kernel::process_band
//!     └── AbortQuery             polled once per row
//! ```
//!
//! # Example
//!
//! ```rust
//! use rowfx_compute::{AbortFlag, BlendKernel, ProcessingJob};
//! use rowfx_core::{ImageBuf, Window};
//!
//! let bounds = Window::new(0, 0, 256, 128);
//! let from = ImageBuf::<u8>::filled(bounds, 4, &[0, 0, 0, 255]).unwrap();
//! let to = ImageBuf::<u8>::filled(bounds, 4, &[200, 100, 50, 255]).unwrap();
//! let mut dst = ImageBuf::<u8>::new(bounds, 4).unwrap();
//! let abort = AbortFlag::new();
//!
//! ProcessingJob::new(BlendKernel::new(0.5), bounds)
//!     .destination(dst.view_mut())
//!     .source(BlendKernel::FROM, Some(from.view()))
//!     .source(BlendKernel::TO, Some(to.view()))
//!     .abort(&abort)
//!     .process()
//!     .unwrap();
//!
//! assert_eq!(dst.pixel(0, 0), Some(&[100u8, 50, 25, 255][..]));
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod cancel;
pub mod config;
pub mod job;
pub mod kernel;
pub mod lock;
pub mod partition;

pub use backend::{
    AcceleratorLaunch, Backend, BackendHandles, CapabilityFlags, CudaStream, DeviceImage,
    MetalQueue, OpenClQueue, PRECEDENCE, select_backend,
};
pub use cancel::{AbortFlag, AbortQuery, NeverAbort};
pub use config::EngineConfig;
pub use job::{ProcessingJob, window_is_valid};
pub use kernel::{
    BlendKernel, GammaKernel, Inputs, InvertKernel, Kernel, MissingSource, NoiseKernel,
    ScaleKernel,
};
pub use lock::{KernelMutex, ScopedLock};
pub use partition::{MIN_PIXELS_PER_WORKER, RowPartition};

use thiserror::Error;

/// Render engine errors.
///
/// Rejected windows and aborted runs are not errors; they return `Ok(())`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    /// The selected accelerator has no implementation in this kernel.
    #[error("Kernel '{kernel}' has no {backend} implementation")]
    Unsupported {
        /// Kernel name.
        kernel: &'static str,
        /// Selected backend.
        backend: Backend,
    },

    /// An accelerator was enabled without its device handle.
    #[error("{0} enabled but no device handle supplied")]
    MissingHandle(Backend),

    /// A connected source does not match the destination format.
    #[error("Source {slot} format mismatch: expected {expected}, got {actual}")]
    SourceMismatch {
        /// Source slot.
        slot: usize,
        /// Destination format.
        expected: String,
        /// Source format.
        actual: String,
    },

    /// Device storage was attached to a job that runs on the CPU.
    #[error("Device storage attached but the job runs on the CPU")]
    DeviceStorageOnCpu,

    /// Failure reported by an accelerator kernel.
    #[error("Accelerator failed: {0}")]
    Accelerator(String),

    /// Buffer layout error.
    #[error(transparent)]
    Core(#[from] rowfx_core::Error),
}

/// Result type for render operations.
pub type ComputeResult<T> = Result<T, ComputeError>;
