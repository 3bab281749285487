//! Execution backends and their selection.
//!
//! A job runs on exactly one backend:
//!
//! ```text
//! CapabilityFlags ──► select_backend ──┬── OpenCL queue   ─┐
//!                                      ├── CUDA stream    ─┼── Kernel::run_* (one opaque call)
//!                                      ├── Metal queue    ─┘
//!                                      └── CPU            ──── RowPartition + rayon bands
//! ```
//!
//! Precedence is fixed: **OpenCL > CUDA > Metal > CPU**. The first enabled
//! flag wins. When a host has negotiated device-resident buffers for a
//! backend, the images only exist on that device, so the choice is never
//! revisited and never falls back to the CPU.

mod accel;
mod cpu;

use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr::NonNull;

pub use accel::{AcceleratorLaunch, DeviceImage};
pub(crate) use accel::launch;
pub(crate) use cpu::run_bands;

/// Available execution backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Row-band parallel execution on CPU threads.
    Cpu,
    /// OpenCL command queue.
    OpenCl,
    /// CUDA stream.
    Cuda,
    /// Metal command queue.
    Metal,
}

impl Backend {
    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::OpenCl => "opencl",
            Self::Cuda => "cuda",
            Self::Metal => "metal",
        }
    }

    /// Whether this is a device backend (anything but CPU).
    pub fn is_accelerator(&self) -> bool {
        !matches!(self, Self::Cpu)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Accelerator precedence, highest first.
pub const PRECEDENCE: [Backend; 3] = [Backend::OpenCl, Backend::Cuda, Backend::Metal];

/// Accelerators the host enabled for one render call.
///
/// The flags are meant to be exclusive, but several may be set; see
/// [`select_backend`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityFlags {
    /// OpenCL render enabled.
    pub opencl: bool,
    /// CUDA render enabled.
    pub cuda: bool,
    /// Metal render enabled.
    pub metal: bool,
}

impl CapabilityFlags {
    /// No accelerator enabled (CPU path).
    pub const fn cpu() -> Self {
        Self { opencl: false, cuda: false, metal: false }
    }

    /// Enables OpenCL.
    pub const fn with_opencl(mut self) -> Self {
        self.opencl = true;
        self
    }

    /// Enables CUDA.
    pub const fn with_cuda(mut self) -> Self {
        self.cuda = true;
        self
    }

    /// Enables Metal.
    pub const fn with_metal(mut self) -> Self {
        self.metal = true;
        self
    }

    /// Whether `backend` is enabled. The CPU is always available.
    pub const fn is_enabled(&self, backend: Backend) -> bool {
        match backend {
            Backend::Cpu => true,
            Backend::OpenCl => self.opencl,
            Backend::Cuda => self.cuda,
            Backend::Metal => self.metal,
        }
    }
}

impl std::fmt::Display for CapabilityFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let enabled: Vec<&str> = PRECEDENCE
            .iter()
            .filter(|b| self.is_enabled(**b))
            .map(|b| b.name())
            .collect();
        if enabled.is_empty() {
            f.write_str("cpu")
        } else {
            f.write_str(&enabled.join("+"))
        }
    }
}

/// Picks the backend for a job: first enabled accelerator, else CPU.
///
/// ```rust
/// use rowfx_compute::{Backend, CapabilityFlags, select_backend};
///
/// let flags = CapabilityFlags::cpu().with_metal().with_opencl();
/// assert_eq!(select_backend(&flags), Backend::OpenCl);
/// assert_eq!(select_backend(&CapabilityFlags::cpu()), Backend::Cpu);
/// ```
pub fn select_backend(flags: &CapabilityFlags) -> Backend {
    PRECEDENCE
        .into_iter()
        .find(|b| flags.is_enabled(*b))
        .unwrap_or(Backend::Cpu)
}

macro_rules! device_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        ///
        /// Opaque and never dereferenced by the engine; the host keeps
        /// ownership.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(NonNull<c_void>);

        impl $name {
            /// Wraps a host handle, `None` if null.
            pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
                NonNull::new(ptr).map(Self)
            }

            /// The raw host handle.
            pub fn as_raw(&self) -> *mut c_void {
                self.0.as_ptr()
            }
        }
    };
}

device_handle!(
    /// OpenCL command queue (`cl_command_queue`).
    OpenClQueue
);
device_handle!(
    /// CUDA stream (`cudaStream_t`).
    CudaStream
);
device_handle!(
    /// Metal command queue (`id<MTLCommandQueue>`).
    MetalQueue
);

/// Host device handles, valid only for the duration of one render call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendHandles<'a> {
    opencl: Option<OpenClQueue>,
    cuda: Option<CudaStream>,
    metal: Option<MetalQueue>,
    _call: PhantomData<&'a ()>,
}

impl<'a> BackendHandles<'a> {
    /// No handles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the OpenCL queue.
    pub fn opencl(mut self, queue: OpenClQueue) -> Self {
        self.opencl = Some(queue);
        self
    }

    /// Sets the CUDA stream.
    pub fn cuda(mut self, stream: CudaStream) -> Self {
        self.cuda = Some(stream);
        self
    }

    /// Sets the Metal queue.
    pub fn metal(mut self, queue: MetalQueue) -> Self {
        self.metal = Some(queue);
        self
    }

    /// OpenCL queue, if supplied.
    pub fn opencl_queue(&self) -> Option<OpenClQueue> {
        self.opencl
    }

    /// CUDA stream, if supplied.
    pub fn cuda_stream(&self) -> Option<CudaStream> {
        self.cuda
    }

    /// Metal queue, if supplied.
    pub fn metal_queue(&self) -> Option<MetalQueue> {
        self.metal
    }
}
