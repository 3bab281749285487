//! Accelerator launch description and invocation.

use std::ffi::c_void;
use std::marker::PhantomData;

use rowfx_core::{BitDepth, ImageMut, ImageRef, Window};
use tracing::debug;

use super::{Backend, BackendHandles};
use crate::kernel::Kernel;
use crate::{ComputeError, ComputeResult};

/// Device storage of one image as handed over by the host.
///
/// Hosts that negotiated device residency attach these directly with
/// [`ProcessingJob::device_source`](crate::ProcessingJob::device_source) and
/// [`ProcessingJob::device_destination`](crate::ProcessingJob::device_destination).
/// The engine never dereferences `data`; it forwards it to the kernel as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceImage<P> {
    /// Device buffer handle.
    pub data: P,
    /// Buffer bounds.
    pub bounds: Window,
    /// Signed row stride in bytes.
    pub row_stride: isize,
    /// Components per pixel.
    pub components: usize,
    /// Sample depth.
    pub depth: BitDepth,
}

impl DeviceImage<*const c_void> {
    /// Describes a host source view.
    pub fn from_host(img: &ImageRef<'_>) -> Self {
        Self {
            data: img.as_ptr().cast::<c_void>(),
            bounds: img.bounds(),
            row_stride: img.row_stride(),
            components: img.components(),
            depth: img.depth(),
        }
    }
}

impl DeviceImage<*mut c_void> {
    /// Describes a host destination view.
    pub fn from_host_mut(img: &mut ImageMut<'_>) -> Self {
        Self {
            bounds: img.bounds(),
            row_stride: img.row_stride(),
            components: img.components(),
            depth: img.depth(),
            data: img.as_mut_ptr().cast::<c_void>(),
        }
    }
}

/// Everything an accelerator kernel needs for one whole-window launch.
///
/// Borrows the job's images for `'a`; the device handles are only valid for
/// that long.
#[derive(Debug)]
pub struct AcceleratorLaunch<'a> {
    window: Window,
    sources: Vec<Option<DeviceImage<*const c_void>>>,
    destination: Option<DeviceImage<*mut c_void>>,
    _images: PhantomData<&'a mut ()>,
}

impl<'a> AcceleratorLaunch<'a> {
    /// Describes a launch over `window` on host views.
    pub fn new(
        window: Window,
        sources: &[Option<ImageRef<'a>>],
        destination: Option<&'a mut ImageMut<'_>>,
    ) -> Self {
        let sources = sources
            .iter()
            .map(|s| s.as_ref().map(DeviceImage::from_host))
            .collect();
        Self::from_devices(window, sources, destination.map(DeviceImage::from_host_mut))
    }

    /// Describes a launch over `window` on storage the host already holds
    /// on the device.
    pub fn from_devices(
        window: Window,
        sources: Vec<Option<DeviceImage<*const c_void>>>,
        destination: Option<DeviceImage<*mut c_void>>,
    ) -> Self {
        Self { window, sources, destination, _images: PhantomData }
    }

    /// Processing window.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Number of source slots.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Source in `slot`, `None` if disconnected.
    pub fn source(&self, slot: usize) -> Option<&DeviceImage<*const c_void>> {
        self.sources.get(slot)?.as_ref()
    }

    /// Destination, `None` if the job had none.
    pub fn destination(&self) -> Option<&DeviceImage<*mut c_void>> {
        self.destination.as_ref()
    }
}

/// Invokes the kernel's entry point for `backend` exactly once.
///
/// The handle for `backend` must have been supplied.
pub(crate) fn launch<K: Kernel>(
    backend: Backend,
    kernel: &K,
    handles: &BackendHandles<'_>,
    desc: &AcceleratorLaunch<'_>,
) -> ComputeResult<()> {
    debug!(kernel = kernel.name(), %backend, window = %desc.window(), "Accelerator launch");
    match backend {
        Backend::OpenCl => {
            let queue = handles.opencl_queue().ok_or(ComputeError::MissingHandle(backend))?;
            kernel.run_opencl(queue, desc)
        }
        Backend::Cuda => {
            let stream = handles.cuda_stream().ok_or(ComputeError::MissingHandle(backend))?;
            kernel.run_cuda(stream, desc)
        }
        Backend::Metal => {
            let queue = handles.metal_queue().ok_or(ComputeError::MissingHandle(backend))?;
            kernel.run_metal(queue, desc)
        }
        Backend::Cpu => Err(ComputeError::Accelerator("CPU is not an accelerator backend".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScaleKernel;
    use rowfx_core::ImageBuf;

    #[test]
    fn test_launch_description() {
        let src = ImageBuf::<u16>::new(Window::new(0, 0, 4, 2), 3).unwrap();
        let mut dst = ImageBuf::<u16>::new(Window::new(0, 0, 4, 2), 3).unwrap();
        let mut dst_view = dst.view_mut();
        let expected_dst = dst_view.as_mut_ptr().cast::<c_void>();
        let sources = [None, Some(src.view())];

        let launch = AcceleratorLaunch::new(Window::new(1, 0, 3, 2), &sources, Some(&mut dst_view));
        assert_eq!(launch.source_count(), 2);
        assert!(launch.source(0).is_none());
        assert!(launch.source(9).is_none());

        let s = launch.source(1).unwrap();
        assert_eq!(s.data, src.view().as_ptr().cast::<c_void>());
        assert_eq!(s.row_stride, 24);
        assert_eq!(s.depth, BitDepth::U16);

        let d = launch.destination().unwrap();
        assert_eq!(d.data, expected_dst);
        assert_eq!(launch.window(), Window::new(1, 0, 3, 2));
    }

    #[test]
    fn test_from_devices_forwards_handles() {
        let mut cl_mem = [0u32; 2];
        let dst = DeviceImage {
            data: cl_mem.as_mut_ptr().cast::<c_void>(),
            bounds: Window::new(0, 0, 640, 480),
            row_stride: -2560,
            components: 4,
            depth: BitDepth::U8,
        };
        let src = DeviceImage {
            data: dst.data.cast_const(),
            bounds: dst.bounds,
            row_stride: dst.row_stride,
            components: dst.components,
            depth: dst.depth,
        };

        let launch = AcceleratorLaunch::from_devices(dst.bounds, vec![Some(src), None], Some(dst));
        assert_eq!(launch.source(0), Some(&src));
        assert!(launch.source(1).is_none());
        assert_eq!(launch.destination(), Some(&dst));
        assert_eq!(cl_mem, [0, 0]);
    }

    #[test]
    fn test_missing_handle() {
        let desc = AcceleratorLaunch::new(Window::new(0, 0, 1, 1), &[], None);
        let err = launch(Backend::Cuda, &ScaleKernel::uniform(2.0), &BackendHandles::new(), &desc)
            .unwrap_err();
        assert_eq!(err, ComputeError::MissingHandle(Backend::Cuda));
    }
}
