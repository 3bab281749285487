//! Error types for rowfx-core.
//!
//! Errors here are raised while *describing* pixel storage: building a
//! buffer view over caller-owned memory. Once a view exists, every address
//! computation is infallible and reports missing data through `Option`.
//!
//! # Usage
//!
//! ```rust
//! use rowfx_core::{BitDepth, Error, ImageRef, Window};
//!
//! let data = [0u8; 12];
//! let err = ImageRef::new(&data, Window::new(0, 0, 4, 1), 4, BitDepth::U8, 16).unwrap_err();
//! assert!(matches!(err, Error::BufferTooSmall { .. }));
//! ```

use thiserror::Error;

use crate::format::BitDepth;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while describing pixel buffers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Component count outside the supported `1..=4` range.
    #[error("unsupported component count {0}, expected 1..=4")]
    InvalidComponents(usize),

    /// A row stride cannot hold one scanline of the buffer bounds.
    ///
    /// The absolute stride must be at least `width * components * bytes`.
    #[error("row stride {stride} too small for {row_bytes}-byte scanlines")]
    StrideTooSmall {
        /// Stride as supplied (sign = orientation)
        stride: isize,
        /// Minimum bytes per scanline
        row_bytes: usize,
    },

    /// A row stride that is not a multiple of the component size.
    #[error("row stride {stride} is not a multiple of the {depth:?} component size")]
    UnalignedStride {
        /// Stride as supplied
        stride: isize,
        /// Buffer depth
        depth: BitDepth,
    },

    /// The backing storage is shorter than the bounds require.
    #[error("buffer holds {actual} bytes, bounds require {required}")]
    BufferTooSmall {
        /// Bytes required by bounds and stride
        required: usize,
        /// Bytes available
        actual: usize,
    },

    /// The backing storage start is not aligned for the component type.
    #[error("buffer is not aligned for {depth:?} components")]
    Misaligned {
        /// Buffer depth
        depth: BitDepth,
    },

    /// Sample count does not match bounds and component count.
    #[error("expected {expected} samples, got {actual}")]
    SampleCountMismatch {
        /// Samples required
        expected: usize,
        /// Samples supplied
        actual: usize,
    },
}
