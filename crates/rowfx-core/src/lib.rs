//! # rowfx-core
//!
//! Core types for the rowfx per-frame render engine.
//!
//! - [`Window`] - Half-open pixel rectangle (buffer bounds, processing window)
//! - [`ImageRef`], [`ImageMut`] - Validated views over host-owned scanlines
//! - [`ImageBuf`] - Owned packed image
//! - [`BitDepth`], [`Component`] - Sample formats and their clamp semantics
//!
//! ## Crate Structure
//!
//! ```text
//! rowfx-core (this crate)
//!    ^
//!    |
//!    +-- rowfx-compute (partitioning, dispatch, kernels, jobs)
//!    +-- rowfx-bench
//! ```
//!
//! ## Addressing Contract
//!
//! Views are validated once at construction. After that every lookup is
//! infallible and returns `None` for coordinates outside the buffer bounds,
//! so kernels can treat a missing pixel as "no data" without error paths.
//!
//! ```rust
//! use rowfx_core::prelude::*;
//!
//! let img = ImageBuf::<f32>::filled(Window::new(0, 0, 8, 8), 4, &[0.5; 4]).unwrap();
//! let view = img.view();
//!
//! assert!(view.pixel::<f32>(7, 7).is_some());
//! assert!(view.pixel::<f32>(8, 7).is_none());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod format;
pub mod image;
pub mod rect;

// Re-exports for convenience
pub use buffer::{ImageMut, ImageRef, Layout, RowSpan, SourceRow};
pub use error::{Error, Result};
pub use format::{BitDepth, Component};
pub use half::f16;
pub use image::ImageBuf;
pub use rect::Window;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::buffer::{ImageMut, ImageRef, RowSpan, SourceRow};
    pub use crate::error::{Error, Result};
    pub use crate::format::{BitDepth, Component};
    pub use crate::image::ImageBuf;
    pub use crate::rect::Window;
}
