//! Sample formats for pixel buffers.
//!
//! # Types
//!
//! - [`BitDepth`] - Runtime description of a buffer's component type
//! - [`Component`] - Trait implemented by the four storable sample types
//!
//! # Value Semantics
//!
//! Components are handled as *raw* values, not normalized ones. An 8-bit
//! sample of 200 converts to `200.0`, and storing `300.0` into it clamps to
//! the depth's ceiling (255). Floating-point depths report a ceiling of
//! `1.0` and are never clamped:
//!
//! ```rust
//! use rowfx_core::{BitDepth, Component};
//!
//! assert_eq!(BitDepth::U16.max_value(), 65535.0);
//! assert_eq!(<u8 as Component>::from_f32(300.0), 255);
//! assert_eq!(<f32 as Component>::from_f32(3.5), 3.5);
//! ```

use half::f16;

/// Component type of a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    /// 8-bit unsigned integer, ceiling 255.
    U8,
    /// 16-bit unsigned integer, ceiling 65535.
    U16,
    /// 16-bit half-precision float.
    F16,
    /// 32-bit single-precision float.
    #[default]
    F32,
}

impl BitDepth {
    /// Bytes per component.
    #[inline]
    pub const fn bytes(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::F16 => 2,
            Self::F32 => 4,
        }
    }

    /// Whether this depth uses floating-point semantics.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F16 | Self::F32)
    }

    /// Clamp ceiling for stored values.
    ///
    /// `1.0` for floating-point depths, which marks "no clamping".
    #[inline]
    pub const fn max_value(&self) -> f32 {
        match self {
            Self::U8 => 255.0,
            Self::U16 => 65535.0,
            Self::F16 | Self::F32 => 1.0,
        }
    }

    /// Short lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::F16 => "f16",
            Self::F32 => "f32",
        }
    }
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Storable component type.
///
/// Implemented for `u8`, `u16`, [`f16`] and `f32`. Kernels do their
/// arithmetic in `f32` and convert back through [`from_f32`](Component::from_f32),
/// which applies the fixed-point clamp for integer depths.
pub trait Component: bytemuck::Pod + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// Runtime depth tag matching this type.
    const DEPTH: BitDepth;

    /// Clamp ceiling (`1.0` for floats).
    const MAX: f32;

    /// Raw value as `f32`.
    fn to_f32(self) -> f32;

    /// Convert from a raw `f32`.
    ///
    /// Integers clamp into `[0, MAX]` and round to nearest; floats store the
    /// value unchanged.
    fn from_f32(v: f32) -> Self;

    /// Zero sample.
    #[inline]
    fn zero() -> Self {
        Self::zeroed()
    }
}

impl Component for u8 {
    const DEPTH: BitDepth = BitDepth::U8;
    const MAX: f32 = 255.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        // NaN falls through `clamp` and saturates to 0 in the cast
        v.clamp(0.0, <Self as Component>::MAX).round() as u8
    }
}

impl Component for u16 {
    const DEPTH: BitDepth = BitDepth::U16;
    const MAX: f32 = 65535.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v.clamp(0.0, <Self as Component>::MAX).round() as u16
    }
}

impl Component for f16 {
    const DEPTH: BitDepth = BitDepth::F16;
    const MAX: f32 = 1.0;

    #[inline]
    fn to_f32(self) -> f32 {
        f16::to_f32(self)
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        f16::from_f32(v)
    }
}

impl Component for f32 {
    const DEPTH: BitDepth = BitDepth::F32;
    const MAX: f32 = 1.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_bytes() {
        assert_eq!(BitDepth::U8.bytes(), 1);
        assert_eq!(BitDepth::U16.bytes(), 2);
        assert_eq!(BitDepth::F16.bytes(), 2);
        assert_eq!(BitDepth::F32.bytes(), 4);
    }

    #[test]
    fn test_max_value() {
        assert_eq!(BitDepth::U8.max_value(), 255.0);
        assert_eq!(BitDepth::F16.max_value(), 1.0);
        assert!(BitDepth::F32.is_float());
        assert!(!BitDepth::U16.is_float());
    }

    #[test]
    fn test_integer_clamp() {
        assert_eq!(<u8 as Component>::from_f32(-4.0), 0);
        assert_eq!(<u8 as Component>::from_f32(127.6), 128);
        assert_eq!(<u16 as Component>::from_f32(70000.0), 65535);
    }

    #[test]
    fn test_integer_clamp_ceiling() {
        assert_eq!(<u8 as Component>::MAX, 255.0);
        assert_eq!(<u8 as Component>::from_f32(300.0), u8::MAX);
        assert_eq!(<u8 as Component>::from_f32(f32::INFINITY), u8::MAX);
        assert_eq!(<u8 as Component>::from_f32(f32::NAN), 0);
        assert_eq!(<u16 as Component>::MAX, 65535.0);
        assert_eq!(<u16 as Component>::from_f32(65535.4), u16::MAX);
    }

    #[test]
    fn test_float_unclamped() {
        assert_eq!(<f32 as Component>::from_f32(-2.0), -2.0);
        assert_eq!(<f16 as Component>::from_f32(2.0).to_f32(), 2.0);
    }

    #[test]
    fn test_depth_tags() {
        assert_eq!(<u8 as Component>::DEPTH, BitDepth::U8);
        assert_eq!(<f16 as Component>::DEPTH, BitDepth::F16);
        assert_eq!(<f32 as Component>::zero(), 0.0);
    }
}
