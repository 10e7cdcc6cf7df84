//! Error types for raster-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of buffer construction and
//! checked sample access:
//! - Zero or overflowing buffer extents
//! - Sample stores whose length disagrees with the declared shape
//! - Out-of-range coordinates on checked accessors
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Error, PixelBuffer};
//!
//! let err = PixelBuffer::new(0, 4, 1).unwrap_err();
//! assert!(matches!(err, Error::InvalidDimensions { .. }));
//! ```
//!
//! # Used By
//!
//! - [`crate::image::PixelBuffer`] - Construction and checked access
//! - `raster-ops` - Wrapped into `OpsError::Core`

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or reading a [`PixelBuffer`](crate::PixelBuffer).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Width, height or channel count is zero, or the sample count overflows.
    #[error("invalid dimensions: {width}x{height}x{channels} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Requested channel count
        channels: usize,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Sample store length does not match `width * height * channels`.
    #[error("sample store holds {got} values, shape requires {expected}")]
    DataLength {
        /// Required number of samples
        expected: usize,
        /// Number of samples provided
        got: usize,
    },

    /// Sample coordinate lies outside the buffer.
    #[error("sample ({x}, {y}, {c}) out of bounds for buffer {width}x{height}x{channels}")]
    OutOfBounds {
        /// X coordinate
        x: usize,
        /// Y coordinate
        y: usize,
        /// Channel index
        c: usize,
        /// Buffer width
        width: usize,
        /// Buffer height
        height: usize,
        /// Buffer channel count
        channels: usize,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(
        width: usize,
        height: usize,
        channels: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            channels,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DataLength`] error.
    #[inline]
    pub fn data_length(expected: usize, got: usize) -> Self {
        Self::DataLength { expected, got }
    }

    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: usize, y: usize, c: usize, shape: (usize, usize, usize)) -> Self {
        Self::OutOfBounds {
            x,
            y,
            c,
            width: shape.0,
            height: shape.1,
            channels: shape.2,
        }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }
}
