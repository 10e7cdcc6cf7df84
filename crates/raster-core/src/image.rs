//! Pixel buffer type for raster kernels.
//!
//! This module provides [`PixelBuffer`], a dense `width x height x channels`
//! grid of `f32` samples. Every component of the workspace addresses samples
//! through the same [`PixelBuffer::index`] formula.
//!
//! # Memory Layout
//!
//! Samples are stored **interleaved**, in row-major order, top-to-bottom:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//!         ...
//! ```
//!
//! so `index(x, y, c) = (y * width + x) * channels + c`.
//!
//! # Sample Range
//!
//! Samples are nominally in `[0.0, 1.0]` but nothing here enforces it.
//! High-pass responses and frequency residuals legitimately go negative.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::PixelBuffer;
//!
//! let mut img = PixelBuffer::new(4, 3, 3).unwrap();
//! img.set(1, 2, 0, 0.75);
//! assert_eq!(img.get(1, 2, 0), 0.75);
//!
//! // Out-of-range reads replicate the nearest edge sample.
//! assert_eq!(img.get_clamped(-5, 9, 0), img.get(0, 2, 0));
//! ```
//!
//! # Ownership
//!
//! A buffer owns its samples outright; [`Clone`] produces a fully independent
//! copy. There is no shared storage between buffers.

use crate::{Error, Result};

/// Dense, owned grid of floating-point samples.
///
/// # Example
///
/// ```rust
/// use raster_core::PixelBuffer;
///
/// let gray = PixelBuffer::filled(8, 8, 1, 0.5).unwrap();
/// assert_eq!(gray.dimensions(), (8, 8));
/// assert!(gray.data().iter().all(|&v| v == 0.5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    data: Vec<f32>,
    width: usize,
    height: usize,
    channels: usize,
}

/// Validates a shape and returns its sample count.
fn sample_count(width: usize, height: usize, channels: usize) -> Result<usize> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(Error::invalid_dimensions(
            width,
            height,
            channels,
            "width, height, and channels must be > 0",
        ));
    }
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| Error::invalid_dimensions(width, height, channels, "sample count overflow"))
}

/// Clamps a signed coordinate into `[0, len)`.
#[inline]
fn clamp_axis(v: isize, len: usize) -> usize {
    if v < 0 {
        0
    } else {
        (v as usize).min(len - 1)
    }
}

impl PixelBuffer {
    /// Creates a buffer with every sample set to `0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if any extent is zero or the
    /// sample count overflows `usize`.
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        Self::filled(width, height, channels, 0.0)
    }

    /// Creates a buffer with every sample set to `value`.
    pub fn filled(width: usize, height: usize, channels: usize, value: f32) -> Result<Self> {
        let len = sample_count(width, height, channels)?;
        Ok(Self {
            data: vec![value; len],
            width,
            height,
            channels,
        })
    }

    /// Wraps an existing interleaved sample store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLength`] if `data.len()` is not
    /// `width * height * channels`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raster_core::PixelBuffer;
    ///
    /// let img = PixelBuffer::from_data(2, 1, 3, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
    /// assert_eq!(img.get(1, 0, 1), 1.0);
    /// assert!(PixelBuffer::from_data(2, 2, 1, vec![0.0; 3]).is_err());
    /// ```
    pub fn from_data(width: usize, height: usize, channels: usize, data: Vec<f32>) -> Result<Self> {
        let expected = sample_count(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::data_length(expected, data.len()));
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Builds a single-channel buffer from fixed rows.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raster_core::PixelBuffer;
    ///
    /// let k = PixelBuffer::from_rows([[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]]);
    /// assert_eq!(k.shape(), (2, 3, 1));
    /// assert_eq!(k.get(1, 2, 0), 5.0);
    /// ```
    pub fn from_rows<const W: usize, const H: usize>(rows: [[f32; W]; H]) -> Self {
        const { assert!(W > 0 && H > 0, "rows must be non-empty") };
        Self {
            data: rows.iter().flatten().copied().collect(),
            width: W,
            height: H,
            channels: 1,
        }
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of channels per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns `(width, height, channels)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.channels)
    }

    /// Returns `true` if both buffers have identical width, height and channels.
    #[inline]
    pub fn same_shape(&self, other: &PixelBuffer) -> bool {
        self.shape() == other.shape()
    }

    /// Returns the total number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: a constructed buffer has at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of samples in one row (`width * channels`).
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw interleaved samples.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the buffer and returns its sample store.
    #[inline]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Returns the storage offset of sample `(x, y, c)`.
    ///
    /// This is the single addressing formula shared by every operation.
    #[inline]
    pub fn index(&self, x: usize, y: usize, c: usize) -> usize {
        (y * self.width + x) * self.channels + c
    }

    /// Returns the sample at `(x, y, c)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> f32 {
        debug_assert!(
            x < self.width && y < self.height && c < self.channels,
            "sample out of bounds"
        );
        self.data[self.index(x, y, c)]
    }

    /// Returns the sample at `(x, y, c)`, or [`Error::OutOfBounds`].
    pub fn get_checked(&self, x: usize, y: usize, c: usize) -> Result<f32> {
        if x < self.width && y < self.height && c < self.channels {
            Ok(self.data[self.index(x, y, c)])
        } else {
            Err(Error::out_of_bounds(x, y, c, self.shape()))
        }
    }

    /// Sets the sample at `(x, y, c)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, c: usize, value: f32) {
        debug_assert!(
            x < self.width && y < self.height && c < self.channels,
            "sample out of bounds"
        );
        let idx = self.index(x, y, c);
        self.data[idx] = value;
    }

    /// Returns the sample at `(x, y, c)` with `x` and `y` clamped into range.
    ///
    /// This is edge replication: coordinates past a border read the
    /// nearest border pixel. `c` is not clamped.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize, c: usize) -> f32 {
        let cx = clamp_axis(x, self.width);
        let cy = clamp_axis(y, self.height);
        self.get(cx, cy, c)
    }

    /// Sets the sample at the clamped coordinate.
    #[inline]
    pub fn set_clamped(&mut self, x: isize, y: isize, c: usize, value: f32) {
        let cx = clamp_axis(x, self.width);
        let cy = clamp_axis(y, self.height);
        self.set(cx, cy, c, value);
    }

    /// Returns row `y` as an interleaved slice.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.row_len();
        &self.data[start..start + self.row_len()]
    }

    /// Allocates a zeroed buffer with this buffer's shape.
    pub fn zeros_like(&self) -> Self {
        Self {
            data: vec![0.0; self.data.len()],
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }

    /// Sum of all samples, accumulated in `f64`.
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }
}
