//! Elementwise image arithmetic and range handling.
//!
//! [`add`], [`subtract`], [`shift`] and [`feature_normalize`] return new
//! buffers. [`clamp_image`] is the one operation in this crate that mutates
//! its argument in place.
//!
//! None of the arithmetic clamps: differences and sums may leave `[0, 1]`.
//!
//! # Frequency decomposition
//!
//! ```rust
//! use raster_core::PixelBuffer;
//! use raster_ops::arith::{merge_frequencies, split_frequencies};
//!
//! let data = (0..64).map(|i| (i % 5) as f32 / 4.0).collect();
//! let img = PixelBuffer::from_data(8, 8, 1, data).unwrap();
//! let (low, high) = split_frequencies(&img, 1.5).unwrap();
//! let back = merge_frequencies(&low, &high).unwrap();
//! for (a, b) in back.data().iter().zip(img.data()) {
//!     assert!((a - b).abs() < 1e-6);
//! }
//! ```

use crate::convolve::{convolve, ChannelMode};
use crate::filter::make_gaussian_filter;
use crate::{OpsError, OpsResult};
use raster_core::PixelBuffer;
use tracing::trace;

fn ensure_same_shape(a: &PixelBuffer, b: &PixelBuffer) -> OpsResult<()> {
    if !a.same_shape(b) {
        return Err(OpsError::ShapeMismatch {
            left: a.shape(),
            right: b.shape(),
        });
    }
    Ok(())
}

fn zip_with(
    a: &PixelBuffer,
    b: &PixelBuffer,
    op: impl Fn(f32, f32) -> f32,
) -> OpsResult<PixelBuffer> {
    ensure_same_shape(a, b)?;
    let mut out = a.clone();
    for (o, &v) in out.data_mut().iter_mut().zip(b.data()) {
        *o = op(*o, v);
    }
    Ok(out)
}

/// Elementwise `a + b`.
///
/// # Errors
///
/// Returns [`OpsError::ShapeMismatch`] if the buffers differ in width,
/// height or channel count.
pub fn add(a: &PixelBuffer, b: &PixelBuffer) -> OpsResult<PixelBuffer> {
    trace!(a = ?a.shape(), b = ?b.shape(), "add");
    zip_with(a, b, |x, y| x + y)
}

/// Elementwise `a - b`.
///
/// # Errors
///
/// Returns [`OpsError::ShapeMismatch`] if the buffers differ in width,
/// height or channel count.
pub fn subtract(a: &PixelBuffer, b: &PixelBuffer) -> OpsResult<PixelBuffer> {
    trace!(a = ?a.shape(), b = ?b.shape(), "subtract");
    zip_with(a, b, |x, y| x - y)
}

/// Clamps every sample of `image` to `[0.0, 1.0]`, in place.
///
/// Samples already in range are left untouched. NaN samples become `0.0`.
///
/// # Example
///
/// ```rust
/// use raster_core::PixelBuffer;
/// use raster_ops::arith::clamp_image;
///
/// let mut img = PixelBuffer::from_data(3, 1, 1, vec![-0.5, 0.25, 1.5]).unwrap();
/// clamp_image(&mut img);
/// assert_eq!(img.data(), &[0.0, 0.25, 1.0]);
/// ```
pub fn clamp_image(image: &mut PixelBuffer) {
    trace!(shape = ?image.shape(), "clamp_image");
    for v in image.data_mut() {
        *v = if v.is_nan() { 0.0 } else { (*v).clamp(0.0, 1.0) };
    }
}

/// Returns a copy of `image` with `delta` added to channel `channel`.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimension`] if `channel` is out of range.
pub fn shift(image: &PixelBuffer, channel: usize, delta: f32) -> OpsResult<PixelBuffer> {
    if channel >= image.channels() {
        return Err(OpsError::InvalidDimension(format!(
            "channel {} out of range for {} channels",
            channel,
            image.channels()
        )));
    }
    let channels = image.channels();
    let mut out = image.clone();
    for px in out.data_mut().chunks_exact_mut(channels) {
        px[channel] += delta;
    }
    Ok(out)
}

/// Returns a copy of `image` rescaled so its samples span `[0, 1]`.
///
/// The minimum maps to 0 and the maximum to 1 across all channels. A flat
/// image maps to all zeros.
pub fn feature_normalize(image: &PixelBuffer) -> PixelBuffer {
    let (min, max) = image
        .data()
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    let mut out = image.zeros_like();
    if range > 0.0 {
        for (o, &v) in out.data_mut().iter_mut().zip(image.data()) {
            *o = (v - min) / range;
        }
    }
    out
}

/// Splits `image` into Gaussian low-pass and residual high-pass components.
///
/// `low + high` reconstructs `image` up to floating-point rounding.
pub fn split_frequencies(image: &PixelBuffer, sigma: f32) -> OpsResult<(PixelBuffer, PixelBuffer)> {
    let kernel = make_gaussian_filter(sigma)?;
    let low = convolve(image, &kernel, ChannelMode::Preserve)?;
    let high = subtract(image, &low)?;
    Ok((low, high))
}

/// Recombines components produced by [`split_frequencies`].
pub fn merge_frequencies(low: &PixelBuffer, high: &PixelBuffer) -> OpsResult<PixelBuffer> {
    add(low, high)
}
