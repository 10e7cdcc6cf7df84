//! Image resize and resampling operations.
//!
//! Both resamplers use the centered-pixel mapping from destination to source:
//!
//! ```text
//! xs = (xd + 0.5) * (src_w / dst_w) - 0.5
//! ys = (yd + 0.5) * (src_h / dst_h) - 0.5
//! ```
//!
//! so pixel centers line up and a scale factor of 1 maps every pixel onto
//! itself.
//!
//! # Filters
//!
//! - [`Interpolation::Nearest`] - Rounds to the nearest source pixel
//!   (half away from zero), then clamps into range
//! - [`Interpolation::Bilinear`] - Blends the four surrounding pixels; each
//!   neighbour is clamped into range on its own, which replicates edges
//!   without distorting the weights
//!
//! # Example
//!
//! ```rust
//! use raster_core::PixelBuffer;
//! use raster_ops::resize::{resize, Interpolation};
//!
//! let src = PixelBuffer::filled(16, 16, 3, 0.5).unwrap();
//! let dst = resize(&src, 64, 48, Interpolation::Bilinear).unwrap();
//! assert_eq!(dst.shape(), (64, 48, 3));
//! ```

use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};
use raster_core::PixelBuffer;
use tracing::trace;

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Nearest-neighbor (fastest, blocky).
    Nearest,
    /// Bilinear interpolation (smooth).
    #[default]
    Bilinear,
}

/// Source coordinate of destination index `d` along an axis.
#[inline]
fn source_coord(d: usize, scale: f32) -> f32 {
    (d as f32 + 0.5) * scale - 0.5
}

#[inline]
fn clamp_axis(v: isize, len: usize) -> usize {
    v.clamp(0, len as isize - 1) as usize
}

/// Pair of clamped neighbours and the weight of the upper one.
#[derive(Debug, Clone, Copy)]
struct Tap {
    lo: usize,
    hi: usize,
    frac: f32,
}

impl Tap {
    #[inline]
    fn bilinear(coord: f32, len: usize) -> Self {
        let base = coord.floor();
        let i0 = base as isize;
        Self {
            lo: clamp_axis(i0, len),
            hi: clamp_axis(i0 + 1, len),
            frac: coord - base,
        }
    }

    #[inline]
    fn nearest(coord: f32, len: usize) -> usize {
        clamp_axis(coord.round() as isize, len)
    }
}

#[inline]
fn blend(p00: f32, p10: f32, p01: f32, p11: f32, dx: f32, dy: f32) -> f32 {
    let top = p00 * (1.0 - dx) + p10 * dx;
    let bottom = p01 * (1.0 - dx) + p11 * dx;
    top * (1.0 - dy) + bottom * dy
}

/// Samples channel `c` at the nearest pixel to the continuous point `(x, y)`.
///
/// Ties round away from zero; the rounded coordinate is clamped into range.
///
/// # Example
///
/// ```rust
/// use raster_core::PixelBuffer;
/// use raster_ops::resize::nn_interpolate;
///
/// let img = PixelBuffer::from_data(2, 1, 1, vec![0.0, 1.0]).unwrap();
/// assert_eq!(nn_interpolate(&img, 0.5, 0.0, 0), 1.0);
/// assert_eq!(nn_interpolate(&img, -3.0, 0.0, 0), 0.0);
/// ```
pub fn nn_interpolate(image: &PixelBuffer, x: f32, y: f32, c: usize) -> f32 {
    let sx = Tap::nearest(x, image.width());
    let sy = Tap::nearest(y, image.height());
    image.get(sx, sy, c)
}

/// Bilinearly samples channel `c` at the continuous point `(x, y)`.
///
/// # Example
///
/// ```rust
/// use raster_core::PixelBuffer;
/// use raster_ops::resize::bilinear_interpolate;
///
/// let img = PixelBuffer::from_data(2, 1, 1, vec![0.0, 1.0]).unwrap();
/// assert_eq!(bilinear_interpolate(&img, 0.25, 0.0, 0), 0.25);
/// ```
pub fn bilinear_interpolate(image: &PixelBuffer, x: f32, y: f32, c: usize) -> f32 {
    let tx = Tap::bilinear(x, image.width());
    let ty = Tap::bilinear(y, image.height());
    blend(
        image.get(tx.lo, ty.lo, c),
        image.get(tx.hi, ty.lo, c),
        image.get(tx.lo, ty.hi, c),
        image.get(tx.hi, ty.hi, c),
        tx.frac,
        ty.frac,
    )
}

fn validate_target(width: usize, height: usize) -> OpsResult<()> {
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidDimension(format!(
            "destination size must be > 0, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

/// Resizes an image using the given interpolation.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimension`] if `width` or `height` is zero.
pub fn resize(
    image: &PixelBuffer,
    width: usize,
    height: usize,
    filter: Interpolation,
) -> OpsResult<PixelBuffer> {
    match filter {
        Interpolation::Nearest => nn_resize(image, width, height),
        Interpolation::Bilinear => bilinear_resize(image, width, height),
    }
}

/// Nearest-neighbor resize.
///
/// # Example
///
/// ```rust
/// use raster_core::PixelBuffer;
/// use raster_ops::resize::nn_resize;
///
/// let src = PixelBuffer::from_data(2, 1, 1, vec![0.0, 1.0]).unwrap();
/// let dst = nn_resize(&src, 4, 1).unwrap();
/// assert_eq!(dst.data(), &[0.0, 0.0, 1.0, 1.0]);
/// ```
pub fn nn_resize(image: &PixelBuffer, width: usize, height: usize) -> OpsResult<PixelBuffer> {
    trace!(src_w = image.width(), src_h = image.height(), width, height, "nn_resize");
    validate_target(width, height)?;

    let channels = image.channels();
    let sx_scale = image.width() as f32 / width as f32;
    let sy_scale = image.height() as f32 / height as f32;

    let cols: Vec<usize> = (0..width)
        .map(|x| Tap::nearest(source_coord(x, sx_scale), image.width()))
        .collect();

    let mut dst = PixelBuffer::new(width, height, channels)?;
    let row_len = dst.row_len();
    for_each_row(dst.data_mut(), row_len, |y, row| {
        let sy = Tap::nearest(source_coord(y, sy_scale), image.height());
        let src_row = image.row(sy);
        for (x, &sx) in cols.iter().enumerate() {
            let src_px = &src_row[sx * channels..(sx + 1) * channels];
            row[x * channels..(x + 1) * channels].copy_from_slice(src_px);
        }
    });

    Ok(dst)
}

/// Bilinear resize.
///
/// # Example
///
/// ```rust
/// use raster_core::PixelBuffer;
/// use raster_ops::resize::bilinear_resize;
///
/// let src = PixelBuffer::filled(4, 4, 4, 0.5).unwrap();
/// let dst = bilinear_resize(&src, 8, 8).unwrap();
/// assert!(dst.data().iter().all(|v| (v - 0.5).abs() < 1e-6));
/// ```
pub fn bilinear_resize(image: &PixelBuffer, width: usize, height: usize) -> OpsResult<PixelBuffer> {
    trace!(src_w = image.width(), src_h = image.height(), width, height, "bilinear_resize");
    validate_target(width, height)?;

    let channels = image.channels();
    let sx_scale = image.width() as f32 / width as f32;
    let sy_scale = image.height() as f32 / height as f32;

    let cols: Vec<Tap> = (0..width)
        .map(|x| Tap::bilinear(source_coord(x, sx_scale), image.width()))
        .collect();

    let mut dst = PixelBuffer::new(width, height, channels)?;
    let row_len = dst.row_len();
    for_each_row(dst.data_mut(), row_len, |y, row| {
        let ty = Tap::bilinear(source_coord(y, sy_scale), image.height());
        let top = image.row(ty.lo);
        let bottom = image.row(ty.hi);
        for (x, tx) in cols.iter().enumerate() {
            let (lo, hi) = (tx.lo * channels, tx.hi * channels);
            for c in 0..channels {
                row[x * channels + c] = blend(
                    top[lo + c],
                    top[hi + c],
                    bottom[lo + c],
                    bottom[hi + c],
                    tx.frac,
                    ty.frac,
                );
            }
        }
    });

    Ok(dst)
}
