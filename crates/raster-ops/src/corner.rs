//! Harris corner response.
//!
//! The detector is a chain of copy-producing stages, each usable alone:
//!
//! 1. [`structure_matrix`] - per-pixel `Ix^2`, `Iy^2`, `IxIy` from the Sobel
//!    derivatives, smoothed with a separable Gaussian ([`smooth_image`])
//! 2. [`cornerness_response`] - `det(S) - alpha * trace(S)^2`
//! 3. [`nms_image`] - non-maximum suppression over a square window
//! 4. [`harris_corners`] - thresholded survivors as a list of [`Corner`]s
//!
//! # Example
//!
//! ```rust
//! use raster_core::PixelBuffer;
//! use raster_ops::corner::harris_corners;
//!
//! let mut img = PixelBuffer::new(20, 20, 1).unwrap();
//! for y in 5..15 {
//!     for x in 5..15 {
//!         img.set(x, y, 0, 1.0);
//!     }
//! }
//! let corners = harris_corners(&img, 2.0, 0.1, 3).unwrap();
//! assert_eq!(corners.len(), 4);
//! ```

use crate::convolve::{convolve, ChannelMode};
use crate::filter::{make_1d_gaussian, make_gx_filter, make_gy_filter};
use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};
use raster_core::PixelBuffer;
use tracing::{debug, trace};

/// Weight of the squared trace in the Harris response.
pub const HARRIS_ALPHA: f32 = 0.06;

/// Value written by [`nms_image`] over suppressed samples.
pub const SUPPRESSED: f32 = f32::NEG_INFINITY;

/// A detected corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
    /// Cornerness at `(x, y)`
    pub response: f32,
}

/// Gaussian blur applied as a row pass followed by a column pass.
///
/// Equivalent to convolving with [`crate::filter::make_gaussian_filter`]
/// (edge replication makes the two passes exact), at `O(2k)` instead of
/// `O(k^2)` taps per sample. Channels are preserved.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimension`] if `sigma` is not a finite
/// positive number.
pub fn smooth_image(image: &PixelBuffer, sigma: f32) -> OpsResult<PixelBuffer> {
    trace!(shape = ?image.shape(), sigma, "smooth_image");
    let row = make_1d_gaussian(sigma)?;
    let column = PixelBuffer::from_data(1, row.width(), 1, row.data().to_vec())?;

    let horizontal = convolve(image, &row, ChannelMode::Preserve)?;
    convolve(&horizontal, &column, ChannelMode::Preserve)
}

/// Builds the smoothed structure matrix of `image`.
///
/// The derivatives are taken with channels collapsed, so the result always
/// has three channels: `Ix^2`, `Iy^2` and `Ix * Iy`, each blurred with a
/// Gaussian of the given `sigma`.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimension`] for an invalid `sigma`.
pub fn structure_matrix(image: &PixelBuffer, sigma: f32) -> OpsResult<PixelBuffer> {
    trace!(shape = ?image.shape(), sigma, "structure_matrix");
    let ix = convolve(image, &make_gx_filter(), ChannelMode::Collapse)?;
    let iy = convolve(image, &make_gy_filter(), ChannelMode::Collapse)?;

    let (width, height) = ix.dimensions();
    let mut products = PixelBuffer::new(width, height, 3)?;
    let derivatives = ix.data().iter().zip(iy.data());
    for (px, (&dx, &dy)) in products.data_mut().chunks_exact_mut(3).zip(derivatives) {
        px[0] = dx * dx;
        px[1] = dy * dy;
        px[2] = dx * dy;
    }

    smooth_image(&products, sigma)
}

/// Computes `det(S) - HARRIS_ALPHA * trace(S)^2` per pixel.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimension`] unless `structure` has exactly
/// three channels, laid out as produced by [`structure_matrix`].
///
/// # Example
///
/// ```rust
/// use raster_core::PixelBuffer;
/// use raster_ops::corner::cornerness_response;
///
/// let s = PixelBuffer::from_data(1, 1, 3, vec![2.0, 3.0, 1.0]).unwrap();
/// let r = cornerness_response(&s).unwrap();
/// assert!((r.get(0, 0, 0) - 3.5).abs() < 1e-6);
/// ```
pub fn cornerness_response(structure: &PixelBuffer) -> OpsResult<PixelBuffer> {
    if structure.channels() != 3 {
        return Err(OpsError::InvalidDimension(format!(
            "structure matrix must have 3 channels, got {}",
            structure.channels()
        )));
    }

    let (width, height) = structure.dimensions();
    let mut response = PixelBuffer::new(width, height, 1)?;
    for (r, s) in response
        .data_mut()
        .iter_mut()
        .zip(structure.data().chunks_exact(3))
    {
        let det = s[0] * s[1] - s[2] * s[2];
        let trace = s[0] + s[1];
        *r = det - HARRIS_ALPHA * trace * trace;
    }
    Ok(response)
}

/// Non-maximum suppression over a `(2 * window + 1)` square.
///
/// Returns a copy of `image` where every sample that has a larger
/// neighbour in its window (reads replicate the edge) is replaced by
/// [`SUPPRESSED`]. Equal neighbours are broken in raster order: a sample is
/// also suppressed by an equal neighbour that comes before it, so a flat
/// plateau keeps its first sample. Channels are processed independently.
pub fn nms_image(image: &PixelBuffer, window: usize) -> OpsResult<PixelBuffer> {
    let (width, height, channels) = image.shape();
    trace!(width, height, channels, window, "nms_image");
    let radius = isize::try_from(window).map_err(|_| {
        OpsError::InvalidDimension(format!("nms window {} too large", window))
    })?;

    let mut out = image.zeros_like();
    let row_len = out.row_len();
    for_each_row(out.data_mut(), row_len, |y, row| {
        for x in 0..width {
            for c in 0..channels {
                let v = image.get(x, y, c);
                let beaten = (-radius..=radius).any(|dy| {
                    let ny = (y as isize + dy).clamp(0, height as isize - 1) as usize;
                    (-radius..=radius).any(|dx| {
                        let nx = (x as isize + dx).clamp(0, width as isize - 1) as usize;
                        let n = image.get(nx, ny, c);
                        n > v || (n == v && (ny, nx) < (y, x))
                    })
                });
                row[x * channels + c] = if beaten { SUPPRESSED } else { v };
            }
        }
    });
    Ok(out)
}

/// Runs the full detector and returns the corners whose suppressed
/// response exceeds `threshold`, in raster order.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimension`] for an invalid `sigma` or
/// `window`.
pub fn harris_corners(
    image: &PixelBuffer,
    sigma: f32,
    threshold: f32,
    window: usize,
) -> OpsResult<Vec<Corner>> {
    let structure = structure_matrix(image, sigma)?;
    let response = cornerness_response(&structure)?;
    let peaks = nms_image(&response, window)?;

    let width = peaks.width();
    let corners: Vec<Corner> = peaks
        .data()
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r > threshold)
        .map(|(i, &response)| Corner {
            x: i % width,
            y: i / width,
            response,
        })
        .collect();
    debug!(count = corners.len(), sigma, threshold, window, "harris corners");
    Ok(corners)
}
