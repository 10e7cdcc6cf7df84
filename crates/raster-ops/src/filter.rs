//! Convolution kernel construction.
//!
//! Every constructor returns a freshly allocated single-channel
//! [`PixelBuffer`] used as a kernel by [`crate::convolve`]. Nothing is cached.
//!
//! # Kernels
//!
//! - [`make_box_filter`] - Simple average, normalized
//! - [`make_gaussian_filter`] - Gaussian, normalized
//! - [`make_1d_gaussian`] - One row of the Gaussian, for separable blurs
//! - [`make_highpass_filter`] - Laplacian contrast detector (sums to 0)
//! - [`make_sharpen_filter`] - Identity plus high-pass (sums to 1)
//! - [`make_emboss_filter`] - Directional relief
//! - [`make_gx_filter`], [`make_gy_filter`] - Sobel derivatives
//!
//! # Example
//!
//! ```rust
//! use raster_ops::filter::make_gaussian_filter;
//!
//! let k = make_gaussian_filter(1.0).unwrap();
//! assert_eq!(k.dimensions(), (7, 7));
//! assert!((k.sum() - 1.0).abs() < 1e-5);
//! ```

use crate::{OpsError, OpsResult};
use raster_core::PixelBuffer;
use tracing::debug;

/// Returns a copy of `filter` scaled so its samples sum to 1.
///
/// A filter whose samples sum to zero is returned unchanged.
///
/// # Example
///
/// ```rust
/// use raster_core::PixelBuffer;
/// use raster_ops::filter::l1_normalize;
///
/// let k = PixelBuffer::filled(2, 2, 1, 3.0).unwrap();
/// assert!(l1_normalize(&k).data().iter().all(|&v| v == 0.25));
/// ```
pub fn l1_normalize(filter: &PixelBuffer) -> PixelBuffer {
    let sum = filter.sum();
    let mut out = filter.clone();
    if sum == 0.0 {
        return out;
    }
    for v in out.data_mut() {
        *v = (*v as f64 / sum) as f32;
    }
    out
}

/// Creates a `size x size` box (mean) filter.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimension`] unless `size` is a positive odd
/// number.
///
/// # Example
///
/// ```rust
/// use raster_ops::filter::make_box_filter;
///
/// let k = make_box_filter(3).unwrap();
/// assert!(k.data().iter().all(|&v| v == 1.0 / 9.0));
/// assert!(make_box_filter(4).is_err());
/// ```
pub fn make_box_filter(size: usize) -> OpsResult<PixelBuffer> {
    if size == 0 || size % 2 == 0 {
        return Err(OpsError::InvalidDimension(format!(
            "box filter size must be a positive odd number, got {}",
            size
        )));
    }
    let weight = 1.0 / (size * size) as f32;
    Ok(PixelBuffer::filled(size, size, 1, weight)?)
}

/// Validates `sigma` and returns the Gaussian kernel side,
/// `2 * ceil(3 * sigma) + 1`.
fn gaussian_size(sigma: f32) -> OpsResult<usize> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(OpsError::InvalidDimension(format!(
            "gaussian sigma must be > 0, got {}",
            sigma
        )));
    }
    ((sigma * 3.0).ceil() as usize)
        .checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .ok_or_else(|| OpsError::InvalidDimension(format!("gaussian sigma {} too large", sigma)))
}

/// Unnormalized Gaussian weight at squared distance `d2`.
#[inline]
fn gaussian_weight(d2: isize, sigma: f32) -> f32 {
    let denom = 2.0 * sigma as f64 * sigma as f64;
    (-(d2 as f64) / denom).exp() as f32
}

/// Creates a normalized Gaussian filter.
///
/// The kernel is `2 * ceil(3 * sigma) + 1` samples on a side, which keeps
/// it odd and covers three standard deviations each way.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimension`] if `sigma` is not a finite
/// positive number, or if the kernel would not fit in memory.
pub fn make_gaussian_filter(sigma: f32) -> OpsResult<PixelBuffer> {
    let size = gaussian_size(sigma)?;
    if size.checked_mul(size).is_none() {
        return Err(OpsError::InvalidDimension(format!(
            "gaussian sigma {} too large: {}x{} kernel",
            sigma, size, size
        )));
    }
    debug!(sigma, size, "gaussian kernel");

    let half = (size / 2) as isize;
    let mut kernel = PixelBuffer::new(size, size, 1)?;

    for y in 0..size {
        for x in 0..size {
            let i = x as isize - half;
            let j = y as isize - half;
            kernel.set(x, y, 0, gaussian_weight(i * i + j * j, sigma));
        }
    }

    Ok(l1_normalize(&kernel))
}

/// Creates a normalized one-row Gaussian filter, `size x 1`.
///
/// Uses the same side length as [`make_gaussian_filter`], so convolving
/// with this row and then with its transpose reproduces the 2D kernel.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimension`] if `sigma` is not a finite
/// positive number.
///
/// # Example
///
/// ```rust
/// use raster_ops::filter::make_1d_gaussian;
///
/// let row = make_1d_gaussian(1.0).unwrap();
/// assert_eq!(row.shape(), (7, 1, 1));
/// ```
pub fn make_1d_gaussian(sigma: f32) -> OpsResult<PixelBuffer> {
    let size = gaussian_size(sigma)?;
    debug!(sigma, size, "gaussian row kernel");

    let half = (size / 2) as isize;
    let mut kernel = PixelBuffer::new(size, 1, 1)?;
    for x in 0..size {
        let i = x as isize - half;
        kernel.set(x, 0, 0, gaussian_weight(i * i, sigma));
    }

    Ok(l1_normalize(&kernel))
}

/// Creates the 3x3 high-pass (Laplacian) filter.
///
/// Not normalized: it measures local contrast and sums to zero.
pub fn make_highpass_filter() -> PixelBuffer {
    PixelBuffer::from_rows([
        [0.0, -1.0, 0.0],
        [-1.0, 4.0, -1.0],
        [0.0, -1.0, 0.0],
    ])
}

/// Creates the 3x3 sharpen filter (identity plus high-pass).
pub fn make_sharpen_filter() -> PixelBuffer {
    PixelBuffer::from_rows([
        [0.0, -1.0, 0.0],
        [-1.0, 5.0, -1.0],
        [0.0, -1.0, 0.0],
    ])
}

/// Creates the 3x3 emboss filter.
pub fn make_emboss_filter() -> PixelBuffer {
    PixelBuffer::from_rows([
        [-2.0, -1.0, 0.0],
        [-1.0, 1.0, 1.0],
        [0.0, 1.0, 2.0],
    ])
}

/// Creates the 3x3 Sobel filter for the horizontal derivative.
pub fn make_gx_filter() -> PixelBuffer {
    PixelBuffer::from_rows([
        [-1.0, 0.0, 1.0],
        [-2.0, 0.0, 2.0],
        [-1.0, 0.0, 1.0],
    ])
}

/// Creates the 3x3 Sobel filter for the vertical derivative.
pub fn make_gy_filter() -> PixelBuffer {
    PixelBuffer::from_rows([
        [-1.0, -2.0, -1.0],
        [0.0, 0.0, 0.0],
        [1.0, 2.0, 1.0],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_box_filter() {
        for size in [1, 3, 7, 11] {
            let k = make_box_filter(size).unwrap();
            assert_eq!(k.shape(), (size, size, 1));
            assert_abs_diff_eq!(k.sum(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_box_filter_rejects_even_and_zero() {
        assert!(matches!(make_box_filter(0), Err(OpsError::InvalidDimension(_))));
        assert!(matches!(make_box_filter(2), Err(OpsError::InvalidDimension(_))));
    }

    #[test]
    fn test_gaussian_size_and_sum() {
        let cases = [(0.5, 5), (1.0, 7), (1.4, 11), (2.0, 13)];
        for (sigma, size) in cases {
            let k = make_gaussian_filter(sigma).unwrap();
            assert_eq!(k.shape(), (size, size, 1));
            assert_abs_diff_eq!(k.sum(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_gaussian_shape() {
        let k = make_gaussian_filter(1.0).unwrap();
        let center = k.get(3, 3, 0);
        assert!(center > k.get(0, 0, 0));
        assert!(center > k.get(2, 3, 0));
        // Radially symmetric
        assert_abs_diff_eq!(k.get(2, 3, 0), k.get(3, 4, 0), epsilon = 1e-7);
        assert_abs_diff_eq!(k.get(0, 1, 0), k.get(5, 6, 0), epsilon = 1e-7);
    }

    #[test]
    fn test_gaussian_rejects_bad_sigma() {
        for sigma in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                make_gaussian_filter(sigma),
                Err(OpsError::InvalidDimension(_))
            ));
        }
    }

    #[test]
    fn test_gaussian_huge_sigma_is_invalid_dimension() {
        assert!(matches!(
            make_gaussian_filter(1.0e10),
            Err(OpsError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_1d_gaussian() {
        for (sigma, size) in [(0.5, 5), (1.0, 7), (2.0, 13)] {
            let k = make_1d_gaussian(sigma).unwrap();
            assert_eq!(k.shape(), (size, 1, 1));
            assert_abs_diff_eq!(k.sum(), 1.0, epsilon = 1e-5);
            assert_abs_diff_eq!(k.get(0, 0, 0), k.get(size - 1, 0, 0), epsilon = 1e-7);
        }
        assert!(matches!(make_1d_gaussian(0.0), Err(OpsError::InvalidDimension(_))));
    }

    #[test]
    fn test_1d_gaussian_outer_product() {
        let row = make_1d_gaussian(1.2).unwrap();
        let full = make_gaussian_filter(1.2).unwrap();
        let n = row.width();
        assert_eq!(full.dimensions(), (n, n));
        for y in 0..n {
            for x in 0..n {
                let expected = row.get(x, 0, 0) * row.get(y, 0, 0);
                assert_abs_diff_eq!(full.get(x, y, 0), expected, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_fixed_filters() {
        assert_eq!(make_highpass_filter().sum(), 0.0);
        assert_eq!(make_sharpen_filter().sum(), 1.0);
        assert_eq!(make_emboss_filter().sum(), 1.0);
        assert_eq!(make_gx_filter().sum(), 0.0);
        assert_eq!(make_gy_filter().sum(), 0.0);

        let e = make_emboss_filter();
        assert_eq!(e.get(0, 0, 0), -2.0);
        assert_eq!(e.get(2, 2, 0), 2.0);
        assert_eq!(make_sharpen_filter().get(1, 1, 0), 5.0);
    }

    #[test]
    fn test_constructors_are_independent() {
        let mut a = make_highpass_filter();
        a.set(1, 1, 0, 100.0);
        assert_eq!(make_highpass_filter().get(1, 1, 0), 4.0);
    }

    #[test]
    fn test_l1_normalize_zero_sum() {
        let k = make_highpass_filter();
        assert_eq!(l1_normalize(&k), k);
    }
}
