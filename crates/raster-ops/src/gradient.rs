//! Sobel gradient magnitude and direction.

use crate::convolve::{convolve, ChannelMode};
use crate::filter::{make_gx_filter, make_gy_filter};
use crate::OpsResult;
use raster_core::PixelBuffer;
use tracing::trace;

/// Computes the Sobel gradient of `image`.
///
/// Both derivatives are taken with channels collapsed, so the result is a
/// pair of single-channel buffers: magnitude `sqrt(gx^2 + gy^2)` and
/// direction `atan2(gy, gx)` in radians.
///
/// # Example
///
/// ```rust
/// use raster_core::PixelBuffer;
/// use raster_ops::gradient::sobel;
///
/// let img = PixelBuffer::filled(5, 5, 3, 0.5).unwrap();
/// let (mag, _dir) = sobel(&img).unwrap();
/// assert!(mag.data().iter().all(|&v| v == 0.0));
/// ```
pub fn sobel(image: &PixelBuffer) -> OpsResult<(PixelBuffer, PixelBuffer)> {
    trace!(shape = ?image.shape(), "sobel");
    let gx = convolve(image, &make_gx_filter(), ChannelMode::Collapse)?;
    let gy = convolve(image, &make_gy_filter(), ChannelMode::Collapse)?;

    let mut magnitude = gx.zeros_like();
    let mut direction = gx.zeros_like();
    let samples = gx.data().iter().zip(gy.data());
    for ((m, d), (&x, &y)) in magnitude
        .data_mut()
        .iter_mut()
        .zip(direction.data_mut().iter_mut())
        .zip(samples)
    {
        *m = x.hypot(y);
        *d = y.atan2(x);
    }

    Ok((magnitude, direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_vertical_edge() {
        // Left half dark, right half bright.
        let mut img = PixelBuffer::new(6, 4, 1).unwrap();
        for y in 0..4 {
            for x in 3..6 {
                img.set(x, y, 0, 1.0);
            }
        }
        let (mag, dir) = sobel(&img).unwrap();
        assert_eq!(mag.shape(), (6, 4, 1));
        assert_abs_diff_eq!(mag.get(2, 1, 0), 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(mag.get(3, 1, 0), 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(mag.get(0, 1, 0), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(dir.get(2, 1, 0), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_horizontal_edge_direction() {
        let mut img = PixelBuffer::new(4, 6, 1).unwrap();
        for y in 3..6 {
            for x in 0..4 {
                img.set(x, y, 0, 1.0);
            }
        }
        let (mag, dir) = sobel(&img).unwrap();
        assert_abs_diff_eq!(mag.get(1, 3, 0), 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(dir.get(1, 3, 0), FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_channels_collapsed() {
        let img = PixelBuffer::filled(4, 4, 3, 0.2).unwrap();
        let (mag, dir) = sobel(&img).unwrap();
        assert_eq!(mag.channels(), 1);
        assert_eq!(dir.channels(), 1);
    }
}
