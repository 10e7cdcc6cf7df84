//! 2D convolution of a [`PixelBuffer`] with a kernel buffer.
//!
//! # Channel handling
//!
//! The kernel's channel count is resolved against the image once per call
//! into a [`KernelBinding`]:
//!
//! - 1 kernel channel: the same plane is applied to every image channel
//! - kernel channels == image channels: image channel `c` uses plane `c`
//! - anything else: [`OpsError::ChannelMismatch`]
//!
//! [`ChannelMode`] then decides whether the per-channel responses are kept
//! ([`ChannelMode::Preserve`]) or summed into one output channel
//! ([`ChannelMode::Collapse`]).
//!
//! # Borders
//!
//! Taps that fall outside the image read the nearest edge pixel (edge
//! replication), the same policy the resamplers use.
//!
//! # Range
//!
//! Output is not clamped. Call [`crate::arith::clamp_image`] before display.
//!
//! # Example
//!
//! ```rust
//! use raster_core::PixelBuffer;
//! use raster_ops::convolve::{convolve, ChannelMode};
//! use raster_ops::filter::make_box_filter;
//!
//! let src = PixelBuffer::filled(16, 16, 3, 0.5).unwrap();
//! let blurred = convolve(&src, &make_box_filter(3).unwrap(), ChannelMode::Preserve).unwrap();
//! assert_eq!(blurred.channels(), 3);
//! ```

use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};
use raster_core::PixelBuffer;
use tracing::{debug, trace};

/// Output channel policy for [`convolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelMode {
    /// One output channel per image channel.
    #[default]
    Preserve,
    /// Per-channel responses summed into a single output channel.
    Collapse,
}

impl From<bool> for ChannelMode {
    /// `true` maps to [`ChannelMode::Preserve`].
    fn from(preserve: bool) -> Self {
        if preserve { Self::Preserve } else { Self::Collapse }
    }
}

impl ChannelMode {
    /// Number of output channels for an image with `image_channels`.
    #[inline]
    pub fn output_channels(self, image_channels: usize) -> usize {
        match self {
            Self::Preserve => image_channels,
            Self::Collapse => 1,
        }
    }
}

/// How kernel planes map onto image channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelBinding {
    /// Single-plane kernel reused for every image channel.
    PerChannelSameKernel,
    /// Kernel plane `c` applied to image channel `c`.
    PerChannelOwnKernel,
    /// Kernel channel count is incompatible with the image.
    Invalid,
}

impl KernelBinding {
    /// Resolves the binding for a kernel against an image.
    pub fn resolve(kernel_channels: usize, image_channels: usize) -> Self {
        if kernel_channels == 1 {
            Self::PerChannelSameKernel
        } else if kernel_channels == image_channels {
            Self::PerChannelOwnKernel
        } else {
            Self::Invalid
        }
    }

    /// Kernel plane used for image channel `c`.
    #[inline]
    fn plane(self, c: usize) -> usize {
        match self {
            Self::PerChannelOwnKernel => c,
            Self::PerChannelSameKernel | Self::Invalid => 0,
        }
    }
}

/// Kernel weights split into contiguous planes, with tap offsets.
struct Taps {
    planes: Vec<Vec<f32>>,
    dx: Vec<isize>,
    dy: Vec<isize>,
}

impl Taps {
    fn new(kernel: &PixelBuffer) -> Self {
        let (kw, kh) = kernel.dimensions();
        let (cx, cy) = ((kw / 2) as isize, (kh / 2) as isize);
        let planes = (0..kernel.channels())
            .map(|p| {
                let mut plane = Vec::with_capacity(kw * kh);
                for ky in 0..kh {
                    for kx in 0..kw {
                        plane.push(kernel.get(kx, ky, p));
                    }
                }
                plane
            })
            .collect();
        Self {
            planes,
            dx: (0..kw as isize).map(|k| k - cx).collect(),
            dy: (0..kh as isize).map(|k| k - cy).collect(),
        }
    }
}

#[inline]
fn clamp_axis(v: isize, len: usize) -> usize {
    v.clamp(0, len as isize - 1) as usize
}

/// Convolves `image` with `kernel`.
///
/// The kernel center is `(kernel.width / 2, kernel.height / 2)`. Odd sizes
/// are expected; even sizes are accepted and use the same center, so the
/// kernel extends one tap further right and down than left and up.
///
/// # Errors
///
/// Returns [`OpsError::ChannelMismatch`] if the kernel has neither 1 nor
/// `image.channels()` channels.
pub fn convolve(
    image: &PixelBuffer,
    kernel: &PixelBuffer,
    mode: ChannelMode,
) -> OpsResult<PixelBuffer> {
    let (width, height, channels) = image.shape();
    trace!(
        width,
        height,
        channels,
        kernel_w = kernel.width(),
        kernel_h = kernel.height(),
        kernel_c = kernel.channels(),
        ?mode,
        "convolve"
    );

    let binding = KernelBinding::resolve(kernel.channels(), channels);
    if binding == KernelBinding::Invalid {
        return Err(OpsError::ChannelMismatch {
            filter: kernel.channels(),
            image: channels,
        });
    }
    debug!(?binding, "resolved kernel binding");
    if kernel.width() % 2 == 0 || kernel.height() % 2 == 0 {
        debug!(
            kernel_w = kernel.width(),
            kernel_h = kernel.height(),
            "even-sized kernel, center biased toward origin"
        );
    }

    let taps = Taps::new(kernel);
    let out_channels = mode.output_channels(channels);
    let mut dst = PixelBuffer::new(width, height, out_channels)?;
    let row_len = dst.row_len();
    let src = image.data();

    for_each_row(dst.data_mut(), row_len, |y, row| {
        let rows: Vec<usize> = taps
            .dy
            .iter()
            .map(|&dy| clamp_axis(y as isize + dy, height) * width)
            .collect();
        let mut cols = vec![0usize; taps.dx.len()];

        for x in 0..width {
            for (col, &dx) in cols.iter_mut().zip(&taps.dx) {
                *col = clamp_axis(x as isize + dx, width);
            }

            let mut total = 0.0f32;
            for c in 0..channels {
                let weights = &taps.planes[binding.plane(c)];
                let mut sum = 0.0f32;
                let mut k = 0;
                for &row_base in &rows {
                    for &sx in &cols {
                        sum += src[(row_base + sx) * channels + c] * weights[k];
                        k += 1;
                    }
                }
                match mode {
                    ChannelMode::Preserve => row[x * channels + c] = sum,
                    ChannelMode::Collapse => total += sum,
                }
            }
            if mode == ChannelMode::Collapse {
                row[x] = total;
            }
        }
    });

    Ok(dst)
}

/// Convolves with a boolean preserve flag.
///
/// `preserve == true` keeps one output channel per image channel;
/// `false` sums them into a single channel.
///
/// # Example
///
/// ```rust
/// use raster_core::PixelBuffer;
/// use raster_ops::convolve::convolve_image;
/// use raster_ops::filter::make_highpass_filter;
///
/// let src = PixelBuffer::filled(8, 8, 3, 0.5).unwrap();
/// let edges = convolve_image(&src, &make_highpass_filter(), false).unwrap();
/// assert_eq!(edges.channels(), 1);
/// ```
pub fn convolve_image(
    image: &PixelBuffer,
    filter: &PixelBuffer,
    preserve: bool,
) -> OpsResult<PixelBuffer> {
    convolve(image, filter, ChannelMode::from(preserve))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{make_box_filter, make_gaussian_filter, make_highpass_filter};
    use approx::assert_abs_diff_eq;

    /// Direct per-sample reference using the buffer's clamped accessor.
    fn reference(image: &PixelBuffer, kernel: &PixelBuffer, preserve: bool) -> PixelBuffer {
        let (w, h, ch) = image.shape();
        let out_c = if preserve { ch } else { 1 };
        let mut out = PixelBuffer::new(w, h, out_c).unwrap();
        let (cx, cy) = ((kernel.width() / 2) as isize, (kernel.height() / 2) as isize);
        for y in 0..h {
            for x in 0..w {
                let mut total = 0.0;
                for c in 0..ch {
                    let p = if kernel.channels() == 1 { 0 } else { c };
                    let mut sum = 0.0;
                    for ky in 0..kernel.height() {
                        for kx in 0..kernel.width() {
                            let sx = x as isize + kx as isize - cx;
                            let sy = y as isize + ky as isize - cy;
                            sum += image.get_clamped(sx, sy, c) * kernel.get(kx, ky, p);
                        }
                    }
                    if preserve {
                        out.set(x, y, c, sum);
                    } else {
                        total += sum;
                    }
                }
                if !preserve {
                    out.set(x, y, 0, total);
                }
            }
        }
        out
    }

    fn pattern(w: usize, h: usize, c: usize) -> PixelBuffer {
        let data = (0..w * h * c).map(|i| ((i * 7919) % 101) as f32 / 100.0).collect();
        PixelBuffer::from_data(w, h, c, data).unwrap()
    }

    #[test]
    fn test_binding_resolution() {
        assert_eq!(KernelBinding::resolve(1, 3), KernelBinding::PerChannelSameKernel);
        assert_eq!(KernelBinding::resolve(1, 1), KernelBinding::PerChannelSameKernel);
        assert_eq!(KernelBinding::resolve(3, 3), KernelBinding::PerChannelOwnKernel);
        assert_eq!(KernelBinding::resolve(2, 3), KernelBinding::Invalid);
    }

    #[test]
    fn test_channel_mode_from_bool() {
        assert_eq!(ChannelMode::from(true), ChannelMode::Preserve);
        assert_eq!(ChannelMode::from(false), ChannelMode::Collapse);
        assert_eq!(ChannelMode::Collapse.output_channels(3), 1);
    }

    #[test]
    fn test_channel_mismatch() {
        let img = pattern(4, 4, 3);
        let kernel = PixelBuffer::filled(3, 3, 2, 0.1).unwrap();
        let err = convolve_image(&img, &kernel, true).unwrap_err();
        assert_eq!(err, OpsError::ChannelMismatch { filter: 2, image: 3 });
    }

    #[test]
    fn test_center_impulse_box() {
        let mut img = PixelBuffer::new(4, 4, 1).unwrap();
        img.set(1, 1, 0, 1.0);
        let out = convolve_image(&img, &make_box_filter(3).unwrap(), true).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let expected = if x <= 2 && y <= 2 { 1.0 / 9.0 } else { 0.0 };
                assert_abs_diff_eq!(out.get(x, y, 0), expected, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_corner_impulse_box() {
        let mut img = PixelBuffer::new(4, 4, 1).unwrap();
        img.set(0, 0, 0, 1.0);
        let out = convolve_image(&img, &make_box_filter(3).unwrap(), true).unwrap();
        assert_abs_diff_eq!(out.get(0, 0, 0), 4.0 / 9.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.get(1, 0, 0), 2.0 / 9.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.get(0, 1, 0), 2.0 / 9.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.get(1, 1, 0), 1.0 / 9.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.get(2, 0, 0), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.sum(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_constant_brightness_preserved() {
        let img = PixelBuffer::filled(12, 9, 3, 0.37).unwrap();
        for kernel in [make_box_filter(5).unwrap(), make_gaussian_filter(1.2).unwrap()] {
            let out = convolve(&img, &kernel, ChannelMode::Preserve).unwrap();
            for v in out.data() {
                assert_abs_diff_eq!(*v, 0.37, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_matches_reference() {
        let img = pattern(9, 6, 3);
        let kernel = make_gaussian_filter(0.8).unwrap();
        for preserve in [true, false] {
            let out = convolve_image(&img, &kernel, preserve).unwrap();
            let expected = reference(&img, &kernel, preserve);
            assert_eq!(out.shape(), expected.shape());
            for (a, b) in out.data().iter().zip(expected.data()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_per_channel_kernels() {
        let img = pattern(5, 5, 3);
        // Plane 0 identity, plane 1 doubles, plane 2 zeroes.
        let mut kernel = PixelBuffer::new(1, 1, 3).unwrap();
        kernel.set(0, 0, 0, 1.0);
        kernel.set(0, 0, 1, 2.0);
        let out = convolve_image(&img, &kernel, true).unwrap();
        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(out.get(x, y, 0), img.get(x, y, 0));
                assert_eq!(out.get(x, y, 1), 2.0 * img.get(x, y, 1));
                assert_eq!(out.get(x, y, 2), 0.0);
            }
        }
    }

    #[test]
    fn test_collapse_sums_channels() {
        let img = pattern(6, 4, 3);
        let identity = PixelBuffer::filled(1, 1, 1, 1.0).unwrap();
        let out = convolve_image(&img, &identity, false).unwrap();
        assert_eq!(out.shape(), (6, 4, 1));
        for y in 0..4 {
            for x in 0..6 {
                let s = img.get(x, y, 0) + img.get(x, y, 1) + img.get(x, y, 2);
                assert_abs_diff_eq!(out.get(x, y, 0), s, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_even_kernel_accepted() {
        let img = pattern(5, 5, 1);
        let kernel = PixelBuffer::filled(2, 2, 1, 0.25).unwrap();
        let out = convolve_image(&img, &kernel, true).unwrap();
        let expected = reference(&img, &kernel, true);
        for (a, b) in out.data().iter().zip(expected.data()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
        // Taps cover offsets -1..=0 on both axes.
        let v = (img.get(1, 1, 0) + img.get(2, 1, 0) + img.get(1, 2, 0) + img.get(2, 2, 0)) * 0.25;
        assert_abs_diff_eq!(out.get(2, 2, 0), v, epsilon = 1e-6);
    }

    #[test]
    fn test_highpass_unclamped() {
        let mut img = PixelBuffer::new(3, 3, 1).unwrap();
        img.set(1, 1, 0, 1.0);
        let out = convolve_image(&img, &make_highpass_filter(), true).unwrap();
        assert_eq!(out.get(1, 1, 0), 4.0);
        assert_eq!(out.get(1, 0, 0), -1.0);
    }
}
