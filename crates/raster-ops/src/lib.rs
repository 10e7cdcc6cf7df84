//! # raster-ops
//!
//! Numeric kernels over [`PixelBuffer`]s: resampling, filter construction,
//! convolution and elementwise arithmetic.
//!
//! # Modules
//!
//! - [`resize`] - Nearest-neighbor and bilinear resampling
//! - [`filter`] - Box, Gaussian, high-pass, sharpen, emboss and Sobel kernels
//! - [`convolve`] - 2D convolution with edge replication
//! - [`arith`] - Add, subtract, clamp and frequency decomposition
//! - [`gradient`] - Sobel magnitude and direction
//! - [`corner`] - Separable smoothing and Harris corner response
//!
//! # Conventions
//!
//! Every operation returns a new buffer, except [`arith::clamp_image`],
//! which clamps its argument in place. Nothing clamps implicitly.
//!
//! # Example
//!
//! ```rust
//! use raster_core::PixelBuffer;
//! use raster_ops::{arith, convolve_image, filter, resize};
//!
//! let image = PixelBuffer::filled(64, 48, 3, 0.5).unwrap();
//!
//! // Blur, then make a thumbnail
//! let blur = convolve_image(&image, &filter::make_box_filter(7).unwrap(), true).unwrap();
//! let thumb = resize::nn_resize(&blur, 64 / 7, 48 / 7).unwrap();
//! assert_eq!(thumb.dimensions(), (9, 6));
//!
//! // Sharpen for display
//! let mut sharp = convolve_image(&image, &filter::make_sharpen_filter(), true).unwrap();
//! arith::clamp_image(&mut sharp);
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - Partition resize and convolution rows over Rayon

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod arith;
pub mod convolve;
pub mod corner;
pub mod filter;
pub mod gradient;
pub mod parallel;
pub mod resize;

pub use error::{OpsError, OpsResult};
pub use raster_core::PixelBuffer;

pub use arith::{add, clamp_image, subtract};
pub use convolve::{convolve, convolve_image, ChannelMode, KernelBinding};
pub use corner::{harris_corners, smooth_image, Corner};
pub use filter::{
    make_1d_gaussian, make_box_filter, make_emboss_filter, make_gaussian_filter,
    make_highpass_filter, make_sharpen_filter,
};
pub use resize::{bilinear_resize, nn_resize, Interpolation};
