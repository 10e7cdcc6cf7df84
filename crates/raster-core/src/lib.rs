//! # raster-core
//!
//! Core types for raster image kernels.
//!
//! This crate provides the foundational types used by the rest of the workspace:
//!
//! - [`PixelBuffer`] - Dense `width x height x channels` grid of `f32` samples
//! - [`Error`], [`Result`] - Construction and access errors
//!
//! ## Crate Structure
//!
//! ```text
//! raster-core (this crate)
//!    ^
//!    |
//!    +-- raster-ops (resize, filters, convolution, arithmetic)
//!    +-- raster-bench
//! ```
//!
//! Decoding and encoding image files is left to callers; this crate only
//! ever sees decoded samples.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;

pub use error::{Error, Result};
pub use image::PixelBuffer;
