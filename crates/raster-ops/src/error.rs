//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpsError {
    /// Non-positive or malformed target size or kernel parameter.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Filter channel count is neither 1 nor the image channel count.
    #[error("channel mismatch: filter has {filter} channels, image has {image}")]
    ChannelMismatch {
        /// Filter channel count
        filter: usize,
        /// Image channel count
        image: usize,
    },

    /// Operands of an elementwise operation differ in shape.
    #[error("shape mismatch: {left:?} vs {right:?} (width, height, channels)")]
    ShapeMismatch {
        /// Left operand `(width, height, channels)`
        left: (usize, usize, usize),
        /// Right operand `(width, height, channels)`
        right: (usize, usize, usize),
    },

    /// Buffer construction failed.
    #[error(transparent)]
    Core(#[from] raster_core::Error),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
