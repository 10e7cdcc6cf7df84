//! Row scheduling for buffer-producing operations.
//!
//! Resize and convolution write each output row independently, so the
//! destination store is partitioned by row. With the `parallel` feature
//! (on by default) rows are distributed over the Rayon thread pool,
//! otherwise they run in order on the calling thread. The per-row closure
//! is identical in both cases, so results do not depend on the feature.
//!
//! # Example
//!
//! ```rust
//! use raster_ops::parallel::for_each_row;
//!
//! let mut dst = vec![0.0f32; 4 * 3];
//! for_each_row(&mut dst, 4, |y, row| row.fill(y as f32));
//! assert_eq!(&dst[8..], &[2.0; 4]);
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Calls `f(y, row)` for every `row_len`-sized row of `dst`.
///
/// `row_len` must be non-zero.
pub fn for_each_row<F>(dst: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]) + Send + Sync,
{
    debug_assert!(row_len > 0, "row length must be > 0");

    #[cfg(feature = "parallel")]
    dst.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "parallel"))]
    dst.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_visited_once() {
        let width = 7;
        let height = 33;
        let mut dst = vec![-1.0f32; width * height];
        for_each_row(&mut dst, width, |y, row| {
            for (x, v) in row.iter_mut().enumerate() {
                *v = (y * width + x) as f32;
            }
        });
        for (i, v) in dst.iter().enumerate() {
            assert_eq!(*v, i as f32);
        }
    }
}
