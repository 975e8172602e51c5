pub mod clahe;
pub mod gaussian_blur;
pub mod histogram;
pub mod levels;
pub mod sharpen;

pub use clahe::clahe;
pub use histogram::{equalize, equalize_global, Histogram};
pub use levels::{apply_gamma, gamma_lut};
pub use sharpen::sharpen;

use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Build an `h x w` plane from a per-pixel function, row-parallel on large frames.
pub(crate) fn build_plane<F>(h: usize, w: usize, f: F) -> Array2<u8>
where
    F: Fn(usize, usize) -> u8 + Sync,
{
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let samples: Vec<u8> = (0..h)
            .into_par_iter()
            .flat_map_iter(|row| (0..w).map(move |col| (row, col)))
            .map(|(row, col)| f(row, col))
            .collect();
        Array2::from_shape_vec((h, w), samples).unwrap_or_else(|_| Array2::zeros((h, w)))
    } else {
        Array2::from_shape_fn((h, w), |(row, col)| f(row, col))
    }
}

/// Mirror an out-of-range index without repeating the edge sample
/// (`gfedcb|abcdefgh|gfedcba`).
pub(crate) fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let period = 2 * (n - 1);
    let mut i = i.rem_euclid(period);
    if i >= n {
        i = period - i;
    }
    i as usize
}
