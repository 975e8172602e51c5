use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::consts::BINOMIAL_KERNEL_5;
use crate::filters::{build_plane, reflect_101};
use crate::frame::Frame;

/// Integer taps of the 5x5 binomial kernel; each pass sums to 16.
const TAPS: [u32; 5] = [1, 4, 6, 4, 1];

/// Apply the 5x5 Gaussian (binomial) blur to every channel of a frame.
pub fn gaussian_blur(frame: &Frame) -> Frame {
    let (h, w, c) = frame.data.dim();
    let mut out = Array3::<u8>::zeros((h, w, c));
    for ch in 0..c {
        let blurred = gaussian_blur_plane(&frame.data.index_axis(Axis(2), ch));
        out.index_axis_mut(Axis(2), ch).assign(&blurred);
    }
    frame.with_data(out, frame.format)
}

/// Separable 5x5 blur of one 8-bit plane with reflect-101 borders.
///
/// Runs in integer arithmetic: both passes accumulate exact tap sums and the
/// result is rounded once after dividing by 256.
pub fn gaussian_blur_plane(plane: &ArrayView2<'_, u8>) -> Array2<u8> {
    debug_assert!((BINOMIAL_KERNEL_5.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    let (h, w) = plane.dim();
    if h == 0 || w == 0 {
        return plane.to_owned();
    }
    let radius = TAPS.len() as isize / 2;

    let mut row_pass = Array2::<u32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            let mut sum = 0u32;
            for (k, &tap) in TAPS.iter().enumerate() {
                let src = reflect_101(col as isize + k as isize - radius, w);
                sum += tap * plane[[row, src]] as u32;
            }
            row_pass[[row, col]] = sum;
        }
    }

    build_plane(h, w, |row, col| {
        let mut sum = 0u32;
        for (k, &tap) in TAPS.iter().enumerate() {
            let src = reflect_101(row as isize + k as isize - radius, h);
            sum += tap * row_pass[[src, col]];
        }
        ((sum + 128) >> 8).min(255) as u8
    })
}
