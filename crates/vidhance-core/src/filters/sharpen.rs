use ndarray::{Array3, Axis};

use crate::consts::SHARPEN_KERNEL;
use crate::filters::{build_plane, reflect_101};
use crate::frame::Frame;

/// Sharpen with the fixed unity-gain 3x3 kernel `[[-1,-1,-1],[-1,9,-1],[-1,-1,-1]]`.
///
/// Applied to each channel independently with reflect-101 borders; results
/// saturate to [0, 255].
pub fn sharpen(frame: &Frame) -> Frame {
    let (h, w, c) = frame.data.dim();
    let mut out = Array3::<u8>::zeros((h, w, c));
    if h == 0 || w == 0 {
        return frame.clone();
    }

    for ch in 0..c {
        let plane = frame.data.index_axis(Axis(2), ch);
        let sharpened = build_plane(h, w, |row, col| {
            let mut sum = 0i32;
            for (ky, kernel_row) in SHARPEN_KERNEL.iter().enumerate() {
                let src_row = reflect_101(row as isize + ky as isize - 1, h);
                for (kx, &k) in kernel_row.iter().enumerate() {
                    let src_col = reflect_101(col as isize + kx as isize - 1, w);
                    sum += k * plane[[src_row, src_col]] as i32;
                }
            }
            sum.clamp(0, 255) as u8
        });
        out.index_axis_mut(Axis(2), ch).assign(&sharpened);
    }

    frame.with_data(out, frame.format)
}
