use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use ndarray::{Array2, ArrayView2};

use crate::consts::CANNY_SIGMA;
use crate::error::Result;
use crate::filters::gaussian_blur::gaussian_blur_plane;
use crate::filters::histogram::Histogram;
use crate::frame::Frame;

/// tan(22.5 deg), the boundary between horizontal and diagonal gradients.
const TAN_22_5: f64 = 0.414_213_562_373_095_1;

/// Canny hysteresis thresholds (gradient magnitude units, L1 norm).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CannyThresholds {
    pub low: i32,
    pub high: i32,
}

impl CannyThresholds {
    /// Bounds at `(1 - 0.33) * median` and `(1 + 0.33) * median`, clamped to [0, 255].
    pub fn from_median(median: f64) -> Self {
        let low = ((1.0 - CANNY_SIGMA) * median).max(0.0) as i32;
        let high = ((1.0 + CANNY_SIGMA) * median).min(255.0) as i32;
        Self { low, high }
    }
}

/// Edge map of a frame: blur, then Canny with median-derived thresholds.
///
/// Color frames are reduced to luminance first. The result is a gray frame
/// holding 255 on edges and 0 elsewhere.
pub fn detect_edges(frame: &Frame) -> Result<Frame> {
    let gray = frame.to_gray();
    let median = Histogram::of(&gray)?.median();
    let thresholds = CannyThresholds::from_median(median);

    let plane = gray.gray_plane()?;
    let blurred = gaussian_blur_plane(&plane);
    let edges = canny(&blurred.view(), thresholds);
    Ok(gray.with_data(edges.insert_axis(ndarray::Axis(2)), gray.format))
}

/// Canny edge detection on an 8-bit plane.
///
/// 3x3 Sobel gradients (replicated borders), L1 magnitude, non-maximum
/// suppression along the quantized gradient direction, then 8-connected
/// hysteresis from pixels above `high` through pixels above `low`.
pub fn canny(plane: &ArrayView2<'_, u8>, thresholds: CannyThresholds) -> Array2<u8> {
    let (h, w) = plane.dim();
    let mut edges = Array2::<u8>::zeros((h, w));
    if h == 0 || w == 0 {
        return edges;
    }

    let (low, high) = if thresholds.low > thresholds.high {
        (thresholds.high, thresholds.low)
    } else {
        (thresholds.low, thresholds.high)
    };

    let (dx, dy) = sobel(plane);
    let mag = Array2::from_shape_fn((h, w), |(r, c)| dx[[r, c]].abs() + dy[[r, c]].abs());
    let mag_at = |r: isize, c: isize| -> i32 {
        if r < 0 || c < 0 || r >= h as isize || c >= w as isize {
            0
        } else {
            mag[[r as usize, c as usize]]
        }
    };

    // 0 = suppressed, 1 = weak candidate, 2 = strong
    let mut state = Array2::<u8>::zeros((h, w));
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for row in 0..h {
        for col in 0..w {
            let m = mag[[row, col]];
            if m <= low {
                continue;
            }
            let gx = dx[[row, col]];
            let gy = dy[[row, col]];
            let xs = gx.abs() as f64;
            let ys = gy.abs() as f64;
            let (r, c) = (row as isize, col as isize);

            let tg22x = xs * TAN_22_5;
            let is_max = if ys < tg22x {
                m > mag_at(r, c - 1) && m >= mag_at(r, c + 1)
            } else if ys > tg22x + 2.0 * xs {
                m > mag_at(r - 1, c) && m >= mag_at(r + 1, c)
            } else {
                let s: isize = if (gx ^ gy) < 0 { -1 } else { 1 };
                m > mag_at(r - 1, c - s) && m > mag_at(r + 1, c + s)
            };

            if !is_max {
                continue;
            }
            if m > high {
                state[[row, col]] = 2;
                stack.push((row, col));
            } else {
                state[[row, col]] = 1;
            }
        }
    }

    while let Some((row, col)) = stack.pop() {
        edges[[row, col]] = 255;
        for dr in -1..=1_isize {
            for dc in -1..=1_isize {
                let nr = row as isize + dr;
                let nc = col as isize + dc;
                if nr < 0 || nc < 0 || nr >= h as isize || nc >= w as isize {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                if state[[nr, nc]] == 1 {
                    state[[nr, nc]] = 2;
                    stack.push((nr, nc));
                }
            }
        }
    }

    edges
}

/// 3x3 Sobel derivatives with replicated borders.
fn sobel(plane: &ArrayView2<'_, u8>) -> (Array2<i32>, Array2<i32>) {
    let (h, w) = plane.dim();
    let image = GrayImage::from_fn(w as u32, h as u32, |x, y| {
        Luma([plane[[y as usize, x as usize]]])
    });
    let gx = horizontal_sobel(&image);
    let gy = vertical_sobel(&image);

    let dx = Array2::from_shape_fn((h, w), |(r, c)| gx.get_pixel(c as u32, r as u32)[0] as i32);
    let dy = Array2::from_shape_fn((h, w), |(r, c)| gy.get_pixel(c as u32, r as u32)[0] as i32);
    (dx, dy)
}
