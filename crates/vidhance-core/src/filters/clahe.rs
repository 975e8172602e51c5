use ndarray::{ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{DEFAULT_CLAHE_CLIP_LIMIT, DEFAULT_CLAHE_TILES, INTENSITY_LEVELS};
use crate::error::Result;
use crate::filters::{build_plane, reflect_101};
use crate::frame::Frame;

/// Contrast-limited adaptive histogram equalization parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheParams {
    /// Maximum bin height relative to a flat histogram. 0 disables clipping.
    pub clip_limit: f32,
    pub tiles_x: u32,
    pub tiles_y: u32,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            clip_limit: DEFAULT_CLAHE_CLIP_LIMIT,
            tiles_x: DEFAULT_CLAHE_TILES,
            tiles_y: DEFAULT_CLAHE_TILES,
        }
    }
}

type Lut = [u8; INTENSITY_LEVELS];

/// CLAHE on a gray frame.
///
/// The frame is split into `tiles_x * tiles_y` tiles (padded by reflection
/// when the size is not a multiple). Each tile gets a clipped, redistributed
/// histogram and its own equalization table; every output pixel blends the
/// tables of the four nearest tile centres bilinearly.
pub fn clahe(frame: &Frame, params: &ClaheParams) -> Result<Frame> {
    let plane = frame.gray_plane()?;
    let (h, w) = plane.dim();
    if h == 0 || w == 0 {
        return Ok(frame.clone());
    }

    let tiles_x = tile_count(params.tiles_x, w, "tiles_x");
    let tiles_y = tile_count(params.tiles_y, h, "tiles_y");

    let padded_w = if w % tiles_x == 0 { w } else { w + tiles_x - w % tiles_x };
    let padded_h = if h % tiles_y == 0 { h } else { h + tiles_y - h % tiles_y };
    let tile_w = padded_w / tiles_x;
    let tile_h = padded_h / tiles_y;
    let tile_area = tile_w * tile_h;

    let clip = if params.clip_limit > 0.0 {
        ((params.clip_limit as f64 * tile_area as f64 / INTENSITY_LEVELS as f64) as u64).max(1)
    } else {
        0
    };
    let lut_scale = (INTENSITY_LEVELS - 1) as f64 / tile_area as f64;

    let mut luts: Vec<Lut> = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = tile_histogram(&plane, tx * tile_w, ty * tile_h, tile_w, tile_h);
            if clip > 0 {
                clip_histogram(&mut hist, clip);
            }
            luts.push(cumulative_lut(&hist, lut_scale));
        }
    }

    let inv_tw = 1.0 / tile_w as f64;
    let inv_th = 1.0 / tile_h as f64;
    let out = build_plane(h, w, |row, col| {
        let (tx1, tx2, xa) = neighbours(col, inv_tw, tiles_x);
        let (ty1, ty2, ya) = neighbours(row, inv_th, tiles_y);
        let v = plane[[row, col]] as usize;

        let top = luts[ty1 * tiles_x + tx1][v] as f64 * (1.0 - xa)
            + luts[ty1 * tiles_x + tx2][v] as f64 * xa;
        let bottom = luts[ty2 * tiles_x + tx1][v] as f64 * (1.0 - xa)
            + luts[ty2 * tiles_x + tx2][v] as f64 * xa;
        (top * (1.0 - ya) + bottom * ya).round().clamp(0.0, 255.0) as u8
    });

    Ok(frame.with_data(out.insert_axis(Axis(2)), frame.format))
}

/// At least one tile, and no more tiles than pixels along the axis.
fn tile_count(requested: u32, extent: usize, axis: &str) -> usize {
    let requested = requested as usize;
    if requested > extent {
        warn!(axis, requested, extent, "CLAHE tile count exceeds frame size, clamping");
        return extent;
    }
    requested.max(1)
}

/// Histogram of one tile of the (virtually padded) plane.
fn tile_histogram(
    plane: &ArrayView2<'_, u8>,
    x0: usize,
    y0: usize,
    tile_w: usize,
    tile_h: usize,
) -> [u64; INTENSITY_LEVELS] {
    let (h, w) = plane.dim();
    let mut hist = [0u64; INTENSITY_LEVELS];
    for row in y0..y0 + tile_h {
        let src_row = reflect_101(row as isize, h);
        for col in x0..x0 + tile_w {
            let src_col = reflect_101(col as isize, w);
            hist[plane[[src_row, src_col]] as usize] += 1;
        }
    }
    hist
}

/// Cap every bin at `clip` and spread the excess back over all bins.
fn clip_histogram(hist: &mut [u64; INTENSITY_LEVELS], clip: u64) {
    let mut clipped = 0u64;
    for bin in hist.iter_mut() {
        if *bin > clip {
            clipped += *bin - clip;
            *bin = clip;
        }
    }

    let batch = clipped / INTENSITY_LEVELS as u64;
    let mut residual = clipped - batch * INTENSITY_LEVELS as u64;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (INTENSITY_LEVELS as u64 / residual).max(1) as usize;
        let mut i = 0;
        while i < INTENSITY_LEVELS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn cumulative_lut(hist: &[u64; INTENSITY_LEVELS], scale: f64) -> Lut {
    let mut lut = [0u8; INTENSITY_LEVELS];
    let mut sum = 0u64;
    for (entry, &count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *entry = (sum as f64 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Indices of the two tiles whose centres bracket `pos`, and the blend weight.
fn neighbours(pos: usize, inv_tile: f64, tiles: usize) -> (usize, usize, f64) {
    let f = pos as f64 * inv_tile - 0.5;
    let lo = f.floor();
    let weight = f - lo;
    let lo = lo as isize;
    let first = lo.max(0) as usize;
    let second = ((lo + 1) as usize).min(tiles - 1);
    (first, second, weight)
}
