use image::{GrayImage, Luma};

use crate::consts::INTENSITY_LEVELS;
use crate::error::Result;
use crate::filters::clahe::{clahe, ClaheParams};
use crate::filters::levels::apply_lut;
use crate::frame::Frame;
use crate::pipeline::config::EqualizeMode;

/// 256-bin intensity histogram of a gray frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    bins: [u64; INTENSITY_LEVELS],
    total: u64,
}

impl Histogram {
    /// Count samples of a gray frame.
    pub fn of(frame: &Frame) -> Result<Self> {
        let plane = frame.gray_plane()?;
        let mut bins = [0u64; INTENSITY_LEVELS];
        for &v in plane.iter() {
            bins[v as usize] += 1;
        }
        Ok(Self {
            bins,
            total: plane.len() as u64,
        })
    }

    pub fn bins(&self) -> &[u64; INTENSITY_LEVELS] {
        &self.bins
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Median intensity. Even sample counts average the two middle values.
    pub fn median(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let lower = self.value_at_rank((self.total - 1) / 2);
        let upper = self.value_at_rank(self.total / 2);
        (lower as f64 + upper as f64) / 2.0
    }

    /// Intensity of the `rank`-th sample in sorted order (0-based).
    fn value_at_rank(&self, rank: u64) -> u8 {
        let mut seen = 0u64;
        for (value, &count) in self.bins.iter().enumerate() {
            seen += count;
            if seen > rank {
                return value as u8;
            }
        }
        (INTENSITY_LEVELS - 1) as u8
    }

    /// Bar plot of the bins, white on black, scaled to the tallest bin.
    pub fn render(&self, width: u32, height: u32) -> GrayImage {
        let peak = self.bins.iter().copied().max().unwrap_or(0).max(1) as f64;
        let width = width.max(1);
        let height = height.max(1);

        GrayImage::from_fn(width, height, |x, y| {
            let bin = (x as usize * INTENSITY_LEVELS / width as usize).min(INTENSITY_LEVELS - 1);
            let bar = (self.bins[bin] as f64 / peak * height as f64).round() as u32;
            if height - y <= bar {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }
}

/// Equalize a gray frame according to `mode`.
pub fn equalize(frame: &Frame, mode: EqualizeMode, params: &ClaheParams) -> Result<Frame> {
    match mode {
        EqualizeMode::None => {
            frame.gray_plane()?;
            Ok(frame.clone())
        }
        EqualizeMode::Global => equalize_global(frame),
        EqualizeMode::Adaptive => clahe(frame, params),
    }
}

/// Global histogram equalization over the cumulative distribution.
///
/// The lowest occupied bin maps to 0; a frame with a single intensity is
/// returned unchanged.
pub fn equalize_global(frame: &Frame) -> Result<Frame> {
    let hist = Histogram::of(frame)?;
    let bins = hist.bins();

    let Some(first) = bins.iter().position(|&c| c > 0) else {
        return Ok(frame.clone());
    };
    if bins[first] == hist.total() {
        return Ok(frame.clone());
    }

    let scale = 255.0 / (hist.total() - bins[first]) as f64;
    let mut lut = [0u8; INTENSITY_LEVELS];
    let mut sum = 0u64;
    for i in first + 1..INTENSITY_LEVELS {
        sum += bins[i];
        lut[i] = (sum as f64 * scale).round().clamp(0.0, 255.0) as u8;
    }

    Ok(apply_lut(frame, &lut))
}
