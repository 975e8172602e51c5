use std::borrow::Cow;

use ndarray::Zip;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{
    GAMMA_LEVELS_PER_UNIT, GAMMA_MAX_LEVEL, GAMMA_NEUTRAL_LEVEL, INTENSITY_LEVELS,
    PARALLEL_PIXEL_THRESHOLD,
};
use crate::frame::Frame;

/// Gamma on the integer slider scale: tenths of the exponent, 0..=20.
///
/// 10 is neutral (exponent 1.0). 0 is also treated as neutral rather than
/// as a zero exponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct GammaLevel(u8);

impl GammaLevel {
    pub const NEUTRAL: GammaLevel = GammaLevel(GAMMA_NEUTRAL_LEVEL);

    /// Clamps out-of-range levels to the slider maximum.
    pub fn new(level: u32) -> Self {
        if level > GAMMA_MAX_LEVEL as u32 {
            warn!(level, max = GAMMA_MAX_LEVEL, "Gamma level out of range, clamping");
            return Self(GAMMA_MAX_LEVEL);
        }
        Self(level as u8)
    }

    /// Nearest slider level for a real exponent (1.0 = identity).
    pub fn from_exponent(exponent: f32) -> Self {
        if !exponent.is_finite() || exponent <= 0.0 {
            return Self::NEUTRAL;
        }
        Self::new((exponent * GAMMA_LEVELS_PER_UNIT).round() as u32)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn is_neutral(self) -> bool {
        self.0 == 0 || self.0 == GAMMA_NEUTRAL_LEVEL
    }

    /// Real exponent. Level 0 resolves to 1.0.
    pub fn exponent(self) -> f32 {
        if self.0 == 0 {
            1.0
        } else {
            self.0 as f32 / GAMMA_LEVELS_PER_UNIT
        }
    }
}

impl Default for GammaLevel {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl From<u32> for GammaLevel {
    fn from(level: u32) -> Self {
        Self::new(level)
    }
}

impl From<GammaLevel> for u32 {
    fn from(level: GammaLevel) -> Self {
        level.0 as u32
    }
}

impl std::fmt::Display for GammaLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.exponent())
    }
}

/// Lookup table `round(255 * (i / 255) ^ (1 / gamma))`.
pub fn gamma_lut(level: GammaLevel) -> [u8; INTENSITY_LEVELS] {
    let inv_gamma = 1.0 / level.exponent() as f64;
    let mut table = [0u8; INTENSITY_LEVELS];
    for (i, entry) in table.iter_mut().enumerate() {
        let v = 255.0 * (i as f64 / 255.0).powf(inv_gamma);
        *entry = v.round().clamp(0.0, 255.0) as u8;
    }
    table
}

/// Apply gamma correction to every sample of every channel.
///
/// A neutral level hands back the input frame itself.
pub fn apply_gamma(frame: &Frame, level: GammaLevel) -> Cow<'_, Frame> {
    if level.is_neutral() {
        return Cow::Borrowed(frame);
    }
    Cow::Owned(apply_lut(frame, &gamma_lut(level)))
}

/// Remap every sample through a 256-entry table.
pub fn apply_lut(frame: &Frame, table: &[u8; INTENSITY_LEVELS]) -> Frame {
    let mut data = frame.data.clone();
    if data.len() >= PARALLEL_PIXEL_THRESHOLD {
        Zip::from(&mut data).par_for_each(|v| *v = table[*v as usize]);
    } else {
        data.mapv_inplace(|v| table[v as usize]);
    }
    frame.with_data(data, frame.format)
}
