use std::ops::Range;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use crate::filters::clahe::ClaheParams;
pub use crate::filters::levels::GammaLevel;

/// Batch export job: which videos, where to, and how to enhance them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub inputs: Vec<PathBuf>,
    #[serde(default)]
    pub enhancement: EnhancementSpec,
    #[serde(default)]
    pub crop: CropRange,
}

/// Which per-frame stages run, and with what parameters.
///
/// Stages always run in the order gamma, equalize, edges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementSpec {
    pub gamma_enabled: bool,
    pub gamma: GammaLevel,
    pub equalize: EqualizeMode,
    pub clahe: ClaheParams,
    pub edges_enabled: bool,
}

impl Default for EnhancementSpec {
    fn default() -> Self {
        Self {
            gamma_enabled: false,
            gamma: GammaLevel::NEUTRAL,
            equalize: EqualizeMode::None,
            clahe: ClaheParams::default(),
            edges_enabled: false,
        }
    }
}

impl EnhancementSpec {
    /// True when every frame passes through untouched.
    pub fn is_identity(&self) -> bool {
        (!self.gamma_enabled || self.gamma.is_neutral())
            && self.equalize == EqualizeMode::None
            && !self.edges_enabled
    }

    /// True when output frames keep the source channel layout.
    /// Equalization and edge detection produce gray frames.
    pub fn preserves_color(&self) -> bool {
        self.equalize == EqualizeMode::None && !self.edges_enabled
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EqualizeMode {
    #[default]
    None,
    Global,
    /// Contrast-limited adaptive (CLAHE).
    Adaptive,
}

impl std::fmt::Display for EqualizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Global => write!(f, "Global"),
            Self::Adaptive => write!(f, "CLAHE"),
        }
    }
}

/// Frame interval kept on export.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropRange {
    pub enabled: bool,
    pub start_frame: usize,
    /// Frames dropped from the end of the source.
    pub end_offset_from_tail: usize,
}

impl CropRange {
    /// Half-open frame range `[start, frame_count - end_offset)` for a source
    /// of `frame_count` frames. Out-of-range values are clamped; a crop that
    /// leaves nothing resolves to an empty range.
    pub fn resolve(&self, frame_count: usize) -> Range<usize> {
        if !self.enabled {
            return 0..frame_count;
        }

        let start = self.start_frame.min(frame_count);
        let end = frame_count.saturating_sub(self.end_offset_from_tail);
        if end <= start {
            warn!(
                frame_count,
                start = self.start_frame,
                end_offset = self.end_offset_from_tail,
                "Crop range leaves no frames"
            );
            return start..start;
        }
        start..end
    }
}

impl std::fmt::Display for CropRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.enabled {
            write!(
                f,
                "from frame {}, drop last {}",
                self.start_frame, self.end_offset_from_tail
            )
        } else {
            write!(f, "full length")
        }
    }
}
