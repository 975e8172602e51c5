use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::consts::{OUTPUT_EXTENSION, OUTPUT_SUFFIX};
use crate::detection::canny::detect_edges;
use crate::error::Result;
use crate::filters::histogram::equalize;
use crate::filters::levels::apply_gamma;
use crate::frame::Frame;
use crate::io::ser::{SerHeader, SER_COLOR_MONO};

use super::config::{EnhancementSpec, EqualizeMode};

/// Run the enabled stages on one frame: gamma, then equalize, then edges.
///
/// Frames no stage touches are returned borrowed. Color frames are reduced to
/// luminance before equalization or edge detection.
pub fn enhance_frame<'a>(frame: &'a Frame, spec: &EnhancementSpec) -> Result<Cow<'a, Frame>> {
    let mut current = if spec.gamma_enabled {
        apply_gamma(frame, spec.gamma)
    } else {
        Cow::Borrowed(frame)
    };

    if spec.equalize != EqualizeMode::None {
        let gray = current.to_gray();
        current = Cow::Owned(equalize(&gray, spec.equalize, &spec.clahe)?);
    }

    if spec.edges_enabled {
        current = Cow::Owned(detect_edges(&current)?);
    }

    Ok(current)
}

/// `{output_dir}/{basename}_enh.ser`
pub fn output_path_for(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    output_dir.join(format!("{stem}{OUTPUT_SUFFIX}.{OUTPUT_EXTENSION}"))
}

/// 8-bit output header matching the source geometry. The color id survives
/// only when the stages keep the channel layout.
pub(super) fn output_header(source: &SerHeader, spec: &EnhancementSpec) -> SerHeader {
    let color_id = if spec.preserves_color() {
        source.color_id
    } else {
        SER_COLOR_MONO
    };
    let mut header = SerHeader::eight_bit(source.width, source.height, color_id);
    header.observer = source.observer.clone();
    header.instrument = source.instrument.clone();
    header.telescope = source.telescope.clone();
    header.date_time = source.date_time;
    header.date_time_utc = source.date_time_utc;
    header
}
