//! Single-frame preview and interactive tuning.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::detection::canny::detect_edges;
use crate::error::{Result, VidhanceError};
use crate::filters::clahe::ClaheParams;
use crate::filters::histogram::{equalize, Histogram};
use crate::filters::levels::{apply_gamma, GammaLevel};
use crate::filters::sharpen::sharpen;
use crate::frame::Frame;
use crate::io::ser::SerReader;
use crate::pipeline::config::EqualizeMode;

/// Advisory shown when equalization is requested without a fresh histogram.
pub const HISTOGRAM_NOT_READY: &str = "histogram needs to be calculated first!";

/// Read one frame, reopening the container on every call.
///
/// Returns the frame and the source's total frame count.
pub fn get_frame(path: &Path, index: usize) -> Result<(Frame, usize)> {
    let reader = SerReader::open(path).map_err(|e| VidhanceError::SourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let total = reader.frame_count();
    let frame = reader.read_frame(index)?;
    Ok((frame, total))
}

/// Histogram tagged with the working-frame generation it was computed for.
#[derive(Clone, Debug)]
struct TaggedHistogram {
    generation: u64,
    histogram: Histogram,
}

/// State of an interactive preview.
///
/// Every operation returns an updated session and leaves the receiver
/// untouched, so a failed step keeps the previous state usable. The working
/// frame starts as the decoded frame and accumulates edits; each edit bumps a
/// generation counter so a histogram computed for an older working frame is
/// never used to equalize a newer one.
#[derive(Clone, Debug)]
pub struct PreviewSession {
    source: PathBuf,
    frame_index: usize,
    total_frames: usize,
    original: Frame,
    working: Frame,
    generation: u64,
    histogram: Option<TaggedHistogram>,
    gamma: GammaLevel,
}

impl PreviewSession {
    /// Open `source` at `frame_index`.
    pub fn load(source: &Path, frame_index: usize) -> Result<Self> {
        let (frame, total_frames) = get_frame(source, frame_index)?;
        debug!(source = %source.display(), frame_index, total_frames, "Preview loaded");
        Ok(Self {
            source: source.to_path_buf(),
            frame_index,
            total_frames,
            working: frame.clone(),
            original: frame,
            generation: 0,
            histogram: None,
            gamma: GammaLevel::NEUTRAL,
        })
    }

    /// Move to another frame of the same source. Edits are discarded.
    pub fn seek(&self, frame_index: usize) -> Result<Self> {
        Self::load(&self.source, frame_index)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn original(&self) -> &Frame {
        &self.original
    }

    /// The frame with all edits applied so far.
    pub fn current(&self) -> &Frame {
        &self.working
    }

    pub fn gamma(&self) -> GammaLevel {
        self.gamma
    }

    /// Histogram of the current working frame, if one is up to date.
    pub fn histogram(&self) -> Option<&Histogram> {
        self.histogram
            .as_ref()
            .filter(|h| h.generation == self.generation)
            .map(|h| &h.histogram)
    }

    /// Re-derive the working frame from the original with a new gamma.
    pub fn with_gamma(&self, level: GammaLevel) -> Self {
        let working = apply_gamma(&self.original, level).into_owned();
        Self {
            gamma: level,
            ..self.replace_working(working)
        }
    }

    /// Compute the histogram of the working frame (converted to gray).
    pub fn compute_histogram(&self) -> Result<Self> {
        let mut next = if self.working.is_gray() {
            self.clone()
        } else {
            self.replace_working(self.working.to_gray())
        };
        let histogram = Histogram::of(&next.working)?;
        next.histogram = Some(TaggedHistogram {
            generation: next.generation,
            histogram,
        });
        Ok(next)
    }

    /// Equalize the working frame.
    ///
    /// Fails with `NotReady` unless `compute_histogram` ran on the current
    /// working frame. The histogram is consumed: equalizing again requires a
    /// new one.
    pub fn equalize(&self, mode: EqualizeMode, params: &ClaheParams) -> Result<Self> {
        if self.histogram().is_none() {
            return Err(VidhanceError::NotReady(HISTOGRAM_NOT_READY.into()));
        }
        let equalized = equalize(&self.working, mode, params)?;
        Ok(self.replace_working(equalized))
    }

    /// Replace the working frame with its edge map.
    pub fn with_edges(&self) -> Result<Self> {
        let edges = detect_edges(&self.working)?;
        Ok(self.replace_working(edges))
    }

    /// Sharpen the working frame.
    pub fn sharpened(&self) -> Self {
        let sharpened = sharpen(&self.working);
        self.replace_working(sharpened)
    }

    /// Drop all edits.
    pub fn reset(&self) -> Self {
        Self {
            gamma: GammaLevel::NEUTRAL,
            ..self.replace_working(self.original.clone())
        }
    }

    fn replace_working(&self, working: Frame) -> Self {
        Self {
            source: self.source.clone(),
            frame_index: self.frame_index,
            total_frames: self.total_frames,
            original: self.original.clone(),
            working,
            generation: self.generation + 1,
            histogram: None,
            gamma: self.gamma,
        }
    }
}
