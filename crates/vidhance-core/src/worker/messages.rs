use std::path::PathBuf;
use std::time::Duration;

use crate::filters::clahe::ClaheParams;
use crate::filters::histogram::Histogram;
use crate::filters::levels::GammaLevel;
use crate::frame::Frame;
use crate::pipeline::config::{EqualizeMode, ExportConfig};
use crate::pipeline::{ExportReport, VideoOutcome};

/// Commands sent from the caller to the worker thread.
#[derive(Clone, Debug)]
pub enum WorkerCommand {
    /// Decode one frame and start a fresh preview session on it.
    LoadPreview { path: PathBuf, frame_index: usize },

    /// Re-apply gamma to the previewed frame.
    SetGamma { level: GammaLevel },

    /// Compute the histogram of the working frame.
    ComputeHistogram,

    /// Equalize the working frame (requires a fresh histogram).
    Equalize { mode: EqualizeMode, clahe: ClaheParams },

    /// Replace the working frame with its edge map.
    DetectEdges,

    /// Sharpen the working frame.
    Sharpen,

    /// Discard all preview edits.
    ResetPreview,

    /// Export every input video.
    Export { config: ExportConfig },
}

/// Results sent from the worker thread back to the caller.
#[derive(Clone, Debug)]
pub enum WorkerResult {
    /// The working preview frame changed.
    Preview {
        frame: Frame,
        index: usize,
        total_frames: usize,
    },

    HistogramReady { histogram: Histogram },

    /// A user-facing advisory; the session is unchanged.
    NotReady { message: String },

    ExportStarted { total: usize },

    /// One video finished.
    ExportProgress { percent: u8, outcome: VideoOutcome },

    ExportComplete {
        report: ExportReport,
        elapsed: Duration,
    },

    Error { message: String },

    Log { message: String },
}
