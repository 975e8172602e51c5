use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of exporting one input video.
#[derive(Clone, Debug, PartialEq)]
pub enum VideoStatus {
    /// Output written with this many frames.
    Written { frames: usize },
    /// Output created but the crop range held no frames.
    Empty,
    /// Source could not be opened, or decoding/encoding failed.
    Failed { reason: String },
    /// Cancelled mid-video; the output holds the frames written so far.
    Cancelled { frames: usize },
    /// Not started because the export was cancelled earlier.
    Skipped,
}

impl VideoStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

impl std::fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Written { frames } => write!(f, "written ({frames} frames)"),
            Self::Empty => write!(f, "empty (no frames in range)"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::Cancelled { frames } => write!(f, "cancelled after {frames} frames"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VideoOutcome {
    pub input: PathBuf,
    /// Output path, when one was created.
    pub output: Option<PathBuf>,
    pub status: VideoStatus,
}

/// Per-video results of a batch export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    pub output_dir: PathBuf,
    pub videos: Vec<VideoOutcome>,
}

impl ExportReport {
    pub fn succeeded(&self) -> usize {
        self.videos.iter().filter(|v| v.status.is_success()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.videos.len()
    }

    /// Human-readable summary naming the output directory.
    pub fn message(&self) -> String {
        if self.all_succeeded() {
            format!(
                "all enhanced videos saved successfully to {}",
                self.output_dir.display()
            )
        } else {
            format!(
                "{} of {} enhanced videos saved to {}",
                self.succeeded(),
                self.videos.len(),
                self.output_dir.display()
            )
        }
    }
}

/// Thread-safe progress reporting for batch export.
///
/// Progress is coarse: one update per finished video. All methods have
/// default no-op implementations.
pub trait ExportReporter: Send + Sync {
    /// Video `index` (0-based) of `total` is about to be processed.
    fn begin_video(&self, _index: usize, _total: usize, _input: &Path) {}

    /// A video finished; `percent` is `100 * completed / total`.
    fn finish_video(&self, _percent: u8, _outcome: &VideoOutcome) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ExportReporter for NoOpReporter {}

/// Adapts a plain `FnMut(u8)` progress callback.
pub(super) struct CallbackReporter<F>(pub(super) std::sync::Mutex<F>);

impl<F: FnMut(u8) + Send> ExportReporter for CallbackReporter<F> {
    fn finish_video(&self, percent: u8, _outcome: &VideoOutcome) {
        if let Ok(mut callback) = self.0.lock() {
            (callback)(percent);
        }
    }
}

/// Shared flag checked between frames to stop an export early.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear a previous cancellation so the token can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}
