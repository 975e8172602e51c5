use std::path::Path;
use std::sync::mpsc;

use crate::pipeline::{ExportReporter, VideoOutcome};

use super::messages::WorkerResult;

/// Export reporter that forwards per-video progress over a channel.
pub struct ChannelReporter {
    tx: mpsc::Sender<WorkerResult>,
}

impl ChannelReporter {
    pub fn new(tx: mpsc::Sender<WorkerResult>) -> Self {
        Self { tx }
    }
}

impl ExportReporter for ChannelReporter {
    fn begin_video(&self, index: usize, total: usize, input: &Path) {
        let _ = self.tx.send(WorkerResult::Log {
            message: format!("[{}/{}] {}", index + 1, total, input.display()),
        });
    }

    fn finish_video(&self, percent: u8, outcome: &VideoOutcome) {
        let _ = self.tx.send(WorkerResult::ExportProgress {
            percent,
            outcome: outcome.clone(),
        });
    }
}
