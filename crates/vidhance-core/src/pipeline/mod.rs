pub mod config;
mod helpers;
mod orchestrator;
mod types;

pub use helpers::{enhance_frame, output_path_for};
pub use orchestrator::{export_videos, export_videos_reported};
pub use types::{
    CancelToken, ExportReport, ExportReporter, NoOpReporter, VideoOutcome, VideoStatus,
};
