use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidhanceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Cannot open video source {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("Frame {index} unavailable (total: {total})")]
    FrameUnavailable { index: usize, total: usize },

    #[error("{0}")]
    NotReady(String),

    #[error("Expected {expected} channel(s), got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Worker error: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, VidhanceError>;
