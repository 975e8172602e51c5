use ndarray::{Array2, Array3, ArrayView2, Axis};
use std::path::PathBuf;

use crate::consts::{COLOR_CHANNEL_COUNT, LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::error::{Result, VidhanceError};

/// Sample layout of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Gray,
    Rgb,
    Bgr,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb | Self::Bgr => COLOR_CHANNEL_COUNT,
        }
    }
}

/// A single 8-bit video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Sample data, shape = (height, width, channels)
    pub data: Array3<u8>,
    pub format: PixelFormat,
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array3<u8>, format: PixelFormat) -> Self {
        debug_assert_eq!(data.dim().2, format.channels());
        Self {
            data,
            format,
            metadata: FrameMetadata::default(),
        }
    }

    /// Build a single-channel frame from a 2-D array.
    pub fn from_gray(data: Array2<u8>) -> Self {
        Self::new(data.insert_axis(Axis(2)), PixelFormat::Gray)
    }

    /// Same geometry and metadata, new samples.
    pub fn with_data(&self, data: Array3<u8>, format: PixelFormat) -> Self {
        Self {
            data,
            format,
            metadata: self.metadata.clone(),
        }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn is_gray(&self) -> bool {
        self.format == PixelFormat::Gray
    }

    /// View of the only plane of a gray frame.
    pub fn gray_plane(&self) -> Result<ArrayView2<'_, u8>> {
        if !self.is_gray() {
            return Err(VidhanceError::ChannelMismatch {
                expected: 1,
                actual: self.channels(),
            });
        }
        Ok(self.data.index_axis(Axis(2), 0))
    }

    /// Convert to a gray frame using BT.601 luminance. Gray frames are cloned.
    pub fn to_gray(&self) -> Frame {
        let (r, g, b) = match self.format {
            PixelFormat::Gray => return self.clone(),
            PixelFormat::Rgb => (0, 1, 2),
            PixelFormat::Bgr => (2, 1, 0),
        };
        let (h, w, _) = self.data.dim();
        let gray = Array2::from_shape_fn((h, w), |(row, col)| {
            let v = LUMINANCE_R * self.data[[row, col, r]] as f32
                + LUMINANCE_G * self.data[[row, col, g]] as f32
                + LUMINANCE_B * self.data[[row, col, b]] as f32;
            v.round().clamp(0.0, 255.0) as u8
        });
        self.with_data(gray.insert_axis(Axis(2)), PixelFormat::Gray)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameMetadata {
    pub frame_index: usize,
    /// Raw SER trailer timestamp (100 ns ticks), when present.
    pub timestamp: Option<u64>,
}

/// Color/Bayer mode of the source data.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ColorMode {
    Mono,
    BayerRGGB,
    BayerGRBG,
    BayerGBRG,
    BayerBGGR,
    RGB,
    BGR,
}

/// Metadata about the source file.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub filename: PathBuf,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_mode: ColorMode,
    /// Derived from the timestamp trailer, if the file carries one.
    pub frame_rate: Option<f64>,
    pub observer: Option<String>,
    pub telescope: Option<String>,
    pub instrument: Option<String>,
}
