use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array3;

use crate::consts::SER_TICKS_PER_SECOND;
use crate::error::{Result, VidhanceError};
use crate::frame::{ColorMode, Frame, FrameMetadata, PixelFormat, SourceInfo};

pub const SER_HEADER_SIZE: usize = 178;
pub const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// Byte offset of the FrameCount field inside the header.
pub(crate) const SER_FRAME_COUNT_OFFSET: u64 = 38;

pub const SER_COLOR_MONO: i32 = 0;
pub const SER_COLOR_RGB: i32 = 100;
pub const SER_COLOR_BGR: i32 = 101;

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerHeader {
    /// Header for an 8-bit stream; the frame count is filled in on finalize.
    pub fn eight_bit(width: u32, height: u32, color_id: i32) -> Self {
        Self {
            color_id,
            little_endian: true,
            width,
            height,
            pixel_depth: 8,
            frame_count: 0,
            observer: String::new(),
            instrument: String::new(),
            telescope: String::new(),
            date_time: 0,
            date_time_utc: 0,
        }
    }

    /// Bytes per pixel plane (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_pixel_plane(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    /// Number of planes per pixel (1 for mono/bayer, 3 for RGB/BGR).
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            SER_COLOR_RGB | SER_COLOR_BGR => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame, or `None` if the dimensions overflow.
    pub fn checked_frame_byte_size(&self) -> Option<usize> {
        let pixels = (self.width as usize).checked_mul(self.height as usize)?;
        pixels.checked_mul(self.bytes_per_pixel_plane() * self.planes_per_pixel())
    }

    /// Total bytes per frame.
    pub fn frame_byte_size(&self) -> usize {
        self.checked_frame_byte_size().unwrap_or(usize::MAX)
    }

    pub fn color_mode(&self) -> ColorMode {
        match self.color_id {
            0 => ColorMode::Mono,
            8 => ColorMode::BayerRGGB,
            9 => ColorMode::BayerGRBG,
            10 => ColorMode::BayerGBRG,
            11 => ColorMode::BayerBGGR,
            SER_COLOR_RGB => ColorMode::RGB,
            SER_COLOR_BGR => ColorMode::BGR,
            _ => ColorMode::Mono,
        }
    }

    /// Layout of decoded frames. Bayer mosaics decode as a single gray plane.
    pub fn pixel_format(&self) -> PixelFormat {
        match self.color_id {
            SER_COLOR_RGB => PixelFormat::Rgb,
            SER_COLOR_BGR => PixelFormat::Bgr,
            _ => PixelFormat::Gray,
        }
    }
}

/// Memory-mapped SER file reader.
pub struct SerReader {
    mmap: Mmap,
    pub header: SerHeader,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and lives as long as the reader.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(VidhanceError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }

        if &mmap[0..14] != SER_MAGIC {
            return Err(VidhanceError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;

        let frame_bytes = header.checked_frame_byte_size().ok_or_else(|| {
            VidhanceError::InvalidSer("Frame size calculation overflow".into())
        })?;
        let expected_data_size = frame_bytes
            .checked_mul(header.frame_count as usize)
            .and_then(|n| n.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| VidhanceError::InvalidSer("Data size overflow".into()))?;
        if mmap.len() < expected_data_size {
            return Err(VidhanceError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected_data_size,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Get the raw bytes for a single frame (zero-copy from mmap).
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let count = self.frame_count();
        if index >= count {
            return Err(VidhanceError::FrameUnavailable {
                index,
                total: count,
            });
        }
        let offset = SER_HEADER_SIZE + index * self.header.frame_byte_size();
        let end = offset + self.header.frame_byte_size();
        Ok(&self.mmap[offset..end])
    }

    /// Decode a single frame to 8-bit samples.
    pub fn read_frame(&self, index: usize) -> Result<Frame> {
        let raw = self.frame_raw(index)?;
        let h = self.header.height as usize;
        let w = self.header.width as usize;
        let planes = self.header.planes_per_pixel();

        let samples = if self.header.bytes_per_pixel_plane() == 1 {
            raw.to_vec()
        } else {
            narrow_to_8bit(raw, self.header.pixel_depth, self.header.little_endian)
        };

        let data = Array3::from_shape_vec((h, w, planes), samples).map_err(|e| {
            VidhanceError::InvalidSer(format!("Frame {index} has unexpected layout: {e}"))
        })?;

        let mut frame = Frame::new(data, self.header.pixel_format());
        frame.metadata = FrameMetadata {
            frame_index: index,
            timestamp: self.timestamp(index),
        };
        Ok(frame)
    }

    /// Per-frame timestamp from the optional trailer.
    pub fn timestamp(&self, index: usize) -> Option<u64> {
        let trailer_offset =
            SER_HEADER_SIZE + self.header.frame_byte_size() * self.header.frame_count as usize;
        let ts_offset = trailer_offset + index * 8;
        if ts_offset + 8 <= self.mmap.len() {
            let bytes = &self.mmap[ts_offset..ts_offset + 8];
            Some(u64::from_le_bytes(bytes.try_into().ok()?))
        } else {
            None
        }
    }

    /// Average frame rate implied by the timestamp trailer.
    pub fn frame_rate(&self) -> Option<f64> {
        let count = self.frame_count();
        if count < 2 {
            return None;
        }
        let first = self.timestamp(0)?;
        let last = self.timestamp(count - 1)?;
        if last <= first {
            return None;
        }
        let seconds = (last - first) as f64 / SER_TICKS_PER_SECOND;
        Some((count - 1) as f64 / seconds)
    }

    /// Build SourceInfo from the header.
    pub fn source_info(&self, path: &Path) -> SourceInfo {
        SourceInfo {
            filename: path.to_path_buf(),
            total_frames: self.frame_count(),
            width: self.header.width,
            height: self.header.height,
            bit_depth: self.header.pixel_depth as u8,
            color_mode: self.header.color_mode(),
            frame_rate: self.frame_rate(),
            observer: non_empty(&self.header.observer),
            telescope: non_empty(&self.header.telescope),
            instrument: non_empty(&self.header.instrument),
        }
    }

    /// Sequential iterator over frames `start..end`.
    pub fn frames(&self, start: usize, end: usize) -> impl Iterator<Item = Result<Frame>> + '_ {
        (start..end.min(self.frame_count())).map(move |i| self.read_frame(i))
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    let mut cursor = std::io::Cursor::new(&buf[162..]);
    let date_time = cursor.read_u64::<LittleEndian>()?;
    let date_time_utc = cursor.read_u64::<LittleEndian>()?;

    if width == 0 || height == 0 {
        return Err(VidhanceError::InvalidDimensions { width, height });
    }

    if pixel_depth == 0 || pixel_depth > 16 {
        return Err(VidhanceError::InvalidSer(format!(
            "Unsupported pixel depth {pixel_depth}"
        )));
    }

    // Treat 0 as little-endian: most capture software writes 0 for LE data.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
        observer,
        instrument,
        telescope,
        date_time,
        date_time_utc,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Keep the top 8 significant bits of 9-16 bit samples.
fn narrow_to_8bit(raw: &[u8], bit_depth: u32, little_endian: bool) -> Vec<u8> {
    let shift = bit_depth.saturating_sub(8);
    raw.chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            let v = if little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            };
            (v >> shift).min(255) as u8
        })
        .collect()
}
