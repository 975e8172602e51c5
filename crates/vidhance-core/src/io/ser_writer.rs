use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Result, VidhanceError};
use crate::frame::Frame;
use crate::io::ser::{SerHeader, SER_FRAME_COUNT_OFFSET, SER_HEADER_SIZE, SER_MAGIC};

/// Streams 8-bit frames into a SER file.
///
/// The header is written up front with the count it was given; `finalize`
/// appends the timestamp trailer and patches the real frame count in.
pub struct SerWriter {
    writer: BufWriter<File>,
    header: SerHeader,
    frames_written: u32,
    timestamps: Vec<u64>,
    timestamps_complete: bool,
}

impl SerWriter {
    /// Create a new SER file and write the header.
    pub fn create(path: &Path, header: &SerHeader) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, header)?;
        Ok(Self {
            writer,
            header: header.clone(),
            frames_written: 0,
            timestamps: Vec::new(),
            timestamps_complete: true,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written as usize
    }

    /// Write a single raw frame (bytes must match the header's frame_byte_size).
    pub fn write_raw_frame(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != self.header.frame_byte_size() {
            return Err(VidhanceError::InvalidSer(format!(
                "Frame is {} bytes, header expects {}",
                data.len(),
                self.header.frame_byte_size()
            )));
        }
        self.writer.write_all(data)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Append a decoded frame. Its geometry must match the header.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.width() != self.header.width as usize
            || frame.height() != self.header.height as usize
        {
            return Err(VidhanceError::InvalidDimensions {
                width: frame.width() as u32,
                height: frame.height() as u32,
            });
        }
        if frame.channels() != self.header.planes_per_pixel() {
            return Err(VidhanceError::ChannelMismatch {
                expected: self.header.planes_per_pixel(),
                actual: frame.channels(),
            });
        }

        match frame.data.as_slice() {
            Some(bytes) => self.write_raw_frame(bytes)?,
            None => {
                let bytes: Vec<u8> = frame.data.iter().copied().collect();
                self.write_raw_frame(&bytes)?;
            }
        }

        match frame.metadata.timestamp {
            Some(ts) => self.timestamps.push(ts),
            None => self.timestamps_complete = false,
        }
        Ok(())
    }

    /// Flush, write the trailer, and patch the frame count. Returns frames written.
    pub fn finalize(mut self) -> Result<usize> {
        if self.timestamps_complete && !self.timestamps.is_empty() {
            for ts in &self.timestamps {
                self.writer.write_all(&ts.to_le_bytes())?;
            }
        }
        self.writer.seek(SeekFrom::Start(SER_FRAME_COUNT_OFFSET))?;
        self.writer
            .write_all(&(self.frames_written as i32).to_le_bytes())?;
        self.writer.flush()?;
        Ok(self.frames_written as usize)
    }
}

fn write_header(w: &mut impl Write, header: &SerHeader) -> Result<()> {
    // Magic (14 bytes)
    w.write_all(SER_MAGIC)?;
    // LuID (4 bytes)
    w.write_all(&0i32.to_le_bytes())?;
    // ColorID (4 bytes)
    w.write_all(&header.color_id.to_le_bytes())?;
    // LittleEndian flag: 0 = little-endian
    let le_flag: i32 = if header.little_endian { 0 } else { 1 };
    w.write_all(&le_flag.to_le_bytes())?;
    // Width (4 bytes)
    w.write_all(&(header.width as i32).to_le_bytes())?;
    // Height (4 bytes)
    w.write_all(&(header.height as i32).to_le_bytes())?;
    // PixelDepth (4 bytes)
    w.write_all(&(header.pixel_depth as i32).to_le_bytes())?;
    // FrameCount (4 bytes)
    w.write_all(&(header.frame_count as i32).to_le_bytes())?;
    // Observer (40 bytes)
    write_fixed_string(w, &header.observer, 40)?;
    // Instrument (40 bytes)
    write_fixed_string(w, &header.instrument, 40)?;
    // Telescope (40 bytes)
    write_fixed_string(w, &header.telescope, 40)?;
    // DateTime (8 bytes)
    w.write_all(&header.date_time.to_le_bytes())?;
    // DateTimeUTC (8 bytes)
    w.write_all(&header.date_time_utc.to_le_bytes())?;

    debug_assert_eq!(
        14 + 4 + 4 + 4 + 4 + 4 + 4 + 4 + 40 + 40 + 40 + 8 + 8,
        SER_HEADER_SIZE
    );
    Ok(())
}

fn write_fixed_string(w: &mut impl Write, s: &str, len: usize) -> Result<()> {
    let bytes = s.as_bytes();
    let to_write = bytes.len().min(len);
    w.write_all(&bytes[..to_write])?;
    w.write_all(&vec![0u8; len - to_write])?;
    Ok(())
}
