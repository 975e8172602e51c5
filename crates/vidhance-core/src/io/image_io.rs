use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use ndarray::Array3;

use crate::error::{Result, VidhanceError};
use crate::frame::{Frame, PixelFormat};

/// Convert a frame into an `image` buffer (BGR is swizzled to RGB).
pub fn frame_to_image(frame: &Frame) -> Result<DynamicImage> {
    let (h, w, _) = frame.data.dim();
    let invalid = || VidhanceError::InvalidDimensions {
        width: w as u32,
        height: h as u32,
    };

    match frame.format {
        PixelFormat::Gray => {
            let pixels: Vec<u8> = frame.data.iter().copied().collect();
            let img = GrayImage::from_raw(w as u32, h as u32, pixels).ok_or_else(invalid)?;
            Ok(DynamicImage::ImageLuma8(img))
        }
        PixelFormat::Rgb | PixelFormat::Bgr => {
            let swap = frame.format == PixelFormat::Bgr;
            let mut pixels = Vec::with_capacity(h * w * 3);
            for row in 0..h {
                for col in 0..w {
                    let px = [
                        frame.data[[row, col, 0]],
                        frame.data[[row, col, 1]],
                        frame.data[[row, col, 2]],
                    ];
                    if swap {
                        pixels.extend_from_slice(&[px[2], px[1], px[0]]);
                    } else {
                        pixels.extend_from_slice(&px);
                    }
                }
            }
            let img = RgbImage::from_raw(w as u32, h as u32, pixels).ok_or_else(invalid)?;
            Ok(DynamicImage::ImageRgb8(img))
        }
    }
}

/// Save a frame as 8-bit PNG.
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    frame_to_image(frame)?.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save frame, choosing format from file extension (PNG when unknown).
pub fn save_image(frame: &Frame, path: &Path) -> Result<()> {
    match ImageFormat::from_path(path) {
        Ok(format) => frame_to_image(frame)?.save_with_format(path, format)?,
        Err(_) => save_png(frame, path)?,
    }
    Ok(())
}

/// Load a still image as a frame. Images with color become RGB frames.
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    if img.color().has_color() {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        let data = Array3::from_shape_vec((h as usize, w as usize, 3), rgb.into_raw())
            .map_err(|_| VidhanceError::InvalidDimensions { width: w, height: h })?;
        Ok(Frame::new(data, PixelFormat::Rgb))
    } else {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        let data = Array3::from_shape_vec((h as usize, w as usize, 1), gray.into_raw())
            .map_err(|_| VidhanceError::InvalidDimensions { width: w, height: h })?;
        Ok(Frame::new(data, PixelFormat::Gray))
    }
}
