use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageBuffer, Rgb, RgbImage};

use crate::error::{FrameError, Result};

/// A single RGB still frame
///
/// Thin wrapper around an RGB image buffer; every frame handed to the
/// encoder has exactly the configured output resolution.
#[derive(Clone, Debug)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb(color));
        Self { buffer }
    }

    /// Decode an image file into a frame, dropping any alpha channel
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| FrameError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(image.to_rgb8()))
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Consume the frame and return its buffer
    pub fn into_image(self) -> RgbImage {
        self.buffer
    }

    /// Save the frame as a JPEG file at the given quality (1-100)
    pub fn save_jpeg<P: AsRef<Path>>(&self, path: P, quality: u8) -> Result<()> {
        let path = path.as_ref();
        let encode_failed = |reason: String| FrameError::EncodeFailed {
            path: path.display().to_string(),
            reason,
        };

        let file = File::create(path).map_err(|e| encode_failed(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, quality)
            .encode(
                self.buffer.as_raw(),
                self.width(),
                self.height(),
                ColorType::Rgb8,
            )
            .map_err(|e| encode_failed(e.to_string()))?;
        writer.flush().map_err(|e| encode_failed(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_filled_frame() {
        let frame = Frame::new_filled(8, 4, [10, 20, 30]);
        assert_eq!(frame.dimensions(), (8, 4));
        assert_eq!(frame.get_pixel(7, 3), [10, 20, 30]);
    }

    #[test]
    fn test_jpeg_save_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.jpg");

        Frame::new_filled(64, 36, [200, 100, 50]).save_jpeg(&path, 95).unwrap();
        let reopened = Frame::open(&path).unwrap();

        assert_eq!(reopened.dimensions(), (64, 36));
        let [r, g, b] = reopened.get_pixel(32, 18);
        assert!((r as i32 - 200).abs() < 6);
        assert!((g as i32 - 100).abs() < 6);
        assert!((b as i32 - 50).abs() < 6);
    }

    #[test]
    fn test_open_missing_file() {
        let result = Frame::open("/no/such/frame.png");
        assert!(matches!(
            result,
            Err(crate::error::ReelError::Frame(FrameError::DecodeFailed { .. }))
        ));
    }
}
