use std::path::Path;

use image::imageops::{self, FilterType};
use tracing::debug;

use crate::error::{FrameError, Result};
use crate::frame::types::Frame;

/// Brings arbitrary photos to the output resolution with a "cover" fit:
/// uniform scale until the frame is filled, then a centered crop.
#[derive(Debug, Clone, Copy)]
pub struct FrameNormalizer {
    width: u32,
    height: u32,
}

impl FrameNormalizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn target(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Region of the source, `(left, top, width, height)`, that maps onto the target.
    ///
    /// A relatively wider source keeps its full height, anything else its
    /// full width; the other side is the target aspect rounded to the nearest
    /// source pixel and centered. Working in source pixels keeps the resize
    /// bounded by the output size whatever the input aspect ratio.
    pub fn crop_window(&self, src_width: u32, src_height: u32) -> (u32, u32, u32, u32) {
        let (sw, sh) = (src_width as u64, src_height as u64);
        let (tw, th) = (self.width as u64, self.height as u64);

        if sw * th > tw * sh {
            let width = ((2 * tw * sh + th) / (2 * th)).clamp(1, sw) as u32;
            ((src_width - width) / 2, 0, width, src_height)
        } else {
            let height = ((2 * th * sw + tw) / (2 * tw)).clamp(1, sh) as u32;
            (0, (src_height - height) / 2, src_width, height)
        }
    }

    /// Cover-fit a frame to the target resolution
    pub fn normalize(&self, frame: &Frame) -> Result<Frame> {
        let (src_width, src_height) = frame.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(FrameError::InvalidDimensions {
                width: src_width,
                height: src_height,
            }
            .into());
        }

        if frame.dimensions() == self.target() {
            return Ok(frame.clone());
        }

        let (left, top, width, height) = self.crop_window(src_width, src_height);
        debug!(
            "Cover fit {}x{}: window {}x{} at ({}, {}) -> {}x{}",
            src_width, src_height, width, height, left, top, self.width, self.height
        );

        let window = imageops::crop_imm(frame.as_image(), left, top, width, height).to_image();
        let scaled = imageops::resize(&window, self.width, self.height, FilterType::Lanczos3);

        Ok(Frame::new(scaled))
    }

    /// Decode `input`, cover-fit it and write it as JPEG to `output`
    pub fn normalize_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        quality: u8,
    ) -> Result<()> {
        let source = Frame::open(input)?;
        self.normalize(&source)?.save_jpeg(output, quality)
    }
}
