//! Frame data structures for captured camera content

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::path::Path;
use std::time::Instant;

use super::CaptureError;

/// A captured frame from the camera
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl CapturedFrame {
    /// Create a new captured frame
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Build a frame from a decoded image
    pub fn from_image(image: DynamicImage) -> Self {
        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(rgba.into_raw(), width, height)
    }

    /// Decode an image file into a frame
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        Ok(Self::from_image(image::open(path)?))
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// View the pixels as an RGBA image
    pub fn to_rgba_image(&self) -> Result<RgbaImage, CaptureError> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            CaptureError::Encode(format!(
                "buffer of {} bytes does not hold a {}x{} RGBA frame",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Compress the frame to JPEG at the given resolution.
    ///
    /// The frame is stretched when its size differs from `width` x `height`,
    /// so word boxes reported by the service are always in that space.
    pub fn encode_jpeg(&self, width: u32, height: u32, quality: u8) -> Result<Vec<u8>, CaptureError> {
        let mut rgba = self.to_rgba_image()?;
        if rgba.dimensions() != (width, height) {
            rgba = image::imageops::resize(&rgba, width, height, FilterType::Triangle);
        }
        let rgb = DynamicImage::ImageRgba8(rgba).into_rgb8();

        let mut payload = Vec::new();
        JpegEncoder::new_with_quality(&mut payload, quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32) -> CapturedFrame {
        CapturedFrame::new(vec![200; (width * height * 4) as usize], width, height)
    }

    #[test]
    fn test_encode_jpeg_resizes_to_preset() {
        let frame = solid_frame(64, 32);
        let payload = frame.encode_jpeg(18, 32, 85).unwrap();

        assert_eq!(&payload[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&payload).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (18, 32));
    }

    #[test]
    fn test_encode_jpeg_rejects_short_buffer() {
        let frame = CapturedFrame::new(vec![0; 10], 8, 8);
        assert!(matches!(frame.encode_jpeg(8, 8, 85), Err(CaptureError::Encode(_))));
    }

    #[test]
    fn test_dimensions() {
        let frame = solid_frame(3, 5);
        assert_eq!(frame.dimensions(), (3, 5));
    }
}
