//! Captured design image

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

/// Encoded PNG of the rendered straw at the canonical pose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotImage {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded bytes
    pub png: Vec<u8>,
}

impl SnapshotImage {
    /// Encode tightly packed RGBA8 pixels
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SnapshotError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(SnapshotError::Size {
                width,
                height,
                len: pixels.len(),
            });
        }
        let image = RgbaImage::from_raw(width, height, pixels).ok_or(SnapshotError::Size {
            width,
            height,
            len: expected,
        })?;
        Self::from_image(&image)
    }

    /// Encode an image
    pub fn from_image(image: &RgbaImage) -> Result<Self, SnapshotError> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| SnapshotError::Encode(e.to_string()))?;
        Ok(Self {
            width: image.width(),
            height: image.height(),
            png,
        })
    }

    /// Decode back to pixels
    pub fn to_image(&self) -> Result<RgbaImage, SnapshotError> {
        image::load_from_memory_with_format(&self.png, ImageFormat::Png)
            .map(|image| image.to_rgba8())
            .map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    /// Default download file name
    pub fn file_name() -> &'static str {
        "straw-design.png"
    }
}

/// Snapshot encoding errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SnapshotError {
    #[error("Pixel buffer of {len} bytes does not match {width}x{height} RGBA")]
    Size { width: u32, height: u32, len: usize },
    #[error("PNG encode error: {0}")]
    Encode(String),
    #[error("PNG decode error: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png() {
        let pixels: Vec<u8> = (0..4 * 4).flat_map(|i| [i as u8 * 16, 0, 255, 255]).collect();
        let snapshot = SnapshotImage::from_rgba(4, 4, pixels.clone()).unwrap();
        assert_eq!(&snapshot.png[1..4], b"PNG");
        assert_eq!(snapshot.to_image().unwrap().into_raw(), pixels);
    }

    #[test]
    fn test_size_mismatch() {
        assert!(matches!(
            SnapshotImage::from_rgba(4, 4, vec![0; 10]),
            Err(SnapshotError::Size { .. })
        ));
        assert!(SnapshotImage::from_rgba(0, 0, Vec::new()).is_err());
    }
}
