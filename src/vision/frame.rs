use anyhow::{bail, Result};

/// One camera frame: an immutable RGBA grid. Frames are consumed per tick and
/// never retained, so this is a plain owned buffer with no interior reuse.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a raw RGBA buffer. The buffer length must be exactly
    /// `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            bail!(
                "rgba buffer length {} does not match {}x{} frame (expected {})",
                data.len(),
                width,
                height,
                expected
            );
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode an encoded image (PNG, JPEG, ...) into a frame.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            data: img.into_raw(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// RGB channels of the pixel at (x, y). Alpha is ignored by the pipeline.
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(Frame::from_rgba(4, 4, vec![0u8; 10]).is_err());
        assert!(Frame::from_rgba(4, 4, vec![0u8; 64]).is_ok());
    }

    #[test]
    fn pixel_access_is_row_major() {
        let mut data = vec![0u8; 2 * 2 * 4];
        // Pixel (1, 0) = red
        data[4] = 255;
        // Pixel (0, 1) = green
        data[9] = 255;
        let frame = Frame::from_rgba(2, 2, data).unwrap();
        assert_eq!(frame.rgb(1, 0), (255, 0, 0));
        assert_eq!(frame.rgb(0, 1), (0, 255, 0));
        assert_eq!(frame.rgb(1, 1), (0, 0, 0));
    }
}
