//! Fixed-size RGBA raster owned by whichever component holds it

use crate::error::{EditorError, Result};
use image::{DynamicImage, Rgba, RgbaImage};

/// Number of channels per pixel (R, G, B, A)
pub const CHANNELS: usize = 4;

/// Round a float channel value to the nearest integer and clamp it into `0..=255`.
///
/// Halves round away from zero, so `0.5` becomes `1`.
#[inline]
#[must_use]
pub fn clamp_channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// A `width x height` RGBA raster with 8 bits per channel.
///
/// The backing vector always holds exactly `width * height * 4` bytes.
/// `Clone` produces a fully independent copy, so a buffer stored in the
/// edit history can never be altered through another handle.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zero-filled (transparent black) buffer
    ///
    /// # Errors
    /// - `InvalidParameter` when either dimension is zero
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = Self::checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Create a buffer where every pixel has the same color
    ///
    /// # Errors
    /// - `InvalidParameter` when either dimension is zero
    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Result<Self> {
        let len = Self::checked_len(width, height)?;
        let data = color.0.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap raw RGBA bytes without copying
    ///
    /// # Errors
    /// - `InvalidParameter` when either dimension is zero
    /// - `DimensionMismatch` when `data.len() != width * height * 4`
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = Self::checked_len(width, height)?;
        if data.len() != expected {
            return Err(EditorError::dimension_mismatch(expected, data.len()));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Take ownership of an `RgbaImage` without copying its pixels
    ///
    /// # Errors
    /// - `InvalidParameter` for an empty image
    pub fn from_rgba_image(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, image.into_raw())
    }

    /// Convert any decoded image into an RGBA buffer
    ///
    /// # Errors
    /// - `InvalidParameter` for an empty image
    pub fn from_dynamic_image(image: &DynamicImage) -> Result<Self> {
        Self::from_rgba_image(image.to_rgba8())
    }

    /// Give the pixels back as an `RgbaImage` without copying
    ///
    /// # Errors
    /// - `Internal` if the invariant `len == width * height * 4` was broken
    pub fn into_rgba_image(self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| EditorError::internal("pixel data does not match buffer dimensions"))
    }

    fn checked_len(width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(EditorError::invalid_parameter(format!(
                "buffer dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(CHANNELS))
            .ok_or_else(|| {
                EditorError::invalid_parameter(format!(
                    "buffer dimensions {}x{} overflow addressable memory",
                    width, height
                ))
            })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels (not channels)
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size of the channel data in bytes
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Whether `other` has the same width and height
    #[must_use]
    pub fn same_dimensions(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Interleaved RGBA channel data, row-major
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Mutable channel data. The length is fixed, so the size invariant holds.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Iterate pixels as 4-byte chunks
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(CHANNELS)
    }

    /// Iterate pixels mutably as 4-byte chunks
    pub fn pixels_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        self.data.chunks_exact_mut(CHANNELS)
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(EditorError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    /// Read the pixel at `(x, y)`
    ///
    /// # Errors
    /// - `OutOfBounds` when the coordinate lies outside the buffer
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Rgba<u8>> {
        let offset = self.offset(x, y)?;
        let mut pixel = [0u8; CHANNELS];
        pixel.copy_from_slice(&self.data[offset..offset + CHANNELS]);
        Ok(Rgba(pixel))
    }

    /// Write the pixel at `(x, y)`
    ///
    /// # Errors
    /// - `OutOfBounds` when the coordinate lies outside the buffer
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgba<u8>) -> Result<()> {
        let offset = self.offset(x, y)?;
        self.data[offset..offset + CHANNELS].copy_from_slice(&pixel.0);
        Ok(())
    }

    /// Write float channel values at `(x, y)`, rounding and clamping each into `0..=255`
    ///
    /// # Errors
    /// - `OutOfBounds` when the coordinate lies outside the buffer
    pub fn set_pixel_clamped(&mut self, x: u32, y: u32, channels: [f32; CHANNELS]) -> Result<()> {
        self.set_pixel(x, y, Rgba(channels.map(clamp_channel)))
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl TryFrom<RgbaImage> for PixelBuffer {
    type Error = EditorError;

    fn try_from(image: RgbaImage) -> Result<Self> {
        Self::from_rgba_image(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                buffer
                    .set_pixel(x, y, Rgba([(x * 20) as u8, (y * 20) as u8, 77, 255]))
                    .unwrap();
            }
        }
        buffer
    }

    #[test]
    fn test_new_is_zero_filled() {
        let buffer = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buffer.byte_len(), 3 * 2 * 4);
        assert!(buffer.as_raw().iter().all(|&c| c == 0));
        assert_eq!(buffer.pixel_count(), 6);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 5),
            Err(EditorError::InvalidParameter(_))
        ));
        assert!(matches!(
            PixelBuffer::new(5, 0),
            Err(EditorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_from_raw_length_checked() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            EditorError::DimensionMismatch {
                expected: 16,
                actual: 15
            }
        ));
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_get_set_pixel() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        buffer.set_pixel(3, 1, Rgba([1, 2, 3, 4])).unwrap();
        assert_eq!(buffer.get_pixel(3, 1).unwrap(), Rgba([1, 2, 3, 4]));
        assert_eq!(buffer.get_pixel(0, 0).unwrap(), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        assert!(matches!(
            buffer.get_pixel(4, 0),
            Err(EditorError::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(matches!(
            buffer.set_pixel(0, 9, Rgba([0; 4])),
            Err(EditorError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_set_pixel_clamped() {
        let mut buffer = PixelBuffer::new(1, 1).unwrap();
        buffer
            .set_pixel_clamped(0, 0, [-20.0, 300.0, 127.5, 254.4])
            .unwrap();
        assert_eq!(buffer.get_pixel(0, 0).unwrap(), Rgba([0, 255, 128, 254]));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = gradient(5, 5);
        let mut copy = original.clone();
        copy.set_pixel(2, 2, Rgba([9, 9, 9, 9])).unwrap();
        assert_ne!(original, copy);
        assert_eq!(original.get_pixel(2, 2).unwrap(), Rgba([40, 40, 77, 255]));

        let twice = original.clone().clone();
        assert_eq!(twice, original);
    }

    #[test]
    fn test_filled() {
        let buffer = PixelBuffer::filled(3, 3, Rgba([10, 20, 30, 40])).unwrap();
        assert!(buffer.pixels().all(|p| p == [10, 20, 30, 40]));
    }

    #[test]
    fn test_rgba_image_conversion_round_trip() {
        let buffer = gradient(6, 3);
        let image = buffer.clone().into_rgba_image().unwrap();
        assert_eq!(image.dimensions(), (6, 3));
        assert_eq!(image.get_pixel(2, 1), &Rgba([40, 20, 77, 255]));
        let back = PixelBuffer::try_from(image).unwrap();
        assert_eq!(back, buffer);
    }

    #[test]
    fn test_clamp_channel() {
        assert_eq!(clamp_channel(-0.4), 0);
        assert_eq!(clamp_channel(0.5), 1);
        assert_eq!(clamp_channel(254.6), 255);
        assert_eq!(clamp_channel(1000.0), 255);
        assert_eq!(clamp_channel(f32::NAN), 0);
    }
}
