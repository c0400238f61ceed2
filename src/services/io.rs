//! Image I/O operations service
//!
//! Decoding and encoding live here so the session and transforms never touch
//! the filesystem.

use crate::buffer::PixelBuffer;
use crate::error::Result;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Service for reading images into buffers and writing buffers back out
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Falls back to content sniffing when the extension does not match the data.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use imgly_editor::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("input.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// # Errors
    /// - `Io` when the file cannot be read
    /// - `Image` when neither extension nor content identify a decodable format
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );
                let data = std::fs::read(path_ref)?;
                Self::load_from_bytes(&data)
            },
        }
    }

    /// Decode an in-memory encoded image
    ///
    /// # Errors
    /// - `Image` for unsupported or corrupt data
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory(bytes)?)
    }

    /// Target dimensions scaling `(width, height)` down to fit `max`, keeping aspect ratio.
    ///
    /// Images already within bounds keep their size; scaled sizes are floored
    /// and never drop below one pixel.
    #[must_use]
    pub fn fit_within(width: u32, height: u32, max: (u32, u32)) -> (u32, u32) {
        let (max_width, max_height) = max;
        if width <= max_width && height <= max_height {
            return (width, height);
        }
        let ratio = (f64::from(max_width) / f64::from(width))
            .min(f64::from(max_height) / f64::from(height));
        let scaled_width = (f64::from(width) * ratio).floor().max(1.0) as u32;
        let scaled_height = (f64::from(height) * ratio).floor().max(1.0) as u32;
        (scaled_width, scaled_height)
    }

    /// Convert a decoded image to a buffer, scaling it down to fit `max_dimensions` if given
    ///
    /// # Errors
    /// - `InvalidParameter` for an empty image
    pub fn to_buffer(image: &DynamicImage, max_dimensions: Option<(u32, u32)>) -> Result<PixelBuffer> {
        let (width, height) = (image.width(), image.height());
        let Some(max) = max_dimensions else {
            return PixelBuffer::from_dynamic_image(image);
        };

        let target = Self::fit_within(width, height, max);
        if target == (width, height) {
            return PixelBuffer::from_dynamic_image(image);
        }
        log::debug!(
            "Scaling {}x{} image to {}x{} on ingestion",
            width,
            height,
            target.0,
            target.1
        );
        let resized = image.resize_exact(target.0, target.1, FilterType::Triangle);
        PixelBuffer::from_dynamic_image(&resized)
    }

    /// Load a file straight into a buffer
    ///
    /// # Errors
    /// - Any error of [`ImageIOService::load_image`] or [`ImageIOService::to_buffer`]
    pub fn load_buffer<P: AsRef<Path>>(
        path: P,
        max_dimensions: Option<(u32, u32)>,
    ) -> Result<PixelBuffer> {
        let image = Self::load_image(path)?;
        Self::to_buffer(&image, max_dimensions)
    }

    /// Encode a buffer as PNG bytes
    ///
    /// # Errors
    /// - `Image` on encoder failure
    pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
        let image = DynamicImage::ImageRgba8(buffer.clone().into_rgba_image()?);
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Write a buffer to `path` as PNG, creating parent directories
    ///
    /// # Errors
    /// - `Io` when the directory or file cannot be written
    /// - `Image` on encoder failure
    pub fn save_png<P: AsRef<Path>>(buffer: &PixelBuffer, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let bytes = Self::encode_png(buffer)?;
        std::fs::write(path_ref, &bytes)?;
        log::debug!(
            "Saved {}x{} PNG to {} ({} bytes)",
            buffer.width(),
            buffer.height(),
            path_ref.display(),
            bytes.len()
        );
        Ok(())
    }
}
