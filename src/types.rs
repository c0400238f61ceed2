//! Core value types shared by the transforms, the collaborators and the session

use crate::error::{EditorError, Result};
use crate::utils::NumericValidator;
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Neutral slider position for brightness, contrast and saturation
pub const NEUTRAL_ADJUSTMENT: f32 = 100.0;

/// Slider state for the non-destructive adjustments.
///
/// Values are percentages: 100 is neutral, the UI range is typically 0-200.
/// Always applied against the original buffer, never compounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentParams {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl AdjustmentParams {
    /// Upper bound accepted by [`AdjustmentParams::validate`]
    pub const MAX_VALUE: f32 = 400.0;

    #[must_use]
    pub fn new(brightness: f32, contrast: f32, saturation: f32) -> Self {
        Self {
            brightness,
            contrast,
            saturation,
        }
    }

    /// All three sliders at 100
    #[must_use]
    pub fn neutral() -> Self {
        Self::new(NEUTRAL_ADJUSTMENT, NEUTRAL_ADJUSTMENT, NEUTRAL_ADJUSTMENT)
    }

    #[must_use]
    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }

    /// Reject non-finite values and values outside `0..=400`
    ///
    /// # Errors
    /// - `InvalidParameter` naming the offending slider
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
        ] {
            NumericValidator::validate_finite(value, name)?;
            NumericValidator::validate_range(value, 0.0, Self::MAX_VALUE, name)?;
        }
        Ok(())
    }
}

impl Default for AdjustmentParams {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Stateless filters selectable by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum FilterKind {
    Grayscale,
    Sepia,
    Negative,
    Vintage,
    /// Box blur over a `(2 * radius + 1)^2` window
    Blur { radius: u32 },
    /// 3x3 sharpening convolution
    Sharpen,
}

impl FilterKind {
    /// Short lowercase name used in history labels and on the command line
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Negative => "negative",
            Self::Vintage => "vintage",
            Self::Blur { .. } => "blur",
            Self::Sharpen => "sharpen",
        }
    }

    /// Parse a filter name; `blur` takes `default_blur_radius`
    ///
    /// # Errors
    /// - `InvalidParameter` for an unknown name
    pub fn parse(name: &str, default_blur_radius: u32) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "grayscale" | "greyscale" => Ok(Self::Grayscale),
            "sepia" => Ok(Self::Sepia),
            "negative" | "invert" => Ok(Self::Negative),
            "vintage" => Ok(Self::Vintage),
            "blur" => Ok(Self::Blur {
                radius: default_blur_radius,
            }),
            "sharpen" => Ok(Self::Sharpen),
            other => Err(EditorError::invalid_parameter(format!(
                "unknown filter '{}' (expected grayscale, sepia, negative, vintage, blur or sharpen)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blur { radius } => write!(f, "blur(radius={})", radius),
            other => f.write_str(other.name()),
        }
    }
}

/// Per-pixel binary subject/background classification.
///
/// One value per pixel (not per channel), row-major, each exactly 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationMask {
    values: Vec<u8>,
    dimensions: (u32, u32),
}

impl SegmentationMask {
    /// Create a mask from 0/1 values
    ///
    /// # Errors
    /// - `DimensionMismatch` when `values.len() != width * height`
    /// - `InvalidParameter` when any value is not 0 or 1
    pub fn new(values: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(EditorError::dimension_mismatch(expected, values.len()));
        }
        if let Some(position) = values.iter().position(|&v| v > 1) {
            return Err(EditorError::invalid_parameter(format!(
                "mask value at index {} must be 0 or 1",
                position
            )));
        }
        Ok(Self {
            values,
            dimensions: (width, height),
        })
    }

    /// Mask classifying every pixel as subject (`true`) or background (`false`)
    #[must_use]
    pub fn uniform(width: u32, height: u32, subject: bool) -> Self {
        Self {
            values: vec![u8::from(subject); width as usize * height as usize],
            dimensions: (width, height),
        }
    }

    /// Binarize grayscale or probability-like output: `value >= threshold` is subject
    ///
    /// # Errors
    /// - `DimensionMismatch` when `data.len() != width * height`
    pub fn from_grayscale(data: &[u8], width: u32, height: u32, threshold: u8) -> Result<Self> {
        let values = data.iter().map(|&v| u8::from(v >= threshold)).collect();
        Self::new(values, width, height)
    }

    /// Binarize a grayscale image
    ///
    /// # Errors
    /// - `DimensionMismatch` if the image buffer is malformed
    pub fn from_luma_image(image: &GrayImage, threshold: u8) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::from_grayscale(image.as_raw(), width, height, threshold)
    }

    /// Render the mask as a black/white grayscale image
    ///
    /// # Errors
    /// - `Internal` if the invariant `len == width * height` was broken
    pub fn to_luma_image(&self) -> Result<GrayImage> {
        let (width, height) = self.dimensions;
        let data = self.values.iter().map(|&v| v * 255).collect();
        GrayImage::from_raw(width, height, data)
            .ok_or_else(|| EditorError::internal("mask data does not match mask dimensions"))
    }

    /// Nearest-neighbour resize, keeping values binary
    ///
    /// # Errors
    /// - `InvalidParameter` when a target dimension is zero
    pub fn resize(&self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EditorError::invalid_parameter(format!(
                "mask dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if (width, height) == self.dimensions {
            return Ok(self.clone());
        }
        let (src_width, src_height) = (u64::from(self.dimensions.0), u64::from(self.dimensions.1));
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for y in 0..u64::from(height) {
            let src_y = y * src_height / u64::from(height);
            for x in 0..u64::from(width) {
                let src_x = x * src_width / u64::from(width);
                let index = (src_y * src_width + src_x) as usize;
                values.push(self.values.get(index).copied().unwrap_or(0));
            }
        }
        Ok(Self {
            values,
            dimensions: (width, height),
        })
    }

    #[must_use]
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the pixel at `index` is classified as subject
    #[must_use]
    pub fn is_subject(&self, index: usize) -> bool {
        self.values.get(index).copied() == Some(1)
    }

    /// Fraction of pixels classified as subject
    #[must_use]
    pub fn coverage(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let subject = self.values.iter().filter(|&&v| v == 1).count();
        subject as f32 / self.values.len() as f32
    }
}

impl From<&SegmentationMask> for GrayImage {
    fn from(mask: &SegmentationMask) -> Self {
        let (width, height) = mask.dimensions;
        let mut image = GrayImage::new(width, height);
        for (pixel, &value) in image.pixels_mut().zip(mask.values.iter()) {
            *pixel = Luma([value * 255]);
        }
        image
    }
}

/// Axis-aligned detection box in buffer pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    #[serde(rename = "topLeft")]
    pub top_left: (f32, f32),
    #[serde(rename = "bottomRight")]
    pub bottom_right: (f32, f32),
}

impl DetectionBox {
    #[must_use]
    pub fn new(top_left: (f32, f32), bottom_right: (f32, f32)) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Whether all four coordinates are finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.top_left.0.is_finite()
            && self.top_left.1.is_finite()
            && self.bottom_right.0.is_finite()
            && self.bottom_right.1.is_finite()
    }

    /// `(min_x, min_y, max_x, max_y)` regardless of corner order
    #[must_use]
    pub fn normalized(&self) -> (f32, f32, f32, f32) {
        let (x0, y0) = self.top_left;
        let (x1, y1) = self.bottom_right;
        (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        (self.bottom_right.0 - self.top_left.0).abs()
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        (self.bottom_right.1 - self.top_left.1).abs()
    }
}
