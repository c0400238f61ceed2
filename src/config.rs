//! Configuration types for editing sessions

use crate::error::{EditorError, Result};
use crate::utils::NumericValidator;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of snapshots kept by the undo/redo history
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Configuration for an editing session
///
/// Colors are stored as `[r, g, b, a]` arrays so the configuration
/// round-trips through JSON unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of history snapshots (oldest evicted first)
    pub history_capacity: usize,

    /// Fill written over pixels classified as background
    pub background_fill: [u8; 4],

    /// Stroke and fill color for detection boxes
    pub box_stroke_color: [u8; 4],

    /// Opacity of the translucent box fill (0.0-1.0)
    pub box_fill_alpha: f32,

    /// Border width of detection boxes in pixels
    pub box_stroke_width: u32,

    /// Radius used when the blur filter is selected by name
    pub default_blur_radius: u32,

    /// Largest accepted blur radius
    pub max_blur_radius: u32,

    /// Grayscale masks are binarized with `value >= mask_threshold`
    pub mask_threshold: u8,

    /// Decoded images larger than this are scaled down to fit on ingestion
    pub max_ingest_dimensions: Option<(u32, u32)>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            background_fill: [255, 255, 255, 255], // Opaque white, not transparency
            box_stroke_color: [0, 255, 0, 255],    // #00ff00
            box_fill_alpha: 0.2,
            box_stroke_width: 3,
            default_blur_radius: 2,
            max_blur_radius: 64,
            mask_threshold: 128,
            max_ingest_dimensions: Some((800, 600)),
        }
    }
}

impl EditorConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use imgly_editor::EditorConfig;
    ///
    /// let config = EditorConfig::builder()
    ///     .history_capacity(50)
    ///     .background_fill([0, 0, 0, 255])
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.history_capacity, 50);
    /// ```
    #[must_use]
    pub fn builder() -> EditorConfigBuilder {
        EditorConfigBuilder::default()
    }

    /// Parse a JSON configuration; missing fields take their defaults
    ///
    /// # Errors
    /// - Malformed JSON
    /// - Values failing [`EditorConfig::validate`]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    ///
    /// # Errors
    /// - File I/O errors
    /// - Malformed JSON or invalid values
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Validate all configuration parameters
    ///
    /// # Validation Rules
    ///
    /// - History capacity: at least 1
    /// - Box fill alpha: 0.0-1.0
    /// - Box stroke width: at least 1
    /// - Default blur radius: not above the maximum blur radius
    /// - Ingest dimensions: both positive when set
    ///
    /// # Errors
    /// - `InvalidConfig` with the offending parameter and its valid range
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(EditorError::config_value_error(
                "history capacity",
                self.history_capacity,
                ">= 1",
                Some(DEFAULT_HISTORY_CAPACITY),
            ));
        }

        NumericValidator::validate_unit_interval(self.box_fill_alpha, "box fill alpha").map_err(
            |_| EditorError::config_value_error("box fill alpha", self.box_fill_alpha, "0.0-1.0", Some(0.2)),
        )?;

        if self.box_stroke_width == 0 {
            return Err(EditorError::config_value_error(
                "box stroke width",
                self.box_stroke_width,
                ">= 1",
                Some(3),
            ));
        }

        if self.default_blur_radius > self.max_blur_radius {
            return Err(EditorError::config_value_error(
                "default blur radius",
                self.default_blur_radius,
                &format!("0-{}", self.max_blur_radius),
                Some(2),
            ));
        }

        if let Some((width, height)) = self.max_ingest_dimensions {
            if width == 0 || height == 0 {
                return Err(EditorError::invalid_config(format!(
                    "Invalid max ingest dimensions: {}x{} (both must be positive)",
                    width, height
                )));
            }
        }

        Ok(())
    }

    /// Background fill as a pixel
    #[must_use]
    pub fn background_rgba(&self) -> Rgba<u8> {
        Rgba(self.background_fill)
    }

    /// Box stroke color as a pixel
    #[must_use]
    pub fn stroke_rgba(&self) -> Rgba<u8> {
        Rgba(self.box_stroke_color)
    }
}

/// Builder for `EditorConfig`
#[derive(Debug, Default)]
pub struct EditorConfigBuilder {
    config: EditorConfig,
}

impl EditorConfigBuilder {
    /// Set history capacity
    #[must_use]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Set background fill used by segmentation compositing
    #[must_use]
    pub fn background_fill(mut self, rgba: [u8; 4]) -> Self {
        self.config.background_fill = rgba;
        self
    }

    /// Set detection box stroke color
    #[must_use]
    pub fn box_stroke_color(mut self, rgba: [u8; 4]) -> Self {
        self.config.box_stroke_color = rgba;
        self
    }

    /// Set detection box fill opacity (clamped to 0.0-1.0)
    #[must_use]
    pub fn box_fill_alpha(mut self, alpha: f32) -> Self {
        self.config.box_fill_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Set detection box border width
    #[must_use]
    pub fn box_stroke_width(mut self, width: u32) -> Self {
        self.config.box_stroke_width = width;
        self
    }

    /// Set radius used for the named blur filter
    #[must_use]
    pub fn default_blur_radius(mut self, radius: u32) -> Self {
        self.config.default_blur_radius = radius;
        self
    }

    /// Set the largest accepted blur radius
    #[must_use]
    pub fn max_blur_radius(mut self, radius: u32) -> Self {
        self.config.max_blur_radius = radius;
        self
    }

    /// Set grayscale mask binarization threshold
    #[must_use]
    pub fn mask_threshold(mut self, threshold: u8) -> Self {
        self.config.mask_threshold = threshold;
        self
    }

    /// Set (or disable with `None`) fit-within scaling on ingestion
    #[must_use]
    pub fn max_ingest_dimensions(mut self, dimensions: Option<(u32, u32)>) -> Self {
        self.config.max_ingest_dimensions = dimensions;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - Any rule of [`EditorConfig::validate`]
    pub fn build(self) -> Result<EditorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
