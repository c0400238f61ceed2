//! File-backed providers
//!
//! Replay segmentation or detection output produced elsewhere (an external
//! model run, a hand-painted mask) through the provider interfaces. Files
//! are read on every call; a missing file surfaces as `ModelUnavailable`.

use crate::buffer::PixelBuffer;
use crate::error::{EditorError, Result};
use crate::inference::{DetectionProvider, SegmentationProvider};
use crate::types::{DetectionBox, SegmentationMask};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

async fn read_source(path: &Path, provider: &str) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            EditorError::model_unavailable(format!(
                "{} source not found: {}",
                provider,
                path.display()
            ))
        } else {
            EditorError::Io(e)
        }
    })
}

/// Segmentation from a grayscale mask image.
///
/// The image is binarized with `value >= threshold` and resized
/// (nearest-neighbour) to the surface dimensions when they differ.
#[derive(Debug, Clone)]
pub struct StaticMaskProvider {
    path: PathBuf,
    threshold: u8,
}

impl StaticMaskProvider {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P, threshold: u8) -> Self {
        Self {
            path: path.into(),
            threshold,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SegmentationProvider for StaticMaskProvider {
    async fn segment(&self, surface: &PixelBuffer) -> Result<SegmentationMask> {
        let bytes = read_source(&self.path, self.name()).await?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| {
                EditorError::inference_error_with_provider(self.name(), "decode mask", &e.to_string())
            })?
            .to_luma8();

        let mask = SegmentationMask::from_luma_image(&image, self.threshold)?;
        let (width, height) = surface.dimensions();
        if mask.dimensions() == (width, height) {
            return Ok(mask);
        }
        tracing::debug!(
            from = ?mask.dimensions(),
            to = ?(width, height),
            "Resizing static mask to surface"
        );
        mask.resize(width, height)
    }

    fn name(&self) -> &str {
        "static-mask"
    }
}

/// Detection from a JSON array of `{"topLeft": [x, y], "bottomRight": [x, y]}` objects
#[derive(Debug, Clone)]
pub struct StaticBoxProvider {
    path: PathBuf,
}

impl StaticBoxProvider {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Parse a box list from JSON text
    ///
    /// # Errors
    /// - `Serialization` for malformed JSON
    pub fn parse_boxes(json: &str) -> Result<Vec<DetectionBox>> {
        Ok(serde_json::from_str(json)?)
    }
}

#[async_trait]
impl DetectionProvider for StaticBoxProvider {
    async fn detect(&self, _surface: &PixelBuffer) -> Result<Vec<DetectionBox>> {
        let bytes = read_source(&self.path, self.name()).await?;
        let boxes: Vec<DetectionBox> = serde_json::from_slice(&bytes).map_err(|e| {
            EditorError::inference_error_with_provider(self.name(), "parse boxes", &e.to_string())
        })?;
        Ok(boxes)
    }

    fn name(&self) -> &str {
        "static-boxes"
    }
}
