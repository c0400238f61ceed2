//! Contracts for the externally supplied inference collaborators
//!
//! The session never loads or runs a model itself. It hands a snapshot of the
//! current buffer to a provider and awaits the result; failures surface as
//! `ModelUnavailable` or `Inference` and leave session state untouched.

use crate::buffer::PixelBuffer;
use crate::error::Result;
use crate::types::{DetectionBox, SegmentationMask};
use async_trait::async_trait;
use std::sync::Arc;

/// Per-pixel subject/background classification
#[async_trait]
pub trait SegmentationProvider: Send + Sync {
    /// Classify every pixel of `surface`.
    ///
    /// The returned mask must hold exactly `surface.pixel_count()` values.
    ///
    /// # Errors
    /// - `ModelUnavailable` if the model cannot be loaded
    /// - `Inference` if running the model fails
    async fn segment(&self, surface: &PixelBuffer) -> Result<SegmentationMask>;

    /// Human-readable provider name for logs
    fn name(&self) -> &str;
}

/// Axis-aligned face (or object) box detection
#[async_trait]
pub trait DetectionProvider: Send + Sync {
    /// Detect boxes in `surface`, in buffer pixel coordinates.
    ///
    /// # Errors
    /// - `ModelUnavailable` if the model cannot be loaded
    /// - `Inference` if running the model fails
    async fn detect(&self, surface: &PixelBuffer) -> Result<Vec<DetectionBox>>;

    fn name(&self) -> &str;
}

/// Set of optional collaborators injected into a session
#[derive(Clone, Default)]
pub struct Providers {
    pub segmentation: Option<Arc<dyn SegmentationProvider>>,
    pub detection: Option<Arc<dyn DetectionProvider>>,
}

impl Providers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_segmentation(mut self, provider: Arc<dyn SegmentationProvider>) -> Self {
        self.segmentation = Some(provider);
        self
    }

    #[must_use]
    pub fn with_detection(mut self, provider: Arc<dyn DetectionProvider>) -> Self {
        self.detection = Some(provider);
        self
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field(
                "segmentation",
                &self.segmentation.as_ref().map(|p| p.name().to_string()),
            )
            .field(
                "detection",
                &self.detection.as_ref().map(|p| p.name().to_string()),
            )
            .finish()
    }
}
