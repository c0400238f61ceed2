//! Mock providers for testing and debugging
//!
//! These stand in for real segmentation and detection models so sessions can
//! be exercised without model files. Each mock records its calls and can be
//! configured to fail the way a real collaborator would.

use crate::buffer::PixelBuffer;
use crate::error::{EditorError, Result};
use crate::inference::{DetectionProvider, SegmentationProvider};
use crate::ops::luma;
use crate::types::{DetectionBox, SegmentationMask};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// How a mock provider should fail, if at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockFailure {
    #[default]
    None,
    /// Fail with `ModelUnavailable`
    Unavailable,
    /// Fail with `Inference`
    Inference,
}

impl MockFailure {
    fn check(self, provider: &str, operation: &str) -> Result<()> {
        match self {
            Self::None => Ok(()),
            Self::Unavailable => Err(EditorError::model_unavailable(format!(
                "{} model could not be loaded",
                provider
            ))),
            Self::Inference => Err(EditorError::inference_error_with_provider(
                provider,
                operation,
                "simulated failure",
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn record(&self, call: String) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    fn snapshot(&self) -> Vec<String> {
        self.0.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

/// Segmentation mock classifying pixels by brightness.
///
/// Pixels whose luma is at least `threshold` are subject; everything darker
/// is background. A fixed mask can be supplied instead.
#[derive(Debug, Clone)]
pub struct MockSegmentationProvider {
    threshold: f32,
    fixed_mask: Option<SegmentationMask>,
    failure: MockFailure,
    calls: CallLog,
}

impl MockSegmentationProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            threshold: 128.0,
            fixed_mask: None,
            failure: MockFailure::None,
            calls: CallLog::default(),
        }
    }

    /// Luma threshold separating subject from background
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Always return `mask`, whatever the input
    #[must_use]
    pub fn with_fixed_mask(mut self, mask: SegmentationMask) -> Self {
        self.fixed_mask = Some(mask);
        self
    }

    #[must_use]
    pub fn failing(failure: MockFailure) -> Self {
        let mut provider = Self::new();
        provider.failure = failure;
        provider
    }

    /// Dimensions of every surface this provider was asked to segment
    pub fn get_call_history(&self) -> Vec<String> {
        self.calls.snapshot()
    }

    pub fn call_count(&self) -> usize {
        self.calls.snapshot().len()
    }
}

impl Default for MockSegmentationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SegmentationProvider for MockSegmentationProvider {
    async fn segment(&self, surface: &PixelBuffer) -> Result<SegmentationMask> {
        let (width, height) = surface.dimensions();
        self.calls.record(format!("segment {}x{}", width, height));
        tokio::task::yield_now().await;
        self.failure.check(self.name(), "segment")?;

        if let Some(mask) = &self.fixed_mask {
            return Ok(mask.clone());
        }
        let values = surface
            .pixels()
            .map(|p| {
                let value = luma([f32::from(p[0]), f32::from(p[1]), f32::from(p[2])]);
                u8::from(value >= self.threshold)
            })
            .collect();
        SegmentationMask::new(values, width, height)
    }

    fn name(&self) -> &str {
        "mock-segmentation"
    }
}

/// Detection mock returning a fixed list of boxes
#[derive(Debug, Clone)]
pub struct MockDetectionProvider {
    boxes: Vec<DetectionBox>,
    failure: MockFailure,
    calls: CallLog,
}

impl MockDetectionProvider {
    #[must_use]
    pub fn new(boxes: Vec<DetectionBox>) -> Self {
        Self {
            boxes,
            failure: MockFailure::None,
            calls: CallLog::default(),
        }
    }

    /// Provider that finds nothing
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[must_use]
    pub fn failing(failure: MockFailure) -> Self {
        let mut provider = Self::empty();
        provider.failure = failure;
        provider
    }

    pub fn get_call_history(&self) -> Vec<String> {
        self.calls.snapshot()
    }

    pub fn call_count(&self) -> usize {
        self.calls.snapshot().len()
    }
}

#[async_trait]
impl DetectionProvider for MockDetectionProvider {
    async fn detect(&self, surface: &PixelBuffer) -> Result<Vec<DetectionBox>> {
        let (width, height) = surface.dimensions();
        self.calls.record(format!("detect {}x{}", width, height));
        tokio::task::yield_now().await;
        self.failure.check(self.name(), "detect")?;
        Ok(self.boxes.clone())
    }

    fn name(&self) -> &str {
        "mock-detection"
    }
}
