//! Progress reporting service
//!
//! Long-running session operations (the model calls) announce their stages
//! through a [`ProgressReporter`], so frontends can show a busy indicator
//! without the session knowing how it is rendered.

use instant::Instant;

/// Stages of an editing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Decoding and scaling an input image
    ImageLoading,
    /// Waiting on the segmentation collaborator
    Segmentation,
    /// Waiting on the detection collaborator
    Detection,
    /// Merging collaborator output into the current buffer
    Compositing,
    /// Operation committed to history
    Completed,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::ImageLoading => "Loading input image",
            ProcessingStage::Segmentation => "Segmenting subject",
            ProcessingStage::Detection => "Detecting faces",
            ProcessingStage::Compositing => "Compositing result",
            ProcessingStage::Completed => "Processing completed",
        }
    }

    /// Get the typical progress percentage for this stage
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ProcessingStage::ImageLoading => 10,
            ProcessingStage::Segmentation | ProcessingStage::Detection => 30,
            ProcessingStage::Compositing => 90,
            ProcessingStage::Completed => 100,
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Operation the update belongs to (`remove_background`, `detect_faces`, ...)
    pub operation: String,
    pub stage: ProcessingStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    pub description: String,
    /// Elapsed time since the operation started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new(operation: &str, stage: ProcessingStage, start_time: Instant) -> Self {
        Self {
            operation: operation.to_string(),
            progress: stage.progress_percentage(),
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }
}

/// Trait for reporting progress during session operations
pub trait ProgressReporter: Send + Sync {
    fn report_progress(&self, update: ProgressUpdate);

    /// Report that `operation` finished after `total_ms`
    fn report_completion(&self, operation: &str, total_ms: u64);

    /// Report an error during processing
    fn report_error(&self, stage: ProcessingStage, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_completion(&self, _operation: &str, _total_ms: u64) {}

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
}

/// Reporter emitting structured `tracing` events
pub struct TracingProgressReporter;

impl ProgressReporter for TracingProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        tracing::info!(
            operation = %update.operation,
            stage = ?update.stage,
            progress = update.progress,
            elapsed_ms = update.elapsed_ms,
            "{}",
            update.description
        );
    }

    fn report_completion(&self, operation: &str, total_ms: u64) {
        tracing::info!(operation, total_ms, "Operation completed");
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        tracing::warn!(stage = ?stage, error, "Operation failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        stages: Arc<Mutex<Vec<ProcessingStage>>>,
    }

    impl ProgressReporter for Recorder {
        fn report_progress(&self, update: ProgressUpdate) {
            self.stages.lock().unwrap().push(update.stage);
        }

        fn report_completion(&self, _operation: &str, _total_ms: u64) {
            self.stages.lock().unwrap().push(ProcessingStage::Completed);
        }

        fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
    }

    #[test]
    fn test_stage_percentages_are_ordered() {
        assert!(
            ProcessingStage::ImageLoading.progress_percentage()
                < ProcessingStage::Segmentation.progress_percentage()
        );
        assert!(
            ProcessingStage::Compositing.progress_percentage()
                < ProcessingStage::Completed.progress_percentage()
        );
        assert_eq!(ProcessingStage::Completed.progress_percentage(), 100);
    }

    #[test]
    fn test_progress_update_fields() {
        let update = ProgressUpdate::new("detect_faces", ProcessingStage::Detection, Instant::now());
        assert_eq!(update.operation, "detect_faces");
        assert_eq!(update.progress, 30);
        assert_eq!(update.description, "Detecting faces");
    }

    #[test]
    fn test_reporters_accept_updates() {
        let recorder = Recorder::default();
        let reporters: Vec<Box<dyn ProgressReporter>> = vec![
            Box::new(NoOpProgressReporter),
            Box::new(TracingProgressReporter),
        ];
        for reporter in &reporters {
            reporter.report_progress(ProgressUpdate::new(
                "op",
                ProcessingStage::Compositing,
                Instant::now(),
            ));
            reporter.report_completion("op", 1);
            reporter.report_error(ProcessingStage::Segmentation, "boom");
        }

        recorder.report_progress(ProgressUpdate::new(
            "op",
            ProcessingStage::Segmentation,
            Instant::now(),
        ));
        recorder.report_completion("op", 3);
        assert_eq!(
            *recorder.stages.lock().unwrap(),
            vec![ProcessingStage::Segmentation, ProcessingStage::Completed]
        );
    }
}
