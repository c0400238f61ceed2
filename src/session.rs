//! Edit session orchestrating transforms, collaborators and history
//!
//! The session owns the original and current buffers, the slider state and
//! the undo/redo log. Mutating operations are serialized by a busy flag: while
//! one is in flight (in practice, an awaited model call) every other mutating
//! request is rejected with `Busy` instead of being queued.

use crate::buffer::PixelBuffer;
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::history::{EditHistory, HistoryEntryInfo};
use crate::inference::{DetectionProvider, Providers, SegmentationProvider};
use crate::ops::{self, BoxStyle, ColorOps, MaskCompositor};
use crate::services::{
    ImageIOService, NoOpProgressReporter, ProcessingStage, ProgressReporter, ProgressUpdate,
};
use crate::types::{AdjustmentParams, DetectionBox, FilterKind, SegmentationMask};
use crate::utils::NumericValidator;
use instant::Instant;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Holds the busy flag for the lifetime of one mutating operation.
///
/// Dropping the guard (including when an awaiting future is dropped) clears the flag.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool, operation: &str) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EditorError::busy(operation))?;
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
struct SessionState {
    original: Option<PixelBuffer>,
    current: Option<PixelBuffer>,
    params: AdjustmentParams,
    history: EditHistory,
    active_filter: Option<FilterKind>,
}

impl SessionState {
    fn new(capacity: usize) -> Self {
        Self {
            original: None,
            current: None,
            params: AdjustmentParams::neutral(),
            history: EditHistory::new(capacity),
            active_filter: None,
        }
    }

    fn current(&self) -> Result<&PixelBuffer> {
        self.current.as_ref().ok_or(EditorError::NoImage)
    }

    fn original(&self) -> Result<&PixelBuffer> {
        self.original.as_ref().ok_or(EditorError::NoImage)
    }

    /// Make `buffer` current and record an independent copy of it in history
    fn commit(&mut self, buffer: PixelBuffer, label: String) {
        self.history.commit(buffer.clone(), label);
        self.current = Some(buffer);
    }

    fn seed(&mut self, buffer: PixelBuffer) {
        self.history.seed(buffer.clone());
        self.current = Some(buffer);
        self.params = AdjustmentParams::neutral();
        self.active_filter = None;
    }
}

/// Interactive editing session over a single image
///
/// # Examples
///
/// ```rust
/// use imgly_editor::{EditSession, EditorConfig, FilterKind, PixelBuffer, Rgba};
///
/// let session = EditSession::new(EditorConfig::default())?;
/// session.load_image(PixelBuffer::filled(4, 4, Rgba([10, 20, 30, 255]))?)?;
/// session.apply_filter(FilterKind::Negative)?;
/// assert_eq!(session.current()?.get_pixel(0, 0)?, Rgba([245, 235, 225, 255]));
/// session.undo()?;
/// assert_eq!(session.current()?.get_pixel(0, 0)?, Rgba([10, 20, 30, 255]));
/// # Ok::<(), imgly_editor::EditorError>(())
/// ```
pub struct EditSession {
    id: Uuid,
    config: EditorConfig,
    providers: Providers,
    progress: Arc<dyn ProgressReporter>,
    state: Mutex<SessionState>,
    busy: AtomicBool,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("id", &self.id)
            .field("providers", &self.providers)
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Create a session without collaborators
    ///
    /// # Errors
    /// - `InvalidConfig` if `config` fails validation
    pub fn new(config: EditorConfig) -> Result<Self> {
        Self::with_providers(config, Providers::default())
    }

    /// Create a session with injected segmentation and detection collaborators
    ///
    /// # Errors
    /// - `InvalidConfig` if `config` fails validation
    pub fn with_providers(config: EditorConfig, providers: Providers) -> Result<Self> {
        config.validate()?;
        let id = Uuid::new_v4();
        debug!(session = %id, ?providers, "Creating edit session");
        Ok(Self {
            id,
            state: Mutex::new(SessionState::new(config.history_capacity)),
            config,
            providers,
            progress: Arc::new(NoOpProgressReporter),
            busy: AtomicBool::new(false),
        })
    }

    /// Route progress of model-backed operations to `reporter`
    #[must_use]
    pub fn with_progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress = reporter;
        self
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Whether a mutating operation is currently in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn begin(&self, operation: &str) -> Result<BusyGuard<'_>> {
        BusyGuard::acquire(&self.busy, operation).map_err(|e| {
            warn!(session = %self.id, operation, "Rejected while busy");
            e
        })
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, SessionState>> {
        self.state
            .lock()
            .map_err(|_| EditorError::internal("session state lock poisoned"))
    }

    /// Compute a new buffer from `current` and commit it under `label`
    fn commit_from_current<F>(&self, operation: &str, label: String, transform: F) -> Result<()>
    where
        F: FnOnce(&PixelBuffer) -> Result<PixelBuffer>,
    {
        let _guard = self.begin(operation)?;
        let start = Instant::now();
        let mut state = self.lock_state()?;
        let next = transform(state.current()?)?;
        state.commit(next, label);
        debug!(
            session = %self.id,
            operation,
            elapsed_ms = start.elapsed().as_millis() as u64,
            history_len = state.history.len(),
            "Committed edit"
        );
        Ok(())
    }

    /// Start editing `buffer`, replacing any previous image and history
    #[instrument(skip(self, buffer), fields(session = %self.id, width = buffer.width(), height = buffer.height()))]
    pub fn load_image(&self, buffer: PixelBuffer) -> Result<()> {
        let _guard = self.begin("load_image")?;
        let mut state = self.lock_state()?;
        state.original = Some(buffer.clone());
        state.seed(buffer);
        info!("Image loaded");
        Ok(())
    }

    /// Decode a file, scale it to fit `max_ingest_dimensions` and load it
    ///
    /// # Errors
    /// - `Io` / `Image` when the file cannot be read or decoded
    /// - `Busy` while another operation is in flight
    pub fn load_image_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let start = Instant::now();
        let buffer = ImageIOService::load_buffer(path.as_ref(), self.config.max_ingest_dimensions)?;
        self.progress.report_progress(ProgressUpdate::new(
            "load_image",
            ProcessingStage::ImageLoading,
            start,
        ));
        self.load_image(buffer)
    }

    /// Preview slider values against the original without touching history
    ///
    /// # Errors
    /// - `InvalidParameter` for non-finite or out-of-range values
    /// - `NoImage` before any image is loaded
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn update_adjustments(&self, params: AdjustmentParams) -> Result<()> {
        params.validate()?;
        let _guard = self.begin("update_adjustments")?;
        let mut state = self.lock_state()?;
        let preview = ColorOps::compose_adjustments(state.original()?, &params)?;
        state.current = Some(preview);
        state.params = params;
        Ok(())
    }

    /// Record the current adjustment preview as a history entry
    ///
    /// # Errors
    /// - `NoOp` when `current` already matches the snapshot under the cursor
    /// - `NoImage` before any image is loaded
    pub fn commit_adjustments(&self) -> Result<()> {
        let _guard = self.begin("commit_adjustments")?;
        let mut state = self.lock_state()?;
        let preview = state.current()?.clone();
        if state.history.current() == Some(&preview) {
            debug!(session = %self.id, "No pending adjustments");
            return Err(EditorError::no_op("commit"));
        }
        let params = state.params;
        let label = format!(
            "adjustments (brightness {}, contrast {}, saturation {})",
            params.brightness, params.contrast, params.saturation
        );
        state.commit(preview, label);
        Ok(())
    }

    /// Apply a filter to the current buffer and commit the result
    ///
    /// # Errors
    /// - `InvalidParameter` for a blur radius above `max_blur_radius`
    /// - `NoImage`, `Busy`
    #[instrument(skip(self), fields(session = %self.id, filter = %kind))]
    pub fn apply_filter(&self, kind: FilterKind) -> Result<()> {
        if let FilterKind::Blur { radius } = kind {
            NumericValidator::validate_range(radius, 0, self.config.max_blur_radius, "blur radius")?;
        }
        let _guard = self.begin("apply_filter")?;
        let start = Instant::now();
        let mut state = self.lock_state()?;
        let next = ops::apply_filter(state.current()?, kind);
        state.commit(next, kind.to_string());
        state.active_filter = Some(kind);
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Filter applied");
        Ok(())
    }

    /// Histogram contrast stretch of the current buffer
    pub fn auto_enhance(&self) -> Result<()> {
        self.commit_from_current("auto_enhance", "auto enhance".to_string(), |current| {
            Ok(ColorOps::auto_enhance(current))
        })
    }

    /// Fixed gain-and-lift enhancement of the current buffer
    pub fn enhance(&self) -> Result<()> {
        self.commit_from_current("enhance", "enhance".to_string(), |current| {
            Ok(ColorOps::quick_enhance(current))
        })
    }

    /// Composite a precomputed mask, filling background pixels with the configured color
    ///
    /// # Errors
    /// - `DimensionMismatch` when the mask does not cover the current buffer
    /// - `NoImage`, `Busy`
    #[instrument(skip(self, mask), fields(session = %self.id, coverage = mask.coverage()))]
    pub fn apply_segmentation(&self, mask: &SegmentationMask) -> Result<()> {
        let background = self.config.background_rgba();
        self.commit_from_current("apply_segmentation", "background removal".to_string(), |current| {
            MaskCompositor::apply_segmentation(current, mask, background)
        })
    }

    /// Overlay detection boxes onto the current buffer.
    ///
    /// Returns the number of boxes drawn. When nothing lands on the canvas
    /// (empty list, non-finite, zero-area or off-canvas boxes) the session is
    /// left untouched and nothing is committed.
    #[instrument(skip(self, boxes), fields(session = %self.id, count = boxes.len()))]
    pub fn apply_detections(&self, boxes: &[DetectionBox]) -> Result<usize> {
        let _guard = self.begin("apply_detections")?;
        let mut state = self.lock_state()?;
        let (next, drawn) = MaskCompositor::overlay_boxes_counted(
            state.current()?,
            boxes,
            &BoxStyle::from_config(&self.config),
        );
        if drawn == 0 {
            debug!("No detections to draw");
            return Ok(0);
        }
        state.commit(next, detection_label(drawn));
        Ok(drawn)
    }

    /// Snapshot `current` for a collaborator call
    fn surface(&self) -> Result<PixelBuffer> {
        Ok(self.lock_state()?.current()?.clone())
    }

    fn report_failure(&self, stage: ProcessingStage, error: &EditorError) {
        warn!(session = %self.id, ?stage, %error, "Collaborator call failed; session unchanged");
        self.progress.report_error(stage, &error.to_string());
    }

    /// Segment the current buffer with the injected provider and fill the background.
    ///
    /// On any collaborator failure the session is left exactly as it was.
    ///
    /// # Errors
    /// - `ModelUnavailable` when no segmentation provider is configured, or
    ///   the provider cannot load its model
    /// - `Inference` when the provider fails
    /// - `DimensionMismatch` when the returned mask does not cover the buffer
    /// - `NoImage`, `Busy`
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn remove_background(&self) -> Result<()> {
        let provider: Arc<dyn SegmentationProvider> = self
            .providers
            .segmentation
            .clone()
            .ok_or_else(|| EditorError::model_unavailable("no segmentation provider configured"))?;

        let _guard = self.begin("remove_background")?;
        let start = Instant::now();
        let surface = self.surface()?;

        self.progress.report_progress(ProgressUpdate::new(
            "remove_background",
            ProcessingStage::Segmentation,
            start,
        ));
        let mask = match provider.segment(&surface).await {
            Ok(mask) => mask,
            Err(e) => {
                self.report_failure(ProcessingStage::Segmentation, &e);
                return Err(e);
            },
        };
        debug!(provider = provider.name(), coverage = mask.coverage(), "Segmentation finished");

        self.progress.report_progress(ProgressUpdate::new(
            "remove_background",
            ProcessingStage::Compositing,
            start,
        ));
        let next = MaskCompositor::apply_segmentation(&surface, &mask, self.config.background_rgba())
            .map_err(|e| {
                self.report_failure(ProcessingStage::Compositing, &e);
                e
            })?;

        self.lock_state()?.commit(next, "background removal".to_string());
        let total_ms = start.elapsed().as_millis() as u64;
        self.progress.report_completion("remove_background", total_ms);
        info!(total_ms, "Background removed");
        Ok(())
    }

    /// Detect faces with the injected provider and overlay their boxes.
    ///
    /// Returns the number of boxes drawn; when none lands on the canvas
    /// nothing is committed.
    ///
    /// # Errors
    /// - `ModelUnavailable` when no detection provider is configured, or the
    ///   provider cannot load its model
    /// - `Inference` when the provider fails
    /// - `NoImage`, `Busy`
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn detect_faces(&self) -> Result<usize> {
        let provider: Arc<dyn DetectionProvider> = self
            .providers
            .detection
            .clone()
            .ok_or_else(|| EditorError::model_unavailable("no detection provider configured"))?;

        let _guard = self.begin("detect_faces")?;
        let start = Instant::now();
        let surface = self.surface()?;

        self.progress.report_progress(ProgressUpdate::new(
            "detect_faces",
            ProcessingStage::Detection,
            start,
        ));
        let boxes = match provider.detect(&surface).await {
            Ok(boxes) => boxes,
            Err(e) => {
                self.report_failure(ProcessingStage::Detection, &e);
                return Err(e);
            },
        };
        debug!(provider = provider.name(), count = boxes.len(), "Detection finished");

        let drawn = if boxes.is_empty() {
            0
        } else {
            self.progress.report_progress(ProgressUpdate::new(
                "detect_faces",
                ProcessingStage::Compositing,
                start,
            ));
            let (next, drawn) = MaskCompositor::overlay_boxes_counted(
                &surface,
                &boxes,
                &BoxStyle::from_config(&self.config),
            );
            if drawn > 0 {
                self.lock_state()?.commit(next, detection_label(drawn));
            }
            drawn
        };

        let total_ms = start.elapsed().as_millis() as u64;
        self.progress.report_completion("detect_faces", total_ms);
        info!(total_ms, detected = boxes.len(), drawn, "Faces detected");
        Ok(drawn)
    }

    /// Step back one history entry
    ///
    /// # Errors
    /// - `NoOp` at the oldest entry
    /// - `NoImage`, `Busy`
    pub fn undo(&self) -> Result<()> {
        let _guard = self.begin("undo")?;
        let mut state = self.lock_state()?;
        let restored = state.history.undo()?.clone();
        state.current = Some(restored);
        Ok(())
    }

    /// Step forward one history entry
    ///
    /// # Errors
    /// - `NoOp` at the newest entry
    /// - `NoImage`, `Busy`
    pub fn redo(&self) -> Result<()> {
        let _guard = self.begin("redo")?;
        let mut state = self.lock_state()?;
        let restored = state.history.redo()?.clone();
        state.current = Some(restored);
        Ok(())
    }

    /// Return to the original image with neutral sliders and a fresh history
    ///
    /// # Errors
    /// - `NoImage`, `Busy`
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn reset(&self) -> Result<()> {
        let _guard = self.begin("reset")?;
        let mut state = self.lock_state()?;
        let original = state.original()?.clone();
        state.seed(original);
        Ok(())
    }

    /// Copy of the displayed buffer
    pub fn current(&self) -> Result<PixelBuffer> {
        Ok(self.lock_state()?.current()?.clone())
    }

    /// Borrow the displayed buffer without copying it
    pub fn with_current<R>(&self, f: impl FnOnce(&PixelBuffer) -> R) -> Result<R> {
        let state = self.lock_state()?;
        Ok(f(state.current()?))
    }

    /// Copy of the buffer as loaded
    pub fn original(&self) -> Result<PixelBuffer> {
        Ok(self.lock_state()?.original()?.clone())
    }

    pub fn params(&self) -> Result<AdjustmentParams> {
        Ok(self.lock_state()?.params)
    }

    /// Last filter applied since the image was loaded or reset
    pub fn active_filter(&self) -> Result<Option<FilterKind>> {
        Ok(self.lock_state()?.active_filter)
    }

    pub fn has_image(&self) -> bool {
        self.lock_state().map(|s| s.current.is_some()).unwrap_or(false)
    }

    pub fn can_undo(&self) -> Result<bool> {
        Ok(self.lock_state()?.history.can_undo())
    }

    pub fn can_redo(&self) -> Result<bool> {
        Ok(self.lock_state()?.history.can_redo())
    }

    pub fn history_len(&self) -> Result<usize> {
        Ok(self.lock_state()?.history.len())
    }

    pub fn history_cursor(&self) -> Result<usize> {
        Ok(self.lock_state()?.history.cursor())
    }

    pub fn history_info(&self) -> Result<Vec<HistoryEntryInfo>> {
        Ok(self.lock_state()?.history.entries_info())
    }

    /// Bytes of pixel data held by history snapshots
    pub fn history_memory_usage(&self) -> Result<usize> {
        Ok(self.lock_state()?.history.memory_usage())
    }

    /// Whether `current` is identical to the snapshot under the history cursor
    pub fn is_committed(&self) -> Result<bool> {
        let state = self.lock_state()?;
        Ok(state.current.as_ref() == state.history.current())
    }
}

fn detection_label(count: usize) -> String {
    if count == 1 {
        "face detection (1 box)".to_string()
    } else {
        format!("face detection ({} boxes)", count)
    }
}
