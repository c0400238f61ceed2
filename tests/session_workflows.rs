//! End-to-end editing workflows through `EditSession`
//!
//! These tests drive a session the way an editor front-end would: load an
//! image, drag sliders, apply filters, call the model collaborators and walk
//! the history back and forth.

use imgly_editor::backends::{MockDetectionProvider, MockFailure, MockSegmentationProvider};
use imgly_editor::{
    AdjustmentParams, DetectionBox, EditSession, EditorConfig, EditorError, FilterKind,
    PixelBuffer, ProcessingStage, ProgressReporter, ProgressUpdate, Providers, Result, Rgba,
};
use std::sync::{Arc, Mutex};

const GRAY: Rgba<u8> = Rgba([100, 100, 100, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

fn loaded_session(buffer: PixelBuffer) -> Result<EditSession> {
    let session = EditSession::new(EditorConfig::default())?;
    session.load_image(buffer)?;
    Ok(session)
}

/// Reporter that records every callback as a line of text
#[derive(Default)]
struct RecordingReporter {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{}: {:?}", update.operation, update.stage));
    }

    fn report_completion(&self, operation: &str, _total_ms: u64) {
        self.events.lock().unwrap().push(format!("done {}", operation));
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("error {:?}: {}", stage, error));
    }
}

/// Left half white, right half black
fn split(width: u32, height: u32) -> PixelBuffer {
    let mut buffer = PixelBuffer::filled(width, height, BLACK).unwrap();
    for y in 0..height {
        for x in 0..width / 2 {
            buffer.set_pixel(x, y, Rgba([255, 255, 255, 255])).unwrap();
        }
    }
    buffer
}

#[test]
fn test_load_seeds_history() -> Result<()> {
    let session = loaded_session(PixelBuffer::filled(4, 3, GRAY)?)?;

    assert!(session.has_image());
    assert_eq!(session.history_len()?, 1);
    assert_eq!(session.history_cursor()?, 0);
    assert!(!session.can_undo()?);
    assert!(!session.can_redo()?);
    assert!(session.params()?.is_neutral());
    assert_eq!(session.current()?, session.original()?);

    let info = session.history_info()?;
    assert_eq!(info[0].label, "original");
    assert!(info[0].is_current);
    Ok(())
}

#[test]
fn test_slider_preview_is_relative_to_original() -> Result<()> {
    let session = loaded_session(PixelBuffer::filled(2, 2, GRAY)?)?;

    session.update_adjustments(AdjustmentParams::new(120.0, 100.0, 100.0))?;
    assert_eq!(session.current()?.get_pixel(0, 0)?, Rgba([151, 151, 151, 255]));

    // A second drag replaces the first instead of stacking on top of it
    session.update_adjustments(AdjustmentParams::new(120.0, 100.0, 100.0))?;
    assert_eq!(session.current()?.get_pixel(1, 1)?, Rgba([151, 151, 151, 255]));

    session.update_adjustments(AdjustmentParams::neutral())?;
    assert_eq!(session.current()?, session.original()?);

    // Previews never reach the history
    assert_eq!(session.history_len()?, 1);
    Ok(())
}

#[test]
fn test_commit_adjustments_records_entry() -> Result<()> {
    let session = loaded_session(PixelBuffer::filled(2, 2, GRAY)?)?;

    session.update_adjustments(AdjustmentParams::new(120.0, 100.0, 100.0))?;
    assert!(!session.is_committed()?);

    session.commit_adjustments()?;
    assert!(session.is_committed()?);
    assert_eq!(session.history_len()?, 2);

    let info = session.history_info()?;
    assert!(info[1].label.starts_with("adjustments"));

    session.undo()?;
    assert_eq!(session.current()?.get_pixel(0, 0)?, GRAY);
    Ok(())
}

#[test]
fn test_commit_without_pending_preview_is_noop() -> Result<()> {
    let session = loaded_session(PixelBuffer::filled(2, 2, GRAY)?)?;

    // Nothing previewed since load
    assert!(matches!(session.commit_adjustments(), Err(EditorError::NoOp(_))));
    assert_eq!(session.history_len()?, 1);

    session.update_adjustments(AdjustmentParams::new(120.0, 100.0, 100.0))?;
    session.commit_adjustments()?;

    // A repeated commit must not push out real states
    let err = session.commit_adjustments().unwrap_err();
    assert!(matches!(err, EditorError::NoOp(_)));
    assert!(err.to_string().contains("commit"));
    assert_eq!(session.history_len()?, 2);
    assert!(!session.is_busy());
    Ok(())
}

#[test]
fn test_filter_undo_redo_roundtrip() -> Result<()> {
    let session = loaded_session(PixelBuffer::filled(3, 3, Rgba([10, 20, 30, 255]))?)?;

    session.apply_filter(FilterKind::Negative)?;
    assert_eq!(session.current()?.get_pixel(1, 1)?, Rgba([245, 235, 225, 255]));
    assert_eq!(session.active_filter()?, Some(FilterKind::Negative));

    session.undo()?;
    assert_eq!(session.current()?.get_pixel(1, 1)?, Rgba([10, 20, 30, 255]));
    assert!(session.can_redo()?);

    session.redo()?;
    assert_eq!(session.current()?.get_pixel(1, 1)?, Rgba([245, 235, 225, 255]));
    assert!(!session.can_redo()?);
    Ok(())
}

#[test]
fn test_new_commit_discards_redo_branch() -> Result<()> {
    let session = loaded_session(PixelBuffer::filled(3, 3, GRAY)?)?;

    session.apply_filter(FilterKind::Negative)?;
    session.apply_filter(FilterKind::Sepia)?;
    session.undo()?;
    assert!(session.can_redo()?);

    session.apply_filter(FilterKind::Grayscale)?;
    assert!(!session.can_redo()?);
    assert_eq!(session.history_len()?, 3);

    let labels: Vec<String> = session.history_info()?.into_iter().map(|e| e.label).collect();
    assert_eq!(labels, vec!["original", "negative", "grayscale"]);
    Ok(())
}

#[test]
fn test_history_capacity_evicts_oldest() -> Result<()> {
    let session = loaded_session(PixelBuffer::filled(2, 2, GRAY)?)?;

    for _ in 0..25 {
        session.apply_filter(FilterKind::Negative)?;
    }
    assert_eq!(session.history_len()?, 20);
    assert_eq!(session.history_cursor()?, 19);

    for _ in 0..19 {
        session.undo()?;
    }
    assert!(matches!(session.undo(), Err(EditorError::NoOp(_))));
    assert_eq!(session.history_cursor()?, 0);

    // Entries for the first five negations were evicted; six negations cancel out
    assert_eq!(session.current()?.get_pixel(0, 0)?, GRAY);
    Ok(())
}

#[test]
fn test_custom_history_capacity() -> Result<()> {
    let config = EditorConfig::builder().history_capacity(3).build()?;
    let session = EditSession::new(config)?;
    session.load_image(PixelBuffer::filled(2, 2, GRAY)?)?;

    for _ in 0..5 {
        session.apply_filter(FilterKind::Vintage)?;
    }
    assert_eq!(session.history_len()?, 3);
    assert!(session.history_memory_usage()? >= 3 * 2 * 2 * 4);
    Ok(())
}

#[test]
fn test_reset_restores_original() -> Result<()> {
    let session = loaded_session(PixelBuffer::filled(3, 2, GRAY)?)?;

    session.update_adjustments(AdjustmentParams::new(80.0, 150.0, 50.0))?;
    session.commit_adjustments()?;
    session.apply_filter(FilterKind::Blur { radius: 1 })?;
    session.auto_enhance()?;

    session.reset()?;
    assert_eq!(session.current()?, session.original()?);
    assert_eq!(session.history_len()?, 1);
    assert!(session.params()?.is_neutral());
    assert_eq!(session.active_filter()?, None);
    assert!(!session.can_undo()?);
    Ok(())
}

#[test]
fn test_enhance_operations_commit() -> Result<()> {
    let mut buffer = PixelBuffer::filled(2, 1, Rgba([50, 60, 70, 255]))?;
    buffer.set_pixel(1, 0, Rgba([150, 160, 170, 255]))?;
    let session = loaded_session(buffer)?;

    session.auto_enhance()?;
    assert_eq!(session.current()?.get_pixel(0, 0)?, Rgba([0, 0, 0, 255]));
    assert_eq!(session.current()?.get_pixel(1, 0)?, Rgba([255, 255, 255, 255]));

    session.undo()?;
    session.enhance()?;
    // 50 * 1.1 + 5 = 60, 60 * 1.1 + 5 = 71, 70 * 1.1 + 5 = 82
    assert_eq!(session.current()?.get_pixel(0, 0)?, Rgba([60, 71, 82, 255]));

    let labels: Vec<String> = session.history_info()?.into_iter().map(|e| e.label).collect();
    assert_eq!(labels, vec!["original", "enhance"]);
    Ok(())
}

#[tokio::test]
async fn test_remove_background_fills_dark_pixels() -> Result<()> {
    let segmentation = Arc::new(MockSegmentationProvider::new());
    let config = EditorConfig::builder()
        .background_fill([0, 0, 255, 255])
        .build()?;
    let session = EditSession::with_providers(
        config,
        Providers::new().with_segmentation(segmentation.clone()),
    )?;
    session.load_image(split(4, 2))?;

    session.remove_background().await?;

    let current = session.current()?;
    assert_eq!(current.get_pixel(0, 0)?, Rgba([255, 255, 255, 255]));
    assert_eq!(current.get_pixel(3, 1)?, Rgba([0, 0, 255, 255]));
    assert_eq!(session.history_len()?, 2);
    assert_eq!(segmentation.get_call_history(), vec!["segment 4x2"]);

    session.undo()?;
    assert_eq!(session.current()?.get_pixel(3, 1)?, BLACK);
    Ok(())
}

#[tokio::test]
async fn test_detect_faces_draws_boxes() -> Result<()> {
    let boxes = vec![DetectionBox::new((2.0, 2.0), (8.0, 8.0))];
    let detection = Arc::new(MockDetectionProvider::new(boxes));
    let config = EditorConfig::builder().box_stroke_width(1).build()?;
    let session =
        EditSession::with_providers(config, Providers::new().with_detection(detection.clone()))?;
    session.load_image(PixelBuffer::filled(10, 10, BLACK)?)?;

    let count = session.detect_faces().await?;
    assert_eq!(count, 1);

    let current = session.current()?;
    assert_eq!(current.get_pixel(2, 2)?, Rgba([0, 255, 0, 255]));
    assert_eq!(current.get_pixel(7, 4)?, Rgba([0, 255, 0, 255]));
    // 20% green fill over opaque black
    assert_eq!(current.get_pixel(5, 5)?, Rgba([0, 51, 0, 255]));
    assert_eq!(current.get_pixel(0, 0)?, BLACK);
    assert_eq!(current.get_pixel(8, 8)?, BLACK);

    let info = session.history_info()?;
    assert_eq!(info.last().map(|e| e.label.as_str()), Some("face detection (1 box)"));
    assert_eq!(detection.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_no_detections_commit_nothing() -> Result<()> {
    let session = EditSession::with_providers(
        EditorConfig::default(),
        Providers::new().with_detection(Arc::new(MockDetectionProvider::empty())),
    )?;
    session.load_image(PixelBuffer::filled(4, 4, GRAY)?)?;

    assert_eq!(session.detect_faces().await?, 0);
    assert_eq!(session.history_len()?, 1);
    assert_eq!(session.current()?, session.original()?);
    Ok(())
}

#[tokio::test]
async fn test_off_canvas_detections_commit_nothing() -> Result<()> {
    let detection = Arc::new(MockDetectionProvider::new(vec![
        DetectionBox::new((f32::NAN, 0.0), (2.0, 2.0)),
        DetectionBox::new((10.0, 10.0), (20.0, 20.0)),
    ]));
    let session = EditSession::with_providers(
        EditorConfig::default(),
        Providers::new().with_detection(detection.clone()),
    )?;
    session.load_image(PixelBuffer::filled(4, 4, GRAY)?)?;

    assert_eq!(session.detect_faces().await?, 0);
    assert_eq!(detection.call_count(), 1);
    assert_eq!(session.history_len()?, 1);
    assert_eq!(session.current()?, session.original()?);
    Ok(())
}

#[tokio::test]
async fn test_progress_reported_for_background_removal() -> Result<()> {
    let reporter = Arc::new(RecordingReporter::default());
    let session = EditSession::with_providers(
        EditorConfig::default(),
        Providers::new().with_segmentation(Arc::new(MockSegmentationProvider::new())),
    )?
    .with_progress_reporter(reporter.clone());
    session.load_image(split(4, 2))?;

    session.remove_background().await?;
    assert_eq!(
        reporter.events(),
        vec![
            "remove_background: Segmentation".to_string(),
            "remove_background: Compositing".to_string(),
            "done remove_background".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_progress_reports_collaborator_failure() -> Result<()> {
    let reporter = Arc::new(RecordingReporter::default());
    let session = EditSession::with_providers(
        EditorConfig::default(),
        Providers::new()
            .with_segmentation(Arc::new(MockSegmentationProvider::failing(MockFailure::Inference))),
    )?
    .with_progress_reporter(reporter.clone());
    session.load_image(split(4, 2))?;

    assert!(session.remove_background().await.is_err());
    let events = reporter.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], "remove_background: Segmentation");
    assert!(events[1].starts_with("error Segmentation: "));
    assert!(!events.iter().any(|e| e.contains("Compositing") || e.starts_with("done")));
    Ok(())
}

#[tokio::test]
async fn test_progress_reported_for_detection() -> Result<()> {
    let reporter = Arc::new(RecordingReporter::default());
    let session = EditSession::with_providers(
        EditorConfig::default(),
        Providers::new().with_detection(Arc::new(MockDetectionProvider::new(vec![
            DetectionBox::new((0.0, 0.0), (2.0, 2.0)),
        ]))),
    )?
    .with_progress_reporter(reporter.clone());
    session.load_image(PixelBuffer::filled(4, 4, GRAY)?)?;

    assert_eq!(session.detect_faces().await?, 1);
    assert_eq!(
        reporter.events(),
        vec![
            "detect_faces: Detection".to_string(),
            "detect_faces: Compositing".to_string(),
            "done detect_faces".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_mixed_pipeline() -> Result<()> {
    let providers = Providers::new()
        .with_segmentation(Arc::new(MockSegmentationProvider::new()))
        .with_detection(Arc::new(MockDetectionProvider::new(vec![
            DetectionBox::new((0.0, 0.0), (3.0, 3.0)),
            DetectionBox::new((4.0, 1.0), (6.0, 4.0)),
        ])));
    let session = EditSession::with_providers(EditorConfig::default(), providers)?;
    session.load_image(split(8, 6))?;

    session.update_adjustments(AdjustmentParams::new(110.0, 120.0, 90.0))?;
    session.commit_adjustments()?;
    session.apply_filter(FilterKind::Sharpen)?;
    session.remove_background().await?;
    assert_eq!(session.detect_faces().await?, 2);

    let labels: Vec<String> = session.history_info()?.into_iter().map(|e| e.label).collect();
    assert_eq!(labels.len(), 5);
    assert_eq!(labels[2], "sharpen");
    assert_eq!(labels[3], "background removal");
    assert_eq!(labels[4], "face detection (2 boxes)");

    while session.can_undo()? {
        session.undo()?;
    }
    assert_eq!(session.current()?, session.original()?);
    Ok(())
}
