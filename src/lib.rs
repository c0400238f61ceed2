#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # IMG.LY Image Editor Core
//!
//! Pixel-buffer processing and undo/redo engine for interactive image editors.
//!
//! The crate provides deterministic transforms over 8-bit RGBA buffers
//! (slider adjustments, color filters, box blur, sharpening, histogram
//! auto-levels), compositing of externally produced segmentation masks and
//! detection boxes, and a bounded linear history that keeps edits
//! non-destructive. Machine-learning models are not part of the crate: they
//! plug in through the [`SegmentationProvider`] and [`DetectionProvider`]
//! traits.
//!
//! ## Features
//!
//! - **Non-destructive sliders**: brightness, contrast and saturation always
//!   composed against the original image
//! - **Filters**: grayscale, sepia, negative, vintage, box blur, sharpen
//! - **Enhancement**: per-channel histogram stretch and a quick gain/lift
//! - **AI compositing**: background fill from a segmentation mask, face box overlays
//! - **History**: bounded undo/redo with branch discard
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use imgly_editor::{AdjustmentParams, EditSession, EditorConfig, FilterKind, PixelBuffer, Rgba};
//!
//! # fn main() -> imgly_editor::Result<()> {
//! let session = EditSession::new(EditorConfig::default())?;
//! session.load_image(PixelBuffer::filled(8, 8, Rgba([120, 80, 40, 255]))?)?;
//!
//! // Slider drags only preview; commit when the gesture ends
//! session.update_adjustments(AdjustmentParams::new(120.0, 100.0, 100.0))?;
//! session.commit_adjustments()?;
//!
//! session.apply_filter(FilterKind::Sepia)?;
//! session.undo()?;
//! assert_eq!(session.history_len()?, 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Model-backed operations
//!
//! ```rust,no_run
//! use imgly_editor::backends::MockSegmentationProvider;
//! use imgly_editor::{EditSession, EditorConfig, Providers};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let providers = Providers::new().with_segmentation(Arc::new(MockSegmentationProvider::new()));
//! let session = EditSession::with_providers(EditorConfig::default(), providers)?;
//! session.load_image_file("portrait.jpg")?;
//! session.remove_background().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): Command-line interface and tracing subscriber setup
//! - `webp-support` (default): WebP image decoding
//! - `tracing-json`: JSON log output for the CLI

pub mod backends;
pub mod buffer;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod inference;
pub mod ops;
pub mod services;
pub mod session;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

// Public API exports
pub use buffer::{clamp_channel, PixelBuffer, CHANNELS};
pub use config::{EditorConfig, EditorConfigBuilder, DEFAULT_HISTORY_CAPACITY};
pub use error::{EditorError, Result};
pub use history::{EditHistory, HistoryEntry, HistoryEntryInfo};
pub use image::Rgba;
pub use inference::{DetectionProvider, Providers, SegmentationProvider};
pub use ops::{
    apply_filter, BoxStyle, Channel, ColorOps, Histogram, MaskCompositor, NeighborhoodOps,
};
pub use services::{
    ImageIOService, NoOpProgressReporter, ProcessingStage, ProgressReporter, ProgressUpdate,
    TracingProgressReporter,
};
pub use session::EditSession;
pub use types::{AdjustmentParams, DetectionBox, FilterKind, SegmentationMask, NEUTRAL_ADJUSTMENT};
pub use utils::NumericValidator;

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, spans, TracingConfig, TracingFormat};
