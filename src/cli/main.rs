//! Image editor CLI tool
//!
//! Runs a single editing pipeline over one image: load, slider adjustments,
//! enhancements, filters, optional mask-driven background removal and box
//! overlay, then writes a PNG.

use super::config::CliConfigBuilder;
use crate::{
    backends::{StaticBoxProvider, StaticMaskProvider},
    inference::Providers,
    services::TracingProgressReporter,
    tracing_config::spans,
    types::{AdjustmentParams, FilterKind},
    EditSession, EditorError,
};
use anyhow::{Context, Result};
use clap::Parser;
use instant::Instant;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, Instrument};

/// Image editing CLI tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "imgly-editor")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output PNG file
    #[arg(short, long, value_name = "OUTPUT", default_value = "edited-image.png")]
    pub output: PathBuf,

    /// JSON editor configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Brightness in percent (100 = unchanged)
    #[arg(long, default_value_t = 100.0)]
    pub brightness: f32,

    /// Contrast in percent (100 = unchanged)
    #[arg(long, default_value_t = 100.0)]
    pub contrast: f32,

    /// Saturation in percent (100 = unchanged)
    #[arg(long, default_value_t = 100.0)]
    pub saturation: f32,

    /// Stretch each channel's histogram to the full range
    #[arg(long)]
    pub auto_enhance: bool,

    /// Apply the quick enhancement (10% gain plus lift)
    #[arg(long)]
    pub enhance: bool,

    /// Filter to apply, in order (grayscale, sepia, negative, vintage, blur, sharpen); repeatable
    #[arg(short, long = "filter", value_name = "NAME")]
    pub filters: Vec<String>,

    /// Radius used by the blur filter
    #[arg(long)]
    pub blur_radius: Option<u32>,

    /// Grayscale mask image for background removal (white = subject)
    #[arg(long, value_name = "PATH")]
    pub mask: Option<PathBuf>,

    /// Threshold for binarizing the mask image
    #[arg(long)]
    pub mask_threshold: Option<u8>,

    /// Background fill as hex RGB or RGBA (e.g. ffffff, 00000080)
    #[arg(long, value_name = "HEX")]
    pub background: Option<String>,

    /// JSON file with detection boxes to overlay
    #[arg(long, value_name = "PATH")]
    pub boxes: Option<PathBuf>,

    /// Keep the full input resolution instead of fitting it to the ingest bounds
    #[arg(long)]
    pub no_resize: bool,

    /// Print the edit history as JSON after processing
    #[arg(long)]
    pub print_history: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Main entry point for CLI
pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    crate::tracing_config::init_cli_tracing(cli.verbose)
        .context("Failed to initialize tracing")?;

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    let mut providers = Providers::new();
    if let Some(mask) = &cli.mask {
        providers = providers.with_segmentation(Arc::new(StaticMaskProvider::new(
            mask,
            config.mask_threshold,
        )));
    }
    if let Some(boxes) = &cli.boxes {
        providers = providers.with_detection(Arc::new(StaticBoxProvider::new(boxes)));
    }

    let session = EditSession::with_providers(config, providers)
        .context("Failed to create edit session")?
        .with_progress_reporter(Arc::new(TracingProgressReporter));
    let session_id = session.id().to_string();

    let start_time = Instant::now();
    run_pipeline(&cli, &session)
        .instrument(spans::run(&session_id, &cli.input))
        .await?;

    session
        .with_current(|buffer| crate::services::ImageIOService::save_png(buffer, &cli.output))
        .context("No image to save")?
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    info!(
        "Saved {} ({} edits) in {}ms",
        cli.output.display(),
        session.history_len()?.saturating_sub(1),
        start_time.elapsed().as_millis()
    );

    if cli.print_history {
        let history = session.history_info()?;
        println!("{}", serde_json::to_string_pretty(&history)?);
    }
    Ok(())
}

async fn run_pipeline(cli: &Cli, session: &EditSession) -> Result<()> {
    {
        let _step = spans::step("load").entered();
        session
            .load_image_file(&cli.input)
            .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    }

    let params = AdjustmentParams::new(cli.brightness, cli.contrast, cli.saturation);
    if !params.is_neutral() {
        let _step = spans::step("adjustments").entered();
        session
            .update_adjustments(params)
            .context("Invalid adjustment values")?;
        match session.commit_adjustments() {
            Ok(()) => {},
            Err(EditorError::NoOp(_)) => debug!("Adjustments left the image unchanged"),
            Err(e) => return Err(e.into()),
        }
    }

    if cli.auto_enhance {
        session.auto_enhance().context("Auto enhance failed")?;
    }
    if cli.enhance {
        session.enhance().context("Enhance failed")?;
    }

    for name in &cli.filters {
        let kind = FilterKind::parse(name, session.config().default_blur_radius)?;
        let _step = spans::step(kind.name()).entered();
        session
            .apply_filter(kind)
            .with_context(|| format!("Failed to apply filter {}", kind))?;
    }

    if cli.mask.is_some() {
        session
            .remove_background()
            .await
            .context("Background removal failed")?;
    }

    if cli.boxes.is_some() {
        let count = session.detect_faces().await.context("Box overlay failed")?;
        debug!(count, "Boxes drawn");
    }
    Ok(())
}
