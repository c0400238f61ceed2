//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::config::EditorConfig;
use crate::types::FilterKind;
use anyhow::{bail, Context, Result};

/// Convert CLI arguments to an `EditorConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Start from the `--config` file (or defaults) and apply flag overrides
    pub(crate) fn from_cli(cli: &Cli) -> Result<EditorConfig> {
        let mut config = match &cli.config {
            Some(path) => EditorConfig::from_json_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => EditorConfig::default(),
        };

        if let Some(radius) = cli.blur_radius {
            config.default_blur_radius = radius;
            config.max_blur_radius = config.max_blur_radius.max(radius);
        }
        if let Some(threshold) = cli.mask_threshold {
            config.mask_threshold = threshold;
        }
        if let Some(hex) = &cli.background {
            config.background_fill = parse_hex_color(hex)?;
        }
        if cli.no_resize {
            config.max_ingest_dimensions = None;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate CLI arguments before any work is done
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if !cli.input.exists() {
            bail!("Input file does not exist: {}", cli.input.display());
        }
        for name in &cli.filters {
            FilterKind::parse(name, 0)?;
        }
        for (flag, value) in [
            ("brightness", cli.brightness),
            ("contrast", cli.contrast),
            ("saturation", cli.saturation),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("--{} must be a non-negative number, got {}", flag, value);
            }
        }
        if let Some(mask) = &cli.mask {
            if !mask.exists() {
                bail!("Mask file does not exist: {}", mask.display());
            }
        }
        if let Some(boxes) = &cli.boxes {
            if !boxes.exists() {
                bail!("Boxes file does not exist: {}", boxes.display());
            }
        }
        Ok(())
    }
}

/// Parse `rrggbb` or `rrggbbaa`, with or without a leading `#`
pub(crate) fn parse_hex_color(hex: &str) -> Result<[u8; 4]> {
    let digits = hex.trim().trim_start_matches('#');
    if !matches!(digits.len(), 6 | 8) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid color '{}': expected rrggbb or rrggbbaa", hex);
    }

    let mut rgba = [255u8; 4];
    for (i, channel) in rgba.iter_mut().enumerate().take(digits.len() / 2) {
        let pair = digits
            .get(i * 2..i * 2 + 2)
            .context("color digits out of range")?;
        *channel = u8::from_str_radix(pair, 16)?;
    }
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ffffff").unwrap(), [255, 255, 255, 255]);
        assert_eq!(parse_hex_color("00ff0080").unwrap(), [0, 255, 0, 128]);
        assert!(parse_hex_color("fff").is_err());
        assert!(parse_hex_color("gg0000").is_err());
    }

    #[test]
    fn test_from_cli_overrides() {
        let cli = Cli::parse_from([
            "imgly-editor",
            "in.png",
            "--blur-radius",
            "80",
            "--background",
            "000000",
            "--no-resize",
        ]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.default_blur_radius, 80);
        assert_eq!(config.max_blur_radius, 80);
        assert_eq!(config.background_fill, [0, 0, 0, 255]);
        assert!(config.max_ingest_dimensions.is_none());
    }

    #[test]
    fn test_validate_cli_rejects_unknown_filter() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        std::fs::write(&input, b"placeholder").unwrap();

        let input = input.to_str().unwrap();

        let cli = Cli::parse_from(["imgly-editor", input, "--filter", "posterize"]);
        assert!(CliConfigBuilder::validate_cli(&cli).is_err());

        let cli = Cli::parse_from(["imgly-editor", input, "-f", "sepia"]);
        assert!(CliConfigBuilder::validate_cli(&cli).is_ok());
    }
}
