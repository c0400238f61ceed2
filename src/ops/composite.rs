//! Mask compositing and detection box overlays

use crate::buffer::{clamp_channel, PixelBuffer, CHANNELS};
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::types::{DetectionBox, SegmentationMask};
use image::Rgba;

/// Appearance of detection box overlays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    /// Border color; the fill uses the same color at `fill_alpha`
    pub stroke: Rgba<u8>,
    /// Opacity of the interior fill, 0.0-1.0
    pub fill_alpha: f32,
    /// Border width in pixels, measured inward from the box edge
    pub stroke_width: u32,
}

impl BoxStyle {
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            stroke: config.stroke_rgba(),
            fill_alpha: config.box_fill_alpha,
            stroke_width: config.box_stroke_width,
        }
    }
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

/// Source-over blend of an RGB color with coverage `src_alpha` onto `dst`.
///
/// Results are rounded to nearest; a fully transparent source leaves `dst` as is.
#[inline]
pub fn blend_over(dst: &mut [u8], src: [u8; 3], src_alpha: f32) {
    let src_a = src_alpha.clamp(0.0, 1.0);
    if src_a <= 0.0 || src_a.is_nan() {
        return;
    }
    if src_a >= 1.0 {
        dst[..3].copy_from_slice(&src);
        dst[3] = 255;
        return;
    }

    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }
    for channel in 0..3 {
        let value = (f32::from(src[channel]) * src_a
            + f32::from(dst[channel]) * dst_a * (1.0 - src_a))
            / out_a;
        dst[channel] = clamp_channel(value);
    }
    dst[3] = clamp_channel(out_a * 255.0);
}

/// Pixel rectangle `[x0, x1) x [y0, y1)` in signed coordinates, before clipping
#[derive(Debug, Clone, Copy)]
struct PixelRect {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl PixelRect {
    /// Smallest pixel rectangle covering the box: floor the minimum corner, ceil the maximum
    fn covering(detection: &DetectionBox) -> Self {
        let (min_x, min_y, max_x, max_y) = detection.normalized();
        Self {
            x0: min_x.floor() as i64,
            y0: min_y.floor() as i64,
            x1: max_x.ceil() as i64,
            y1: max_y.ceil() as i64,
        }
    }

    fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    fn on_border(&self, x: i64, y: i64, width: i64) -> bool {
        x < self.x0 + width || x >= self.x1 - width || y < self.y0 + width || y >= self.y1 - width
    }
}

/// Combines classification masks and detection boxes with pixel buffers
pub struct MaskCompositor;

impl MaskCompositor {
    /// Replace every background pixel (mask value 0) with `background`.
    ///
    /// Subject pixels are copied unchanged.
    ///
    /// # Errors
    /// - `DimensionMismatch` when the mask length differs from the buffer pixel count
    pub fn apply_segmentation(
        buffer: &PixelBuffer,
        mask: &SegmentationMask,
        background: Rgba<u8>,
    ) -> Result<PixelBuffer> {
        if mask.len() != buffer.pixel_count() {
            return Err(EditorError::dimension_mismatch(
                buffer.pixel_count(),
                mask.len(),
            ));
        }

        let mut output = buffer.clone();
        for (pixel, &value) in output.pixels_mut().zip(mask.values()) {
            if value == 0 {
                pixel.copy_from_slice(&background.0);
            }
        }
        Ok(output)
    }

    /// Draw each box as a translucent fill plus a solid border onto a copy of `buffer`.
    ///
    /// Boxes are clipped to the buffer and painted in input order, so later
    /// boxes cover earlier ones where they overlap. Boxes with non-finite
    /// coordinates are skipped.
    #[must_use]
    pub fn overlay_boxes(
        buffer: &PixelBuffer,
        boxes: &[DetectionBox],
        style: &BoxStyle,
    ) -> PixelBuffer {
        Self::overlay_boxes_counted(buffer, boxes, style).0
    }

    /// [`MaskCompositor::overlay_boxes`] that also returns how many boxes
    /// touched at least one pixel
    #[must_use]
    pub fn overlay_boxes_counted(
        buffer: &PixelBuffer,
        boxes: &[DetectionBox],
        style: &BoxStyle,
    ) -> (PixelBuffer, usize) {
        let mut output = buffer.clone();
        let mut drawn = 0;
        let width = i64::from(buffer.width());
        let height = i64::from(buffer.height());
        let color = [style.stroke[0], style.stroke[1], style.stroke[2]];
        let stroke_alpha = f32::from(style.stroke[3]) / 255.0;
        let fill_alpha = style.fill_alpha.clamp(0.0, 1.0) * stroke_alpha;
        let stroke_width = i64::from(style.stroke_width);

        for detection in boxes {
            if !detection.is_finite() {
                log::warn!("Skipping detection box with non-finite coordinates: {:?}", detection);
                continue;
            }
            let rect = PixelRect::covering(detection);
            if rect.is_empty() {
                continue;
            }

            let x_start = rect.x0.max(0);
            let y_start = rect.y0.max(0);
            let x_end = rect.x1.min(width);
            let y_end = rect.y1.min(height);
            if x_start >= x_end || y_start >= y_end {
                continue;
            }
            drawn += 1;

            let data = output.as_raw_mut();
            for y in y_start..y_end {
                for x in x_start..x_end {
                    let offset = (y * width + x) as usize * CHANNELS;
                    let alpha = if rect.on_border(x, y, stroke_width) {
                        stroke_alpha
                    } else {
                        fill_alpha
                    };
                    blend_over(&mut data[offset..offset + CHANNELS], color, alpha);
                }
            }
        }
        (output, drawn)
    }
}
