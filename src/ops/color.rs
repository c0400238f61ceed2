//! Per-pixel color transforms
//!
//! Every transform reads the source buffer and returns a new one; alpha is
//! never modified. Float results are rounded to nearest and clamped.

use crate::buffer::{clamp_channel, PixelBuffer};
use crate::error::Result;
use crate::types::AdjustmentParams;

/// Rec. 601 luma weights
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

const VINTAGE_GAINS: [f32; 3] = [1.2, 1.1, 0.8];

/// Perceptual brightness of an RGB triple
#[inline]
#[must_use]
pub fn luma(rgb: [f32; 3]) -> f32 {
    LUMA_WEIGHTS[0] * rgb[0] + LUMA_WEIGHTS[1] * rgb[1] + LUMA_WEIGHTS[2] * rgb[2]
}

#[inline]
fn rgb_of(pixel: &[u8]) -> [f32; 3] {
    [
        f32::from(pixel[0]),
        f32::from(pixel[1]),
        f32::from(pixel[2]),
    ]
}

/// Color channel selector for histogram queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// 256-bucket histogram of each color channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    buckets: [[u32; 256]; 3],
}

impl Histogram {
    /// Count channel values over every pixel of `buffer`
    #[must_use]
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        let mut buckets = [[0u32; 256]; 3];
        for pixel in buffer.pixels() {
            for (channel, &value) in buckets.iter_mut().zip(pixel.iter()) {
                channel[usize::from(value)] += 1;
            }
        }
        Self { buckets }
    }

    /// Bucket counts of one channel
    #[must_use]
    pub fn channel(&self, channel: Channel) -> &[u32; 256] {
        &self.buckets[channel.index()]
    }

    /// Lowest and highest occupied bucket, `None` for an empty histogram
    #[must_use]
    pub fn bounds(&self, channel: Channel) -> Option<(u8, u8)> {
        let buckets = self.channel(channel);
        let min = buckets.iter().position(|&count| count > 0)?;
        let max = buckets.iter().rposition(|&count| count > 0)?;
        Some((min as u8, max as u8))
    }
}

/// Stateless per-pixel color transforms
pub struct ColorOps;

impl ColorOps {
    /// Apply brightness, then contrast, then saturation to every pixel.
    ///
    /// The order is fixed; the three steps do not commute. Channels are
    /// carried as floats through all three steps and clamped once at the end.
    ///
    /// # Errors
    /// - `InvalidParameter` when `params` fails validation
    pub fn compose_adjustments(
        original: &PixelBuffer,
        params: &AdjustmentParams,
    ) -> Result<PixelBuffer> {
        params.validate()?;

        let brightness_offset = (params.brightness / 100.0 - 1.0) * 255.0;
        let contrast = params.contrast / 100.0;
        let saturation = params.saturation / 100.0;

        let mut output = original.clone();
        for pixel in output.pixels_mut() {
            let mut rgb = rgb_of(pixel);
            for c in &mut rgb {
                *c += brightness_offset;
                *c = ((*c / 255.0 - 0.5) * contrast + 0.5) * 255.0;
            }
            let gray = luma(rgb);
            for (dst, c) in pixel.iter_mut().zip(rgb) {
                *dst = clamp_channel(gray + saturation * (c - gray));
            }
        }
        Ok(output)
    }

    /// Replace R, G and B with luma
    #[must_use]
    pub fn grayscale(buffer: &PixelBuffer) -> PixelBuffer {
        Self::map_rgb(buffer, |rgb| {
            let gray = luma(rgb);
            [gray, gray, gray]
        })
    }

    /// Classic sepia tone matrix
    #[must_use]
    pub fn sepia(buffer: &PixelBuffer) -> PixelBuffer {
        Self::map_rgb(buffer, |rgb| {
            SEPIA_MATRIX.map(|row| row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2])
        })
    }

    /// `c' = 255 - c`
    #[must_use]
    pub fn negative(buffer: &PixelBuffer) -> PixelBuffer {
        let mut output = buffer.clone();
        for pixel in output.pixels_mut() {
            for c in pixel.iter_mut().take(3) {
                *c = 255 - *c;
            }
        }
        output
    }

    /// Warm tone curve: red and green boosted, blue reduced
    #[must_use]
    pub fn vintage(buffer: &PixelBuffer) -> PixelBuffer {
        Self::map_rgb(buffer, |rgb| {
            [
                rgb[0] * VINTAGE_GAINS[0],
                rgb[1] * VINTAGE_GAINS[1],
                rgb[2] * VINTAGE_GAINS[2],
            ]
        })
    }

    /// Fixed linear boost `c' = c * 1.1 + 5`
    #[must_use]
    pub fn quick_enhance(buffer: &PixelBuffer) -> PixelBuffer {
        Self::map_rgb(buffer, |rgb| rgb.map(|c| c * 1.1 + 5.0))
    }

    /// Per-channel contrast stretch so each channel spans the full 0-255 range.
    ///
    /// A channel whose values are all equal (`max == min`) is left unchanged.
    #[must_use]
    pub fn auto_enhance(buffer: &PixelBuffer) -> PixelBuffer {
        let histogram = Histogram::from_buffer(buffer);
        let tables = Channel::ALL.map(|channel| Self::stretch_table(histogram.bounds(channel)));

        let mut output = buffer.clone();
        for pixel in output.pixels_mut() {
            for (c, table) in pixel.iter_mut().zip(tables.iter()) {
                *c = table[usize::from(*c)];
            }
        }
        output
    }

    fn stretch_table(bounds: Option<(u8, u8)>) -> [u8; 256] {
        let mut table = [0u8; 256];
        for (value, slot) in table.iter_mut().enumerate() {
            *slot = value as u8;
        }
        let Some((min, max)) = bounds else {
            return table;
        };
        if max == min {
            return table;
        }

        let (min, range) = (f32::from(min), f32::from(max) - f32::from(min));
        for (value, slot) in table.iter_mut().enumerate() {
            *slot = clamp_channel((value as f32 - min) / range * 255.0);
        }
        table
    }

    fn map_rgb<F>(buffer: &PixelBuffer, transform: F) -> PixelBuffer
    where
        F: Fn([f32; 3]) -> [f32; 3],
    {
        let mut output = buffer.clone();
        for pixel in output.pixels_mut() {
            let mapped = transform(rgb_of(pixel));
            for (dst, c) in pixel.iter_mut().zip(mapped) {
                *dst = clamp_channel(c);
            }
        }
        output
    }
}
