//! Neighborhood transforms: box blur and 3x3 convolution
//!
//! Both read exclusively from the untouched source buffer, so writes never
//! feed back into later window reads within the same pass.

use crate::buffer::{clamp_channel, PixelBuffer, CHANNELS};

/// Sharpening kernel, row-major
pub const SHARPEN_KERNEL: [i32; 9] = [0, -1, 0, -1, 5, -1, 0, -1, 0];

/// Color channels touched by neighborhood transforms (alpha is left alone)
const COLOR_CHANNELS: usize = 3;

/// Stateless windowed transforms
pub struct NeighborhoodOps;

impl NeighborhoodOps {
    /// Average R, G and B over the `[-radius, +radius]^2` window around each pixel.
    ///
    /// The window is intersected with the buffer, and the divisor is the number
    /// of in-bounds samples, so edge pixels average over a smaller area.
    /// Runs in constant time per pixel using one summed-area table per channel.
    #[must_use]
    pub fn box_blur(buffer: &PixelBuffer, radius: u32) -> PixelBuffer {
        if radius == 0 {
            return buffer.clone();
        }

        let width = buffer.width() as usize;
        let height = buffer.height() as usize;
        let radius = radius as usize;
        let tables = SummedAreaTables::build(buffer);

        let mut output = buffer.clone();
        let data = output.as_raw_mut();
        for y in 0..height {
            let y0 = y.saturating_sub(radius);
            let y1 = (y + radius).min(height - 1);
            for x in 0..width {
                let x0 = x.saturating_sub(radius);
                let x1 = (x + radius).min(width - 1);
                let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as f64;

                let offset = (y * width + x) * CHANNELS;
                for channel in 0..COLOR_CHANNELS {
                    let sum = tables.window_sum(channel, x0, y0, x1, y1);
                    data[offset + channel] = clamp_channel((sum as f64 / count) as f32);
                }
            }
        }
        output
    }

    /// Apply the fixed 3x3 sharpening kernel to the interior of the buffer
    #[must_use]
    pub fn sharpen(buffer: &PixelBuffer) -> PixelBuffer {
        Self::convolve_3x3(buffer, &SHARPEN_KERNEL)
    }

    /// Convolve R, G and B with a 3x3 integer kernel.
    ///
    /// Only interior pixels (`1 <= x < width - 1`, `1 <= y < height - 1`) are
    /// written; the one-pixel border is copied from the source unchanged.
    #[must_use]
    pub fn convolve_3x3(buffer: &PixelBuffer, kernel: &[i32; 9]) -> PixelBuffer {
        let width = buffer.width() as usize;
        let height = buffer.height() as usize;
        let mut output = buffer.clone();
        if width < 3 || height < 3 {
            return output;
        }

        let source = buffer.as_raw();
        let data = output.as_raw_mut();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let offset = (y * width + x) * CHANNELS;
                for channel in 0..COLOR_CHANNELS {
                    let mut acc = 0i32;
                    for (k, weight) in kernel.iter().enumerate() {
                        if *weight == 0 {
                            continue;
                        }
                        let sy = y + k / 3 - 1;
                        let sx = x + k % 3 - 1;
                        acc += weight * i32::from(source[(sy * width + sx) * CHANNELS + channel]);
                    }
                    data[offset + channel] = acc.clamp(0, 255) as u8;
                }
            }
        }
        output
    }
}

/// Inclusive prefix sums of each color channel, `(width + 1) x (height + 1)` each
struct SummedAreaTables {
    stride: usize,
    tables: [Vec<u64>; COLOR_CHANNELS],
}

impl SummedAreaTables {
    fn build(buffer: &PixelBuffer) -> Self {
        let width = buffer.width() as usize;
        let height = buffer.height() as usize;
        let stride = width + 1;
        let source = buffer.as_raw();

        let mut tables: [Vec<u64>; COLOR_CHANNELS] =
            std::array::from_fn(|_| vec![0u64; stride * (height + 1)]);
        for (channel, table) in tables.iter_mut().enumerate() {
            for y in 0..height {
                let mut row_sum = 0u64;
                for x in 0..width {
                    row_sum += u64::from(source[(y * width + x) * CHANNELS + channel]);
                    table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
                }
            }
        }
        Self { stride, tables }
    }

    /// Sum over the inclusive rectangle `[x0, x1] x [y0, y1]`
    fn window_sum(&self, channel: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let table = &self.tables[channel];
        let s = self.stride;
        table[(y1 + 1) * s + x1 + 1] + table[y0 * s + x0]
            - table[y0 * s + x1 + 1]
            - table[(y1 + 1) * s + x0]
    }
}
