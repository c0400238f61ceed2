//! Pure pixel transforms
//!
//! Every operation takes a source buffer by reference and returns a freshly
//! allocated result, leaving the source untouched.

pub mod color;
pub mod composite;
pub mod neighborhood;

pub use color::{luma, Channel, ColorOps, Histogram};
pub use composite::{blend_over, BoxStyle, MaskCompositor};
pub use neighborhood::{NeighborhoodOps, SHARPEN_KERNEL};

use crate::buffer::PixelBuffer;
use crate::types::FilterKind;

/// Run a named filter against `buffer`
#[must_use]
pub fn apply_filter(buffer: &PixelBuffer, kind: FilterKind) -> PixelBuffer {
    match kind {
        FilterKind::Grayscale => ColorOps::grayscale(buffer),
        FilterKind::Sepia => ColorOps::sepia(buffer),
        FilterKind::Negative => ColorOps::negative(buffer),
        FilterKind::Vintage => ColorOps::vintage(buffer),
        FilterKind::Blur { radius } => NeighborhoodOps::box_blur(buffer, radius),
        FilterKind::Sharpen => NeighborhoodOps::sharpen(buffer),
    }
}
