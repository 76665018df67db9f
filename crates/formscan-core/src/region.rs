//! Conversion of fractional template regions into pixel boxes.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::RegionError;
use crate::models::template::Rect;

/// A region in integer pixel coordinates of a specific image.
///
/// Always satisfies `x1 < x2 <= width` and `y1 < y2 <= height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelBox {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

/// Resolve a fractional rect against an image of `width` x `height` pixels.
///
/// Coordinates are truncated, not rounded, so results are identical on
/// every platform.
pub fn resolve(rect: &Rect, width: u32, height: u32) -> Result<PixelBox, RegionError> {
    for (field, value) in rect.fields() {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(RegionError::OutOfRange { field, value });
        }
    }

    let x1 = scale(width, rect.x_start);
    let x2 = scale(width, rect.x_end);
    let y1 = scale(height, rect.y_start);
    let y2 = scale(height, rect.y_end);

    if x2 <= x1 || y2 <= y1 {
        return Err(RegionError::Degenerate {
            x1,
            y1,
            x2,
            y2,
            width,
            height,
        });
    }

    Ok(PixelBox { x1, y1, x2, y2 })
}

fn scale(extent: u32, fraction: f64) -> u32 {
    // fraction is in [0, 1], so the product never exceeds extent
    (extent as f64 * fraction).floor() as u32
}

/// Copy the pixels of `bbox` out of `image`.
pub fn crop(image: &DynamicImage, bbox: &PixelBox) -> DynamicImage {
    image.crop_imm(bbox.x1, bbox.y1, bbox.width(), bbox.height())
}
