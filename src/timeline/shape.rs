use kurbo::Rect;

use crate::bitmap::pipeline::LazyBitmap;
use crate::foundation::core::{Rgb, StageSize, TWIPS_PER_PIXEL};
use crate::timeline::movie::DefId;

/// Fill color of the placeholder shown for photos that could not be loaded.
pub const BROKEN_IMAGE_COLOR: Rgb = Rgb::new(0x33, 0x55, 0xcc);

/// Character definitions a movie can place.
#[derive(Clone, Debug, PartialEq)]
pub enum Definition {
    /// Bitmap whose bytes are held by a [`crate::LazyBitmapPipeline`].
    Bitmap(LazyBitmap),
    /// Rectangle filled with a bitmap at one twip-scaled pixel per pixel.
    BitmapShape {
        /// The bitmap definition.
        bitmap: DefId,
        /// Shape bounds in twips.
        bounds: Rect,
    },
    /// Solid filled rectangle.
    SolidRect {
        /// Fill color.
        color: Rgb,
        /// Bounds in twips.
        bounds: Rect,
    },
    /// Solid rectangle morphing between two bounds.
    RectMorph {
        /// Fill color.
        color: Rgb,
        /// Bounds at ratio 0, in twips.
        start: Rect,
        /// Bounds at ratio 65535, in twips.
        end: Rect,
    },
}

impl Definition {
    /// Bitmap shape centered on the origin, so placement matrices rotate and scale about the
    /// bitmap's center.
    pub fn centered_bitmap_shape(bitmap: DefId, width: u16, height: u16) -> Self {
        let w = f64::from(width) * TWIPS_PER_PIXEL;
        let h = f64::from(height) * TWIPS_PER_PIXEL;
        Self::BitmapShape {
            bitmap,
            bounds: Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0),
        }
    }

    /// Stage-sized shape drawn in place of a photo that failed to load, centered on the origin.
    pub fn broken_image(stage: StageSize) -> Self {
        Self::centered_rect(BROKEN_IMAGE_COLOR, stage)
    }

    /// Stage-sized solid rectangle centered on the origin.
    pub fn centered_rect(color: Rgb, stage: StageSize) -> Self {
        let r = stage.rect_twips();
        Self::SolidRect {
            color,
            bounds: r - r.center().to_vec2(),
        }
    }

    /// `true` for definitions driven by a morph ratio.
    pub fn is_morph(&self) -> bool {
        matches!(self, Self::RectMorph { .. })
    }

    /// Bounds in twips for shapes; `None` for bitmaps.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Bitmap(_) => None,
            Self::BitmapShape { bounds, .. } | Self::SolidRect { bounds, .. } => Some(*bounds),
            Self::RectMorph { start, end, .. } => Some(start.union(*end)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/shape.rs"]
mod tests;
