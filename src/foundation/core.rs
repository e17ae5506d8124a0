use crate::foundation::error::{ShowError, ShowResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Container coordinates are expressed in twips, 20 per pixel.
pub const TWIPS_PER_PIXEL: f64 = 20.0;

/// Largest stage edge in pixels accepted by players.
pub const MAX_STAGE_PX: u32 = 2880;

/// Default upper bound on the number of frames a show or audio track may occupy.
pub const DEFAULT_MAX_FRAMES: u32 = 16_000;

/// Absolute 0-based frame index in the movie timeline.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u32);

impl FrameIndex {
    /// Index `frames` frames later, saturating at `u32::MAX`.
    pub fn offset(self, frames: u32) -> Self {
        Self(self.0.saturating_add(frames))
    }
}

/// Frame rate as stored in the container header: unsigned 8.8 fixed point.
///
/// All frame/second conversions go through the quantized value so the durations computed while
/// building a show match what a player derives from the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    fixed: u16,
}

impl Fps {
    /// Create a validated frame rate from frames per second.
    pub fn new(fps: f32) -> ShowResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ShowError::validation("frame rate must be positive"));
        }
        if fps >= 256.0 {
            return Err(ShowError::validation("frame rate must be below 256"));
        }
        let fixed = (fps * 256.0) as u16;
        Self::from_fixed_8_8(fixed)
    }

    /// Create a frame rate from its 8.8 fixed point encoding.
    pub fn from_fixed_8_8(fixed: u16) -> ShowResult<Self> {
        if fixed == 0 {
            return Err(ShowError::validation("frame rate must be positive"));
        }
        Ok(Self { fixed })
    }

    /// 8.8 fixed point encoding written into the container header.
    pub fn to_fixed_8_8(self) -> u16 {
        self.fixed
    }

    /// Frames per second after quantization.
    pub fn as_f64(self) -> f64 {
        f64::from(self.fixed) / 256.0
    }

    /// Convert a frame count to seconds.
    pub fn frames_to_secs(self, frames: u32) -> f64 {
        f64::from(frames) / self.as_f64()
    }

    /// Convert seconds to a frame count, truncating toward zero.
    pub fn secs_to_frames(self, secs: f64) -> u32 {
        let frames = secs * self.as_f64();
        if frames <= 0.0 {
            0
        } else if frames >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            frames as u32
        }
    }
}

/// Stage dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for StageSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl StageSize {
    /// Create a validated stage size.
    pub fn new(width: u32, height: u32) -> ShowResult<Self> {
        if width == 0 || height == 0 {
            return Err(ShowError::validation("stage width/height must be non-zero"));
        }
        if width.max(height) > MAX_STAGE_PX {
            return Err(ShowError::validation(format!(
                "stage must be at most {MAX_STAGE_PX}px on each side"
            )));
        }
        Ok(Self { width, height })
    }

    /// Stage rectangle in pixels, origin at the top-left corner.
    pub fn rect_px(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Stage rectangle in twips.
    pub fn rect_twips(self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.width) * TWIPS_PER_PIXEL,
            f64::from(self.height) * TWIPS_PER_PIXEL,
        )
    }

    /// Stage center in twips.
    pub fn center_twips(self) -> Point {
        self.rect_twips().center()
    }
}

/// Opaque RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a color from channel values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Per-channel color transform applied to a placed object: `out = in * mult + add`.
///
/// Channels are ordered red, green, blue, alpha. Multipliers are fractions (1.0 leaves the
/// channel unchanged), addends are in 0..=255 channel units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorTransform {
    /// Channel multipliers.
    pub mult: [f64; 4],
    /// Channel addends.
    pub add: [f64; 4],
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorTransform {
    /// Transform that leaves colors unchanged.
    pub const IDENTITY: Self = Self {
        mult: [1.0; 4],
        add: [0.0; 4],
    };

    /// Transform that only scales alpha.
    pub fn alpha(alpha: f64) -> Self {
        Self {
            mult: [1.0, 1.0, 1.0, alpha],
            add: [0.0; 4],
        }
    }

    /// Transform that replaces every color with the gray `level` (0 to 255), keeping alpha.
    pub fn flat(level: f64) -> Self {
        Self {
            mult: [0.0, 0.0, 0.0, 1.0],
            add: [level, level, level, 0.0],
        }
    }

    /// Component-wise linear interpolation between `self` (`t = 0`) and `other` (`t = 1`).
    pub fn interpolate(&self, other: &Self, t: f64) -> Self {
        let mut out = *self;
        for i in 0..4 {
            out.mult[i] = self.mult[i] + (other.mult[i] - self.mult[i]) * t;
            out.add[i] = self.add[i] + (other.add[i] - self.add[i]) * t;
        }
        out
    }

    /// `true` when any multiplier differs from 1.
    pub fn has_mult(&self) -> bool {
        self.mult.iter().any(|&m| m != 1.0)
    }

    /// `true` when any addend is non-zero.
    pub fn has_add(&self) -> bool {
        self.add.iter().any(|&a| a != 0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
