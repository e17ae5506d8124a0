use kurbo::{Affine, Vec2};

use crate::animation::ease::Ease;
use crate::foundation::core::{ColorTransform, FrameIndex};

/// Animated properties at one end of a tween.
///
/// `transform` holds scale, shear and translation in twips; rotation and skew angles (radians)
/// are kept separate so they interpolate as angles rather than as matrix coefficients.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TweenState {
    /// Scale/shear/translation. `None` leaves the instance transform untouched.
    pub transform: Option<Affine>,
    /// Color transform. `None` leaves the instance color untouched.
    pub color: Option<ColorTransform>,
    /// Rotation in radians.
    pub rotation: f64,
    /// Horizontal skew in radians.
    pub skew_x: f64,
    /// Vertical skew in radians.
    pub skew_y: f64,
}

impl TweenState {
    /// State with only a transform.
    pub fn at(transform: Affine) -> Self {
        Self {
            transform: Some(transform),
            ..Self::default()
        }
    }

    /// Replace the color transform.
    pub fn with_color(mut self, color: ColorTransform) -> Self {
        self.color = Some(color);
        self
    }

    /// Replace the rotation.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Replace the skew angles.
    pub fn with_skew(mut self, skew_x: f64, skew_y: f64) -> Self {
        self.skew_x = skew_x;
        self.skew_y = skew_y;
        self
    }

    /// Transform with skew and rotation composed in, as placed on the display list.
    pub fn composed(&self) -> Option<Affine> {
        self.transform
            .map(|t| compose_rotation(t, self.rotation, self.skew_x, self.skew_y))
    }
}

/// Concatenate the skew matrix `[cos(skew_y), sin(skew_y), -sin(skew_x), cos(skew_x)]`, then
/// the rotation, onto `transform`.
pub fn compose_rotation(transform: Affine, rotation: f64, skew_x: f64, skew_y: f64) -> Affine {
    let mut m = transform;
    if skew_x != 0.0 || skew_y != 0.0 {
        m *= Affine::new([
            skew_y.cos(),
            skew_y.sin(),
            -skew_x.sin(),
            skew_x.cos(),
            0.0,
            0.0,
        ]);
    }
    if rotation != 0.0 {
        m *= Affine::rotate(rotation);
    }
    m
}

/// A frame span to interpolate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenSpan {
    /// First frame.
    pub start: FrameIndex,
    /// Number of frames. Spans of 0 or 1 frames materialize only the end state.
    pub duration: u32,
    /// State on the first frame.
    pub begin: TweenState,
    /// State on the last frame.
    pub end: TweenState,
    /// Translation of the control point before `begin`.
    pub p1: Option<Vec2>,
    /// Translation of the control point after `end`.
    pub p4: Option<Vec2>,
    /// Easing applied to progress.
    pub ease: Ease,
}

impl TweenSpan {
    /// Linear span between two states.
    pub fn new(start: FrameIndex, duration: u32, begin: TweenState, end: TweenState) -> Self {
        Self {
            start,
            duration,
            begin,
            end,
            p1: None,
            p4: None,
            ease: Ease::Linear,
        }
    }

    /// Set the outer spline control points. Translation follows a Catmull-Rom curve only when
    /// both are present.
    pub fn with_control_points(mut self, p1: Option<Vec2>, p4: Option<Vec2>) -> Self {
        self.p1 = p1;
        self.p4 = p4;
        self
    }

    /// Set the easing curve.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Last frame of the span.
    pub fn end_frame(&self) -> FrameIndex {
        self.start.offset(self.duration.saturating_sub(1))
    }
}
