use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};

use crate::animation::ease::Ease;
use crate::foundation::core::{Fps, FrameIndex, StageSize, TWIPS_PER_PIXEL};
use crate::foundation::error::{ShowError, ShowResult};
use crate::tween::span::{TweenSpan, TweenState};

/// One pan/zoom keyframe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Keyframe {
    /// Position within the effect, 0 to 1.
    pub start: f64,
    /// Move in a straight line to the next keyframe instead of along the spline.
    #[serde(default)]
    pub linear: bool,
    /// Ease in and out of this keyframe's segment.
    #[serde(default)]
    pub easing: bool,
    /// Horizontal offset of the photo center; -1 and 1 are the stage edges.
    #[serde(default)]
    pub translate_x: f64,
    /// Vertical offset of the photo center; -1 and 1 are the stage edges.
    #[serde(default)]
    pub translate_y: f64,
    /// Size relative to the stage (1 fits the stage). Absent keeps the photo's own size.
    #[serde(default)]
    pub scale: Option<f64>,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
}

/// Check that keyframes are non-empty, finite and ordered within `[0, 1]`, starting at 0.
pub fn validate_keyframes(keyframes: &[Keyframe]) -> ShowResult<()> {
    let Some(first) = keyframes.first() else {
        return Err(ShowError::validation("pan/zoom effect needs at least one keyframe"));
    };
    if first.start != 0.0 {
        return Err(ShowError::validation(format!(
            "keyframe 0: start {} must be 0",
            first.start
        )));
    }
    let mut prev = 0.0;
    for (i, kf) in keyframes.iter().enumerate() {
        if !(0.0..=1.0).contains(&kf.start) {
            return Err(ShowError::validation(format!(
                "keyframe {i}: start {} is outside [0, 1]",
                kf.start
            )));
        }
        if kf.start < prev {
            return Err(ShowError::validation(format!(
                "keyframe {i}: start {} is before the previous keyframe",
                kf.start
            )));
        }
        if let Some(scale) = kf.scale
            && (!scale.is_finite() || scale <= 0.0)
        {
            return Err(ShowError::validation(format!(
                "keyframe {i}: scale must be positive"
            )));
        }
        if ![kf.translate_x, kf.translate_y, kf.rotation]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ShowError::validation(format!(
                "keyframe {i}: translation and rotation must be finite"
            )));
        }
        prev = kf.start;
    }
    Ok(())
}

/// Stage and photo sizes keyframes are resolved against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyframeGeometry {
    /// Stage size.
    pub stage: StageSize,
    /// Photo width in pixels, as placed at scale 1.
    pub photo_width: f64,
    /// Photo height in pixels, as placed at scale 1.
    pub photo_height: f64,
}

impl KeyframeGeometry {
    /// Factor fitting the photo into the stage scaled by `scale`; 1 for an unscaled keyframe.
    pub fn scale_factor(&self, scale: Option<f64>) -> f64 {
        match scale {
            None => 1.0,
            Some(k) => {
                let sx = k * f64::from(self.stage.width) / self.photo_width;
                let sy = k * f64::from(self.stage.height) / self.photo_height;
                sx.min(sy)
            }
        }
    }

    /// Photo center in twips for a keyframe's unit translation.
    pub fn translation(&self, kf: &Keyframe) -> Vec2 {
        let center = self.stage.center_twips().to_vec2();
        let half = Vec2::new(
            f64::from(self.stage.width) * TWIPS_PER_PIXEL / 2.0,
            f64::from(self.stage.height) * TWIPS_PER_PIXEL / 2.0,
        );
        center + Vec2::new(kf.translate_x * half.x, kf.translate_y * half.y)
    }

    /// Tween state placing the centered photo shape at `kf`.
    pub fn state(&self, kf: &Keyframe) -> TweenState {
        let s = self.scale_factor(kf.scale);
        TweenState::at(Affine::translate(self.translation(kf)) * Affine::scale(s))
            .with_rotation(kf.rotation.to_radians())
    }
}

/// Spans realizing a pan/zoom effect.
#[derive(Clone, Debug, PartialEq)]
pub struct PanZoomPlan {
    /// One span per segment between consecutive kept keyframes.
    pub spans: Vec<TweenSpan>,
    /// State of the first keyframe.
    pub first: TweenState,
    /// State of the last keyframe.
    pub last: TweenState,
    /// Scale or rotation changes between keyframes.
    pub varies_scale_or_rotation: bool,
}

/// Turn keyframes into spline segments starting at `start`.
///
/// Each keyframe lasts until the next one starts; zero-length keyframes are dropped unless they
/// are the last. Segments are one frame longer than their keyframe so consecutive segments meet
/// on a shared frame.
pub fn plan_pan_zoom(
    keyframes: &[Keyframe],
    geometry: &KeyframeGeometry,
    fps: Fps,
    effect_secs: f64,
    start: FrameIndex,
) -> ShowResult<PanZoomPlan> {
    validate_keyframes(keyframes)?;

    let mut kept: Vec<(&Keyframe, u32)> = Vec::with_capacity(keyframes.len());
    for (i, kf) in keyframes.iter().enumerate() {
        let next_start = keyframes.get(i + 1).map_or(1.0, |next| next.start);
        let duration = fps.secs_to_frames(effect_secs * (next_start - kf.start));
        let is_last = i + 1 == keyframes.len();
        if duration == 0 && !is_last {
            continue;
        }
        kept.push((kf, duration));
    }

    let states: Vec<TweenState> = kept.iter().map(|(kf, _)| geometry.state(kf)).collect();
    let points: Vec<Vec2> = kept.iter().map(|(kf, _)| geometry.translation(kf)).collect();
    let (first, last) = match (states.first(), states.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return Err(ShowError::validation("pan/zoom effect has no usable keyframes")),
    };

    let first_scale = geometry.scale_factor(kept[0].0.scale);
    let first_rotation = kept[0].0.rotation;
    let varies_scale_or_rotation = kept.iter().skip(1).any(|(kf, _)| {
        geometry.scale_factor(kf.scale) != first_scale || kf.rotation != first_rotation
    });

    let mut spans = Vec::with_capacity(kept.len().saturating_sub(1));
    let mut frame = start;
    for i in 0..kept.len().saturating_sub(1) {
        let (kf, duration) = kept[i];
        let (p1, p4) = if kf.linear {
            (None, None)
        } else {
            let p1 = i.checked_sub(1).map(|j| points[j]);
            (p1, points.get(i + 2).copied())
        };
        spans.push(
            TweenSpan::new(frame, duration + 1, states[i], states[i + 1])
                .with_control_points(p1, p4)
                .with_ease(Ease::from_flag(kf.easing)),
        );
        frame = frame.offset(duration);
    }

    Ok(PanZoomPlan {
        spans,
        first,
        last,
        varies_scale_or_rotation,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/tween/keyframes.rs"]
mod tests;
