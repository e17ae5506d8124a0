use image::{ImageFormat, RgbaImage};
use kurbo::Affine;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::ShowResult;
use crate::show::model::{EffectKind, EffectSpec};
use crate::timeline::movie::{DefId, InstanceHandle};
use crate::tween::builder::{RasterTween, TweenBuilder, TweenCtx};
use crate::tween::engine::tween;
use crate::tween::keyframes::{KeyframeGeometry, PanZoomPlan, plan_pan_zoom};
use crate::tween::span::TweenState;

/// Photo states around an effect and the spans that realize it.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectPlan {
    /// State the begin transition settles into.
    pub rest_in: TweenState,
    /// State the end transition leaves from.
    pub rest_out: TweenState,
    /// Pan/zoom segments; `None` for a still photo.
    pub pan_zoom: Option<PanZoomPlan>,
    /// Render every frame into a bitmap instead of moving the photo.
    pub rasterize: bool,
}

/// Decide how `spec` plays from `start`.
///
/// `rasterizable` is false when no photo pixels are available, which rules out rasterizing.
pub fn plan_effect(
    spec: &EffectSpec,
    geometry: &KeyframeGeometry,
    fps: Fps,
    start: FrameIndex,
    quality: bool,
    rasterizable: bool,
) -> ShowResult<EffectPlan> {
    let centered = TweenState::at(Affine::translate(
        geometry.stage.center_twips().to_vec2(),
    ));
    if spec.kind != EffectKind::PanZoom || spec.keyframes.is_empty() {
        return Ok(EffectPlan {
            rest_in: centered,
            rest_out: centered,
            pan_zoom: None,
            rasterize: false,
        });
    }

    let plan = plan_pan_zoom(&spec.keyframes, geometry, fps, spec.duration, start)?;
    let rasterize =
        quality && rasterizable && plan.varies_scale_or_rotation && !plan.spans.is_empty();
    Ok(EffectPlan {
        rest_in: plan.first,
        // rasterized frames are stage-sized bitmaps placed at the stage center
        rest_out: if rasterize { centered } else { plan.last },
        pan_zoom: Some(plan),
        rasterize,
    })
}

/// Pixels needed by a rasterized effect.
#[derive(Clone, Debug)]
pub struct EffectPhoto {
    /// Fitted photo.
    pub image: RgbaImage,
    /// Source format, for delegate selection.
    pub format: Option<ImageFormat>,
}

/// Play the effect on the photo instance `anchor` at `depth`.
///
/// Returns the rasterized shape and bitmap still on stage at the end, if any.
pub fn run_effect(
    plan: &EffectPlan,
    ctx: &mut TweenCtx<'_>,
    anchor: InstanceHandle,
    depth: u16,
    photo: Option<EffectPhoto>,
) -> ShowResult<Option<(DefId, DefId)>> {
    let Some(pan_zoom) = &plan.pan_zoom else {
        return Ok(None);
    };
    let mut builder = match (plan.rasterize, photo) {
        (true, Some(photo)) => TweenBuilder::Rasterize(RasterTween::new(
            photo.image,
            photo.format,
            depth,
            anchor,
        )),
        _ => TweenBuilder::retarget(anchor, depth),
    };
    for span in &pan_zoom.spans {
        tween(&mut builder, ctx, span)?;
    }
    Ok(match &builder {
        TweenBuilder::Rasterize(raster) => raster.live_definitions(),
        _ => None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/show/effects.rs"]
mod tests;
