use kurbo::{Affine, Vec2};

use crate::foundation::core::ColorTransform;
use crate::foundation::error::ShowResult;
use crate::foundation::math::{catmull_rom, lerp};
use crate::timeline::movie::InstanceHandle;
use crate::tween::builder::{TweenBuilder, TweenCtx};
use crate::tween::span::{TweenSpan, TweenState};

/// Morph ratio of the end shape.
pub const MORPH_RATIO_END: u16 = 65535;

/// Materialize `span` through `builder`.
///
/// Spans of 0 or 1 frames produce one instance from the end state. Longer spans produce one
/// instance per frame: the begin state on the first, interpolated states in between and the
/// end state on the last. Returns the instance created for the first frame.
#[tracing::instrument(
    level = "trace",
    skip(builder, ctx),
    fields(start = span.start.0, duration = span.duration)
)]
pub fn tween(
    builder: &mut TweenBuilder,
    ctx: &mut TweenCtx<'_>,
    span: &TweenSpan,
) -> ShowResult<Option<InstanceHandle>> {
    let morph = builder.is_morph(ctx.movie);

    if span.duration <= 1 {
        let handle = builder.initial(ctx, span.start, span.end.composed(), span.end.color)?;
        set_ratio(ctx, handle, morph, MORPH_RATIO_END);
        return Ok(handle);
    }

    let first = builder.initial(ctx, span.start, span.begin.composed(), span.begin.color)?;
    set_ratio(ctx, first, morph, 0);

    let steps = span.duration - 1;
    for i in 1..steps {
        let t = span.ease.apply(f64::from(i) / f64::from(steps));
        let state = interpolate(span, t);
        let handle = builder.subsequent(
            ctx,
            span.start.offset(i),
            state.composed(),
            state.color,
        )?;
        let ratio = (u64::from(i) * u64::from(MORPH_RATIO_END) / u64::from(steps)) as u16;
        set_ratio(ctx, handle, morph, ratio);
    }

    let end_frame = span.end_frame();
    if end_frame != span.start {
        let handle = builder.subsequent(ctx, end_frame, span.end.composed(), span.end.color)?;
        set_ratio(ctx, handle, morph, MORPH_RATIO_END);
    }
    Ok(first)
}

fn set_ratio(ctx: &mut TweenCtx<'_>, handle: Option<InstanceHandle>, morph: bool, ratio: u16) {
    if !morph {
        return;
    }
    if let Some(place) = handle.and_then(|h| ctx.movie.instance_mut(h)) {
        place.ratio = Some(ratio);
    }
}

/// State at eased progress `t` (0 = begin, 1 = end).
pub(crate) fn interpolate(span: &TweenSpan, t: f64) -> TweenState {
    let (begin, end) = (&span.begin, &span.end);
    let transform = match (begin.transform, end.transform) {
        (Some(a), Some(b)) => Some(interpolate_affine(a, b, span.p1, span.p4, t)),
        _ => None,
    };
    let color = match (begin.color, end.color) {
        (Some(a), Some(b)) => Some(ColorTransform::interpolate(&a, &b, t)),
        _ => None,
    };
    TweenState {
        transform,
        color,
        rotation: lerp(begin.rotation, end.rotation, t),
        skew_x: lerp(begin.skew_x, end.skew_x, t),
        skew_y: lerp(begin.skew_y, end.skew_y, t),
    }
}

fn interpolate_affine(a: Affine, b: Affine, p1: Option<Vec2>, p4: Option<Vec2>, t: f64) -> Affine {
    let ca = a.as_coeffs();
    let cb = b.as_coeffs();
    let (tx, ty) = match (p1, p4) {
        (Some(p1), Some(p4)) => (
            catmull_rom(p1.x, ca[4], cb[4], p4.x, t),
            catmull_rom(p1.y, ca[5], cb[5], p4.y, t),
        ),
        _ => (lerp(ca[4], cb[4], t), lerp(ca[5], cb[5], t)),
    };
    Affine::new([
        lerp(ca[0], cb[0], t),
        lerp(ca[1], cb[1], t),
        lerp(ca[2], cb[2], t),
        lerp(ca[3], cb[3], t),
        tx,
        ty,
    ])
}

/// Transform scaling a `src_w` x `src_h` box onto a `dst_w` x `dst_h` box, post-multiplied onto
/// `transform`.
///
/// With `expand_radius` the destination becomes the square circumscribing the circle through
/// its corners. With `maintain_aspect` one uniform factor `max(dst) / max(src)` is used.
pub fn scale_source_to_dest(
    transform: Affine,
    src_w: f64,
    src_h: f64,
    dst_w: f64,
    dst_h: f64,
    maintain_aspect: bool,
    expand_radius: bool,
) -> Affine {
    let (dst_w, dst_h) = if expand_radius {
        let d = 2.0 * ((dst_w / 2.0).powi(2) + (dst_h / 2.0).powi(2)).sqrt();
        (d, d)
    } else {
        (dst_w, dst_h)
    };
    let scale = if maintain_aspect {
        let s = dst_w.max(dst_h) / src_w.max(src_h);
        Vec2::new(s, s)
    } else {
        Vec2::new(dst_w / src_w, dst_h / src_h)
    };
    transform * Affine::scale_non_uniform(scale.x, scale.y)
}

#[cfg(test)]
#[path = "../../tests/unit/tween/engine.rs"]
mod tests;
