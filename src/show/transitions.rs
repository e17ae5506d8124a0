use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{Affine, Point, Rect, Vec2};

use crate::foundation::core::{ColorTransform, Rgb, StageSize};
use crate::show::model::TransitionKind;
use crate::timeline::shape::Definition;
use crate::tween::engine::scale_source_to_dest;
use crate::tween::span::TweenState;

/// Side of the photo's life a transition plays on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Bringing the photo on stage.
    In,
    /// Taking the photo off stage.
    Out,
}

/// Edge of the iris mask morph at full size, in twips.
pub const IRIS_UNIT_TWIPS: f64 = 2000.0;
/// Edge of the iris mask morph when closed, in twips.
pub const IRIS_CLOSED_TWIPS: f64 = 20.0;

/// Photo state off stage for `kind`, relative to the on-stage `rest` state.
pub fn away_state(
    kind: TransitionKind,
    direction: Direction,
    rest: TweenState,
    stage: StageSize,
) -> TweenState {
    let transform = rest.transform.unwrap_or(Affine::IDENTITY);
    let (w, h) = {
        let r = stage.rect_twips();
        (r.width(), r.height())
    };
    // slide offsets as seen on the way in; the way out mirrors them
    let slide = |v: Vec2| {
        let v = match direction {
            Direction::In => v,
            Direction::Out => -v,
        };
        TweenState {
            transform: Some(Affine::translate(v) * transform),
            ..rest
        }
    };
    match kind {
        TransitionKind::None | TransitionKind::Iris => rest,
        TransitionKind::Fade => rest.with_color(ColorTransform::alpha(0.0)),
        TransitionKind::FadeBlack => rest.with_color(ColorTransform::flat(0.0)),
        TransitionKind::FadeWhite => rest.with_color(ColorTransform::flat(255.0)),
        TransitionKind::Zoom => TweenState {
            transform: Some(transform * Affine::scale(0.0)),
            ..rest
        },
        TransitionKind::SlideLeft => slide(Vec2::new(w, 0.0)),
        TransitionKind::SlideRight => slide(Vec2::new(-w, 0.0)),
        TransitionKind::SlideUp => slide(Vec2::new(0.0, h)),
        TransitionKind::SlideDown => slide(Vec2::new(0.0, -h)),
        TransitionKind::Spin => {
            let turn = match direction {
                Direction::In => -TAU,
                Direction::Out => TAU,
            };
            TweenState {
                transform: Some(transform * Affine::scale(0.0)),
                rotation: rest.rotation + turn,
                ..rest
            }
        }
        TransitionKind::FlipHorizontal => rest.with_skew(rest.skew_x, rest.skew_y + FRAC_PI_2),
    }
}

/// Begin and end states of the photo tween for a transition.
pub fn photo_states(
    kind: TransitionKind,
    direction: Direction,
    rest: TweenState,
    stage: StageSize,
) -> (TweenState, TweenState) {
    let mut rest = rest;
    let fades = matches!(
        kind,
        TransitionKind::Fade | TransitionKind::FadeBlack | TransitionKind::FadeWhite
    );
    if fades && rest.color.is_none() {
        rest.color = Some(ColorTransform::IDENTITY);
    }
    let away = away_state(kind, direction, rest, stage);
    match direction {
        Direction::In => (away, rest),
        Direction::Out => (rest, away),
    }
}

/// Morph shape and placement of the iris mask. The morph opens for [`Direction::In`] and
/// closes for [`Direction::Out`]; at full size it covers the whole stage.
pub fn iris_mask(direction: Direction, stage: StageSize) -> (Definition, Affine) {
    let closed = Rect::from_center_size(Point::ORIGIN, (IRIS_CLOSED_TWIPS, IRIS_CLOSED_TWIPS));
    let open = Rect::from_center_size(Point::ORIGIN, (IRIS_UNIT_TWIPS, IRIS_UNIT_TWIPS));
    let (start, end) = match direction {
        Direction::In => (closed, open),
        Direction::Out => (open, closed),
    };
    let r = stage.rect_twips();
    let matrix = scale_source_to_dest(
        Affine::translate(stage.center_twips().to_vec2()),
        IRIS_UNIT_TWIPS,
        IRIS_UNIT_TWIPS,
        r.width(),
        r.height(),
        true,
        true,
    );
    (
        Definition::RectMorph {
            color: Rgb::new(0, 0, 0),
            start,
            end,
        },
        matrix,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/show/transitions.rs"]
mod tests;
