use super::*;

fn stage() -> StageSize {
    StageSize::new(640, 480).unwrap()
}

fn rest() -> TweenState {
    TweenState::at(Affine::translate((6400.0, 4800.0)))
}

fn translation(state: &TweenState) -> (f64, f64) {
    let c = state.transform.unwrap().as_coeffs();
    (c[4], c[5])
}

#[test]
fn fades_run_alpha_between_zero_and_identity() {
    let (begin, end) = photo_states(TransitionKind::Fade, Direction::In, rest(), stage());
    assert_eq!(begin.color, Some(ColorTransform::alpha(0.0)));
    assert_eq!(end.color, Some(ColorTransform::IDENTITY));
    assert_eq!(begin.transform, end.transform);

    let (begin, end) = photo_states(TransitionKind::Fade, Direction::Out, rest(), stage());
    assert_eq!(begin.color, Some(ColorTransform::IDENTITY));
    assert_eq!(end.color, Some(ColorTransform::alpha(0.0)));
}

#[test]
fn color_fades_pass_through_black_or_white() {
    let (begin, end) = photo_states(TransitionKind::FadeBlack, Direction::In, rest(), stage());
    let black = begin.color.unwrap();
    assert_eq!(black.mult, [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(black.add, [0.0; 4]);
    assert_eq!(end.color, Some(ColorTransform::IDENTITY));
    assert_eq!(begin.transform, end.transform);

    let (begin, end) = photo_states(TransitionKind::FadeWhite, Direction::Out, rest(), stage());
    assert_eq!(begin.color, Some(ColorTransform::IDENTITY));
    let white = end.color.unwrap();
    assert_eq!(white.add, [255.0, 255.0, 255.0, 0.0]);
    // halfway the photo is blended with white, alpha untouched
    let mid = ColorTransform::IDENTITY.interpolate(&white, 0.5);
    assert_eq!(mid.mult, [0.5, 0.5, 0.5, 1.0]);
    assert_eq!(mid.add[0], 127.5);
}

#[test]
fn slides_enter_and_leave_on_opposite_sides() {
    let (begin, end) = photo_states(TransitionKind::SlideLeft, Direction::In, rest(), stage());
    assert_eq!(translation(&begin), (6400.0 + 12800.0, 4800.0));
    assert_eq!(end, rest());

    let (begin, end) = photo_states(TransitionKind::SlideLeft, Direction::Out, rest(), stage());
    assert_eq!(begin, rest());
    assert_eq!(translation(&end), (6400.0 - 12800.0, 4800.0));

    let away = away_state(TransitionKind::SlideDown, Direction::In, rest(), stage());
    assert_eq!(translation(&away), (6400.0, 4800.0 - 9600.0));
    let away = away_state(TransitionKind::SlideUp, Direction::Out, rest(), stage());
    assert_eq!(translation(&away), (6400.0, 4800.0 - 9600.0));
    let away = away_state(TransitionKind::SlideRight, Direction::In, rest(), stage());
    assert_eq!(translation(&away), (6400.0 - 12800.0, 4800.0));
}

#[test]
fn zoom_and_spin_collapse_about_the_center() {
    let away = away_state(TransitionKind::Zoom, Direction::In, rest(), stage());
    assert_eq!(
        away.transform.unwrap().as_coeffs(),
        [0.0, 0.0, 0.0, 0.0, 6400.0, 4800.0]
    );

    let spun_in = away_state(TransitionKind::Spin, Direction::In, rest(), stage());
    let spun_out = away_state(TransitionKind::Spin, Direction::Out, rest(), stage());
    assert_eq!(spun_in.rotation, -TAU);
    assert_eq!(spun_out.rotation, TAU);
    assert_eq!(translation(&spun_in), (6400.0, 4800.0));
}

#[test]
fn flip_turns_the_vertical_skew() {
    let tilted = rest().with_skew(0.1, 0.2);
    let away = away_state(TransitionKind::FlipHorizontal, Direction::Out, tilted, stage());
    assert_eq!(away.skew_x, 0.1);
    assert!((away.skew_y - (0.2 + FRAC_PI_2)).abs() < 1e-12);
}

#[test]
fn cuts_and_irises_leave_the_photo_at_rest() {
    for kind in [TransitionKind::None, TransitionKind::Iris] {
        let (begin, end) = photo_states(kind, Direction::In, rest(), stage());
        assert_eq!(begin, rest());
        assert_eq!(end, rest());
    }
}

#[test]
fn iris_mask_covers_the_stage_when_open() {
    let (shape, matrix) = iris_mask(Direction::In, stage());
    let Definition::RectMorph { start, end, .. } = shape else {
        panic!("iris mask must be a morph");
    };
    assert_eq!(start.width(), IRIS_CLOSED_TWIPS);
    assert_eq!(end.width(), IRIS_UNIT_TWIPS);
    // diagonal of a 12800 x 9600 stage is 16000 twips
    assert_eq!(matrix.as_coeffs(), [8.0, 0.0, 0.0, 8.0, 6400.0, 4800.0]);

    let (shape, _) = iris_mask(Direction::Out, stage());
    let Definition::RectMorph { start, end, .. } = shape else {
        panic!("iris mask must be a morph");
    };
    assert_eq!(start.width(), IRIS_UNIT_TWIPS);
    assert_eq!(end.width(), IRIS_CLOSED_TWIPS);
}
