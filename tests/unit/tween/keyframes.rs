use super::*;

fn kf(start: f64) -> Keyframe {
    Keyframe {
        start,
        linear: false,
        easing: false,
        translate_x: 0.0,
        translate_y: 0.0,
        scale: None,
        rotation: 0.0,
    }
}

fn geometry() -> KeyframeGeometry {
    KeyframeGeometry {
        stage: StageSize::new(640, 480).unwrap(),
        photo_width: 320.0,
        photo_height: 240.0,
    }
}

fn fps12() -> Fps {
    Fps::new(12.0).unwrap()
}

#[test]
fn keyframes_deserialize_with_defaults() {
    let k: Keyframe = serde_json::from_str(r#"{"start": 0.5, "scale": 1.5}"#).unwrap();
    assert_eq!(k.start, 0.5);
    assert_eq!(k.scale, Some(1.5));
    assert!(!k.linear);
    assert_eq!(k.rotation, 0.0);
    assert!(serde_json::from_str::<Keyframe>(r#"{"start": 0, "zoom": 2}"#).is_err());
}

#[test]
fn validation_rejects_bad_keyframes() {
    assert!(validate_keyframes(&[]).is_err());
    assert!(validate_keyframes(&[kf(0.0), kf(1.0)]).is_ok());
    assert!(validate_keyframes(&[kf(1.5)]).is_err());
    assert!(validate_keyframes(&[kf(0.0), kf(0.6), kf(0.4)]).is_err());
    let mut zero = kf(0.0);
    zero.scale = Some(0.0);
    assert!(validate_keyframes(&[zero]).is_err());
    let mut nan = kf(0.0);
    nan.translate_x = f64::NAN;
    let err = validate_keyframes(&[kf(0.0), nan]).unwrap_err();
    assert!(err.to_string().contains("keyframe 1"), "{err}");
}

#[test]
fn first_keyframe_must_start_the_effect() {
    let err = validate_keyframes(&[kf(0.4), kf(1.0)]).unwrap_err();
    assert!(matches!(err, ShowError::Validation(_)));
    assert!(err.to_string().contains("keyframe 0"), "{err}");
    assert!(validate_keyframes(&[kf(0.0)]).is_ok());
}

#[test]
fn geometry_resolves_scale_and_translation() {
    let g = geometry();
    assert_eq!(g.scale_factor(None), 1.0);
    assert_eq!(g.scale_factor(Some(1.0)), 2.0);
    assert_eq!(g.scale_factor(Some(0.5)), 1.0);

    let mut right = kf(0.0);
    right.translate_x = 1.0;
    right.translate_y = -0.5;
    assert_eq!(g.translation(&right), Vec2::new(12800.0, 2400.0));

    let mut turned = kf(0.0);
    turned.rotation = 90.0;
    turned.scale = Some(1.0);
    let state = g.state(&turned);
    assert!((state.rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert_eq!(
        state.transform.unwrap().as_coeffs(),
        [2.0, 0.0, 0.0, 2.0, 6400.0, 4800.0]
    );
}

#[test]
fn segments_share_their_boundary_frames() {
    let mut mid = kf(0.5);
    mid.translate_x = 0.5;
    let mut last = kf(1.0);
    last.translate_x = 1.0;
    let plan = plan_pan_zoom(&[kf(0.0), mid, last], &geometry(), fps12(), 2.0, FrameIndex(10))
        .unwrap();

    assert_eq!(plan.spans.len(), 2);
    assert_eq!(plan.spans[0].start, FrameIndex(10));
    assert_eq!(plan.spans[0].duration, 13);
    assert_eq!(plan.spans[1].start, FrameIndex(22));
    assert_eq!(plan.spans[0].end_frame(), plan.spans[1].start);
    assert_eq!(plan.spans[0].end, plan.spans[1].begin);
    assert_eq!(plan.first, geometry().state(&kf(0.0)));
    assert!(!plan.varies_scale_or_rotation);
}

#[test]
fn inner_segments_follow_the_spline() {
    let frames: Vec<Keyframe> = [0.0, 0.25, 0.5, 0.75]
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let mut k = kf(s);
            k.translate_x = i as f64 * 0.25;
            k
        })
        .collect();
    let g = geometry();
    let plan = plan_pan_zoom(&frames, &g, fps12(), 4.0, FrameIndex(0)).unwrap();
    assert_eq!(plan.spans.len(), 3);
    assert_eq!(plan.spans[0].p1, None);
    assert_eq!(plan.spans[0].p4, Some(g.translation(&frames[2])));
    assert_eq!(plan.spans[1].p1, Some(g.translation(&frames[0])));
    assert_eq!(plan.spans[1].p4, Some(g.translation(&frames[3])));
    assert_eq!(plan.spans[2].p4, None);
}

#[test]
fn linear_and_eased_keyframes() {
    let mut a = kf(0.0);
    a.linear = true;
    let mut b = kf(0.3);
    b.easing = true;
    let plan = plan_pan_zoom(
        &[a, b, kf(0.6), kf(1.0)],
        &geometry(),
        fps12(),
        5.0,
        FrameIndex(0),
    )
    .unwrap();
    assert_eq!(plan.spans[0].p1, None);
    assert_eq!(plan.spans[0].p4, None);
    assert_eq!(plan.spans[0].ease, Ease::Linear);
    assert_eq!(plan.spans[1].ease, Ease::CosineInOut);
}

#[test]
fn zero_length_keyframes_are_dropped() {
    let mut zoomed = kf(0.0);
    zoomed.scale = Some(1.0);
    let plan = plan_pan_zoom(
        &[kf(0.0), zoomed, kf(1.0)],
        &geometry(),
        fps12(),
        1.0,
        FrameIndex(0),
    )
    .unwrap();
    assert_eq!(plan.spans.len(), 1);
    assert_eq!(plan.spans[0].duration, 13);
    assert_eq!(plan.first.transform.unwrap().as_coeffs()[0], 2.0);
    assert!(plan.varies_scale_or_rotation);
}

#[test]
fn single_keyframe_has_no_spans() {
    let plan = plan_pan_zoom(&[kf(0.0)], &geometry(), fps12(), 3.0, FrameIndex(4)).unwrap();
    assert!(plan.spans.is_empty());
    assert_eq!(plan.first, plan.last);
}
