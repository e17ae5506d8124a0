use super::*;

#[test]
fn fps_quantizes_to_fixed_point() {
    let fps = Fps::new(12.0).unwrap();
    assert_eq!(fps.to_fixed_8_8(), 12 * 256);
    assert_eq!(fps.as_f64(), 12.0);

    // 29.97 is not representable; the fractional byte truncates.
    let ntsc = Fps::new(29.97).unwrap();
    assert_eq!(ntsc.to_fixed_8_8(), 7672);
    assert!((ntsc.as_f64() - 29.96875).abs() < 1e-12);
}

#[test]
fn fps_rejects_out_of_range_rates() {
    assert!(Fps::new(0.0).is_err());
    assert!(Fps::new(-1.0).is_err());
    assert!(Fps::new(f32::NAN).is_err());
    assert!(Fps::new(256.0).is_err());
    assert!(Fps::from_fixed_8_8(0).is_err());
}

#[test]
fn secs_to_frames_truncates() {
    let fps = Fps::new(12.0).unwrap();
    assert_eq!(fps.secs_to_frames(2.0), 24);
    assert_eq!(fps.secs_to_frames(2.09), 25);
    assert_eq!(fps.secs_to_frames(-3.0), 0);
    assert_eq!(fps.frames_to_secs(30), 2.5);
}

#[test]
fn stage_geometry_is_in_twips() {
    let stage = StageSize::new(320, 240).unwrap();
    assert_eq!(stage.rect_twips(), Rect::new(0.0, 0.0, 6400.0, 4800.0));
    assert_eq!(stage.center_twips(), Point::new(3200.0, 2400.0));
    assert!(StageSize::new(0, 10).is_err());
}

#[test]
fn color_transform_interpolates_componentwise() {
    let from = ColorTransform::alpha(0.0);
    let to = ColorTransform::IDENTITY;
    let mid = from.interpolate(&to, 0.25);
    assert_eq!(mid.mult, [1.0, 1.0, 1.0, 0.25]);
    assert!(!mid.has_add());
    assert!(mid.has_mult());
    assert!(!ColorTransform::IDENTITY.has_mult());
}

#[test]
fn frame_index_offset_saturates() {
    assert_eq!(FrameIndex(3).offset(4), FrameIndex(7));
    assert_eq!(FrameIndex(u32::MAX - 1).offset(9), FrameIndex(u32::MAX));
}
