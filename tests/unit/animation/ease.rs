use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in [Ease::Linear, Ease::CosineInOut] {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }
}

#[test]
fn cosine_midpoint_is_half() {
    assert!((Ease::CosineInOut.apply(0.5) - 0.5).abs() < 1e-12);
}

#[test]
fn monotonic_spot_check() {
    let mut prev = 0.0;
    for i in 1..=100 {
        let v = Ease::CosineInOut.apply(f64::from(i) / 100.0);
        assert!(v >= prev, "ease decreased at step {i}");
        prev = v;
    }
}

#[test]
fn out_of_range_input_clamps() {
    assert_eq!(Ease::CosineInOut.apply(-0.5), 0.0);
    assert_eq!(Ease::CosineInOut.apply(1.5), 1.0);
}

#[test]
fn flag_selects_curve() {
    assert_eq!(Ease::from_flag(true), Ease::CosineInOut);
    assert_eq!(Ease::from_flag(false), Ease::Linear);
}
