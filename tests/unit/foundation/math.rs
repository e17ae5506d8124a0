use super::*;

#[test]
fn catmull_rom_hits_endpoints_exactly() {
    let (p1, p2, p3, p4) = (-3.7, 1.1, 9.3, 42.0);
    assert_eq!(catmull_rom(p1, p2, p3, p4, 0.0), p2);
    assert_eq!(catmull_rom(p1, p2, p3, p4, 1.0), p3);
}

#[test]
fn catmull_rom_is_linear_for_evenly_spaced_points() {
    let v = catmull_rom(0.0, 10.0, 20.0, 30.0, 0.25);
    assert!((v - 12.5).abs() < 1e-12);
}

#[test]
fn lerp_basics() {
    assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
    assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
    assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(128, 128), 64);
}

#[test]
fn format_duration_pads_and_truncates() {
    assert_eq!(format_duration(0.0), "0:00.00");
    assert_eq!(format_duration(5.5), "0:05.50");
    assert_eq!(format_duration(61.257), "1:01.25");
    assert_eq!(format_duration(1333.3333), "22:13.33");
    assert_eq!(format_duration(3600.0), "60:00.00");
}
