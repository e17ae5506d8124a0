use super::*;

#[test]
fn gray_keeps_alpha_and_flattens_channels() {
    let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
    img.put_pixel(1, 0, Rgba([0, 0, 0, 40]));
    let out = apply_tone(img, Tone::Gray);
    assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(out.get_pixel(1, 0).0, [0, 0, 0, 40]);
}

#[test]
fn sepia_maps_through_the_ramp() {
    let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
    img.put_pixel(1, 0, Rgba([255, 255, 255, 128]));
    let out = apply_tone(img, Tone::Sepia);
    assert_eq!(out.get_pixel(0, 0).0, [0x20, 0x02, 0x02, 255]);
    assert_eq!(out.get_pixel(1, 0).0, [0xff, 0xff, 0xff, 128]);
    // mid grays are warm: red leads blue
    let [r, _, b] = sepia(128);
    assert!(r > b);
}

#[test]
fn tones_parse_from_snake_case() {
    assert_eq!(serde_json::from_str::<Tone>(r#""gray""#).unwrap(), Tone::Gray);
    assert_eq!(Tone::default(), Tone::Sepia);
}
