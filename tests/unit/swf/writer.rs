use super::*;
use crate::foundation::core::{Fps, FrameIndex, Rgb, StageSize};
use crate::swf::output::SwfOutput;
use image::{Rgba, RgbaImage};
use kurbo::{Affine, Rect};

fn movie() -> Movie {
    Movie::new(
        StageSize::default(),
        Fps::new(12.0).unwrap(),
        Rgb::new(0x10, 0x20, 0x30),
    )
}

fn header_len(movie: &Movie) -> usize {
    let mut rect = SwfOutput::new();
    write_rect(&mut rect, movie.stage().rect_twips());
    8 + rect.pos() + 4
}

/// Tag codes after the header, in order.
fn tag_codes(bytes: &[u8], mut at: usize) -> Vec<u16> {
    let mut codes = Vec::new();
    while at < bytes.len() {
        let h = u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let mut len = usize::from(h & 0x3f);
        at += 2;
        if len == 0x3f {
            len = u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
                as usize;
            at += 4;
        }
        codes.push(h >> 6);
        at += len;
    }
    codes
}

#[test]
fn header_fields() {
    let mut m = movie();
    m.ensure_frames(3);
    let out = serialize_movie(&m, &SwfWriteOpts::default(), None).unwrap();
    let bytes = out.as_bytes();
    assert_eq!(&bytes[..4], b"FWS\x06");
    assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
    let at = header_len(&m) - 4;
    assert_eq!(&bytes[at..at + 2], &[0x00, 0x0c]);
    assert_eq!(&bytes[at + 2..at + 4], &[3, 0]);
}

#[test]
fn definitions_precede_first_use_and_frames_close_with_show_frame() {
    let mut m = movie();
    let rect = m.define(Definition::SolidRect {
        color: Rgb::new(255, 0, 0),
        bounds: Rect::new(0.0, 0.0, 200.0, 200.0),
    });
    m.add_instance(FrameIndex(0), rect, 1, Some(Affine::IDENTITY), None);
    m.remove_instance(FrameIndex(1), 1);
    m.free_character(FrameIndex(1), rect);
    m.add_stop(FrameIndex(1));

    let out = serialize_movie(&m, &SwfWriteOpts::default(), None).unwrap();
    assert_eq!(
        tag_codes(out.as_bytes(), header_len(&m)),
        vec![
            code::SET_BACKGROUND_COLOR,
            code::DEFINE_SHAPE,
            code::PLACE_OBJECT2,
            code::SHOW_FRAME,
            code::REMOVE_OBJECT2,
            code::FREE_CHARACTER,
            code::DO_ACTION,
            code::SHOW_FRAME,
            code::END,
        ]
    );
}

#[test]
fn empty_movie_still_has_one_frame() {
    let m = movie();
    let out = serialize_movie(&m, &SwfWriteOpts::default(), None).unwrap();
    let bytes = out.as_bytes();
    let at = header_len(&m) - 2;
    assert_eq!(&bytes[at..at + 2], &[1, 0]);
    assert_eq!(
        tag_codes(bytes, header_len(&m)),
        vec![code::SET_BACKGROUND_COLOR, code::SHOW_FRAME, code::END]
    );
}

#[test]
fn unused_definitions_are_never_written_or_freed() {
    let mut m = movie();
    let unused = m.define(Definition::broken_image(m.stage()));
    m.free_character(FrameIndex(0), unused);
    let out = serialize_movie(&m, &SwfWriteOpts::default(), None).unwrap();
    assert_eq!(
        tag_codes(out.as_bytes(), header_len(&m)),
        vec![code::SET_BACKGROUND_COLOR, code::SHOW_FRAME, code::END]
    );
}

#[test]
fn bitmaps_need_a_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = LazyBitmapPipeline::new(dir.path(), false).unwrap();
    let lazy = pipeline
        .encode(&RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 255])), None)
        .unwrap();

    let mut m = movie();
    let bitmap = m.define(Definition::Bitmap(lazy));
    let shape = m.define(Definition::centered_bitmap_shape(bitmap, 4, 2));
    m.add_instance(FrameIndex(0), shape, 1, None, None);

    let err = serialize_movie(&m, &SwfWriteOpts::default(), None).unwrap_err();
    assert!(matches!(err, ShowError::State(_)));

    let out = serialize_movie(&m, &SwfWriteOpts::default(), Some(&mut pipeline)).unwrap();
    let records = pipeline.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 1);
    // the bitmap slot sits right after the background tag; the shape that uses it follows
    assert_eq!(records[0].insert_at, header_len(&m) + 5);
    assert_eq!(
        tag_codes(out.as_bytes(), header_len(&m)),
        vec![
            code::SET_BACKGROUND_COLOR,
            code::DEFINE_SHAPE,
            code::PLACE_OBJECT2,
            code::SHOW_FRAME,
            code::END,
        ]
    );
    pipeline.release().unwrap();
}

#[test]
fn frame_count_must_fit_the_header() {
    let mut m = movie();
    m.ensure_frames(70_000);
    let err = serialize_movie(&m, &SwfWriteOpts::default(), None).unwrap_err();
    assert!(matches!(err, ShowError::Validation(_)));
}
