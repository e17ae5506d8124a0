use super::*;
use image::{Rgba, RgbaImage};

use crate::foundation::core::{Rgb, StageSize};
use crate::bitmap::tone::Tone;
use crate::show::model::{EffectKind, EffectSpec, TransitionSpec};
use crate::timeline::movie::FrameItem;

fn fps12() -> Fps {
    Fps::new(12.0).unwrap()
}

fn slide(path: &Path, begin: TransitionSpec, effect_secs: f64, end: TransitionSpec) -> PhotoSlide {
    PhotoSlide {
        path: path.to_path_buf(),
        begin,
        effect: EffectSpec {
            duration: effect_secs,
            ..EffectSpec::default()
        },
        end,
    }
}

fn transition(kind: TransitionKind, duration: f64) -> TransitionSpec {
    TransitionSpec { kind, duration }
}

fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(w, h, Rgba([30, 60, 90, 255]))
        .save(&path)
        .unwrap();
    path
}

fn show_of(photos: Vec<PhotoSlide>) -> ShowModel {
    ShowModel {
        stage: StageSize::new(64, 48).unwrap(),
        background: Rgb::default(),
        fps: 12.0,
        quality: false,
        photos,
        audio: None,
        end: EndMode::Loop,
    }
}

fn run() -> ResolvedRun {
    ResolvedRun {
        fps: fps12(),
        quality: false,
        stage: StageSize::new(64, 48).unwrap(),
        max_frames: 1000,
        swf_version: 6,
    }
}

fn items_at(movie: &Movie, frame: usize) -> &[FrameItem] {
    movie.frames()[frame].items()
}

#[test]
fn timing_rounds_down_and_keeps_one_frame() {
    let dir = Path::new("/nowhere");
    let t = PhotoTiming::of(
        &slide(
            &dir.join("a.png"),
            transition(TransitionKind::Fade, 0.5),
            3.0,
            transition(TransitionKind::Zoom, 1.04),
        ),
        fps12(),
    );
    assert_eq!(t, PhotoTiming { begin: 6, effect: 36, end: 12 });
    assert_eq!(t.total(), 54);

    let zero = PhotoTiming::of(
        &slide(&dir.join("a.png"), TransitionSpec::default(), 0.0, TransitionSpec::default()),
        fps12(),
    );
    assert_eq!(zero.total(), 1);

    let show = show_of(vec![
        slide(&dir.join("a.png"), TransitionSpec::default(), 1.0, TransitionSpec::default()),
        slide(&dir.join("b.png"), TransitionSpec::default(), 2.0, TransitionSpec::default()),
    ]);
    assert_eq!(planned_frames(&show, fps12()), 36);
}

#[test]
fn photo_layout_follows_its_phases() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "a.png", 32, 24);
    let mut pipeline = LazyBitmapPipeline::new(dir.path(), false).unwrap();
    let mut movie = Movie::new(run().stage, run().fps, Rgb::default());
    let photo = slide(
        &png,
        transition(TransitionKind::Fade, 0.25),
        0.5,
        transition(TransitionKind::SlideLeft, 0.25),
    );

    let placed = place_photo(
        &mut movie,
        &mut pipeline,
        &run(),
        &photo,
        0,
        FrameIndex(0),
        false,
        None,
    )
    .unwrap();
    assert_eq!(placed.next, FrameIndex(12));
    assert!(!placed.broken);
    assert!(!placed.rasterized);

    // begin: add at depth 2 on frame 0, settle on frame 3
    assert!(matches!(&items_at(&movie, 0)[0], FrameItem::Place(p) if !p.is_move && p.depth == 2));
    assert!(matches!(
        &items_at(&movie, 3)[0],
        FrameItem::Place(p) if p.color == Some(crate::ColorTransform::IDENTITY)
    ));
    // effect holds still, end slide starts on frame 9
    for frame in 4..9 {
        assert!(items_at(&movie, frame).is_empty(), "frame {frame}");
    }
    assert!(matches!(&items_at(&movie, 9)[0], FrameItem::Place(p) if p.is_move));
    // leaves the stage on frame 12
    let leaving = items_at(&movie, 12);
    assert_eq!(leaving[0], FrameItem::Remove { depth: 2 });
    assert_eq!(
        leaving.iter().filter(|i| matches!(i, FrameItem::Free(_))).count(),
        2
    );
}

#[test]
fn iris_masks_sit_below_the_photo_and_are_removed() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = LazyBitmapPipeline::new(dir.path(), false).unwrap();
    let mut movie = Movie::new(run().stage, run().fps, Rgb::default());
    let photo = slide(
        &dir.path().join("missing.png"),
        transition(TransitionKind::Iris, 0.5),
        1.0,
        transition(TransitionKind::Iris, 0.5),
    );

    let placed = place_photo(
        &mut movie,
        &mut pipeline,
        &run(),
        &photo,
        1,
        FrameIndex(0),
        false,
        None,
    )
    .unwrap();
    assert!(placed.broken);
    assert_eq!(placed.next, FrameIndex(24));

    let mask_in = &items_at(&movie, 0)[0];
    assert!(matches!(
        mask_in,
        FrameItem::Place(p) if p.depth == 3 && p.clip_depth == Some(4) && p.ratio == Some(0)
    ));
    assert!(matches!(&items_at(&movie, 5)[0], FrameItem::Place(p) if p.ratio == Some(65535)));
    assert!(items_at(&movie, 6).contains(&FrameItem::Remove { depth: 3 }));

    assert!(matches!(
        &items_at(&movie, 18)[0],
        FrameItem::Place(p) if p.depth == 3 && !p.is_move && p.clip_depth == Some(4)
    ));
    let leaving = items_at(&movie, 24);
    assert_eq!(leaving[0], FrameItem::Remove { depth: 3 });
    assert_eq!(leaving[1], FrameItem::Remove { depth: 4 });
    assert_eq!(pipeline.encoded_count(), 0);
}

#[test]
fn last_photo_stays_on_stage() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = LazyBitmapPipeline::new(dir.path(), false).unwrap();
    let mut movie = Movie::new(run().stage, run().fps, Rgb::default());
    let photo = slide(
        &dir.path().join("missing.png"),
        TransitionSpec::default(),
        1.0,
        TransitionSpec::default(),
    );
    let placed = place_photo(
        &mut movie,
        &mut pipeline,
        &run(),
        &photo,
        0,
        FrameIndex(0),
        true,
        None,
    )
    .unwrap();
    assert_eq!(placed.next, FrameIndex(12));
    assert_eq!(movie.frame_count(), 12);
    assert!(
        movie
            .frames()
            .iter()
            .flat_map(|f| f.items())
            .all(|i| !matches!(i, FrameItem::Remove { .. } | FrameItem::Free(_)))
    );
}

#[test]
fn generate_writes_a_complete_container() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_png(dir.path(), "a.png", 32, 24);
    let b = write_png(dir.path(), "b.png", 128, 96);
    let out = dir.path().join("show.swf");
    let show = show_of(vec![
        slide(
            &a,
            transition(TransitionKind::Fade, 0.5),
            1.0,
            transition(TransitionKind::SlideUp, 0.5),
        ),
        slide(&b, transition(TransitionKind::Spin, 0.5), 1.0, TransitionSpec::default()),
    ]);

    let report = generate(&show, &out, &RunConfig::default(), None).unwrap();
    assert_eq!(report.frames, 42);
    assert_eq!(report.bitmaps, 2);
    assert_eq!(report.broken_photos, 0);
    assert!(report.audio_sidecar.is_none());

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..3], b"FWS");
    let declared = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    assert_eq!(declared as usize, bytes.len());
    assert_eq!(report.bytes_written, bytes.len() as u64);
}

#[test]
fn broken_photos_still_produce_a_show() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("show.swf");
    let mut show = show_of(vec![slide(
        &dir.path().join("gone.jpg"),
        TransitionSpec::default(),
        1.0,
        TransitionSpec::default(),
    )]);
    show.end = EndMode::Stop;

    let report = generate(&show, &out, &RunConfig::default(), None).unwrap();
    assert_eq!(report.broken_photos, 1);
    assert_eq!(report.bitmaps, 0);
    let bytes = std::fs::read(&out).unwrap();
    let stop = [0x02, 0x03, 0x07, 0x00];
    assert!(bytes.windows(4).any(|w| w == stop));
}

#[test]
fn over_budget_shows_fail_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("show.swf");
    let show = show_of(vec![slide(
        &dir.path().join("a.png"),
        TransitionSpec::default(),
        10.0,
        TransitionSpec::default(),
    )]);
    let config = RunConfig {
        max_frames: 100,
        ..RunConfig::default()
    };
    let err = generate(&show, &out, &config, None).unwrap_err();
    assert_eq!(err.message_key(), KEY_SHOW_TOO_LONG);
    assert_eq!(err.message_args(), vec!["0:10.00", "0:08.33"]);
    assert!(!out.exists());
}

#[test]
fn cancelled_generation_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_png(dir.path(), "a.png", 16, 16);
    let out = dir.path().join("show.swf");
    let show = show_of(vec![slide(&a, TransitionSpec::default(), 1.0, TransitionSpec::default())]);
    let cancel = CancelFlag::new();
    cancel.cancel();

    let err = generate(&show, &out, &RunConfig::default(), Some(&cancel)).unwrap_err();
    assert!(matches!(err, ShowError::Cancelled));
    assert!(!out.exists());
}

#[test]
fn failed_run_keeps_an_earlier_render() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_png(dir.path(), "a.png", 16, 16);
    let out = dir.path().join("show.swf");
    std::fs::write(&out, b"previous render").unwrap();
    let show = show_of(vec![slide(&a, TransitionSpec::default(), 1.0, TransitionSpec::default())]);
    let cancel = CancelFlag::new();
    cancel.cancel();

    let err = generate(&show, &out, &RunConfig::default(), Some(&cancel)).unwrap_err();
    assert!(matches!(err, ShowError::Cancelled));
    assert_eq!(std::fs::read(&out).unwrap(), b"previous render");
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 2, "{names:?}");
}

#[test]
fn successful_run_replaces_an_earlier_render() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_png(dir.path(), "a.png", 16, 16);
    let out = dir.path().join("show.swf");
    std::fs::write(&out, b"previous render").unwrap();
    let show = show_of(vec![slide(&a, TransitionSpec::default(), 1.0, TransitionSpec::default())]);

    let report = generate(&show, &out, &RunConfig::default(), None).unwrap();
    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..3], b"FWS");
    assert_eq!(bytes.len() as u64, report.bytes_written);
}

#[test]
fn toned_photos_are_encoded_toned() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_png(dir.path(), "a.png", 16, 16);
    let mut photo = slide(&a, TransitionSpec::default(), 1.0, TransitionSpec::default());
    photo.effect.kind = EffectKind::Tone;
    photo.effect.tone = Tone::Gray;

    let r = run();
    let mut movie = Movie::new(r.stage, r.fps, Rgb::default());
    let mut pipeline = LazyBitmapPipeline::new(dir.path(), false).unwrap();
    let defs = define_photo(&mut movie, &mut pipeline, &photo, 0).unwrap();
    let [red, green, blue, alpha] = defs.pixels.unwrap().image.get_pixel(3, 3).0;
    assert_eq!((red, red), (green, blue));
    assert_eq!(alpha, 255);
    assert!(red > 30 && red < 90);
    assert_eq!(pipeline.encoded_count(), 1);

    // a still effect leaves the pixels alone
    photo.effect.kind = EffectKind::None;
    let defs = define_photo(&mut movie, &mut pipeline, &photo, 1).unwrap();
    assert_eq!(defs.pixels.unwrap().image.get_pixel(3, 3).0, [30, 60, 90, 255]);
    pipeline.release().unwrap();
}
