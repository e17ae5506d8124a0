use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::audio::track::{AudioTrack, audio_file_name};
use crate::bitmap::decode::{fit_within, load_image};
use crate::bitmap::pipeline::{LazyBitmapPipeline, write_output};
use crate::bitmap::tone::apply_tone;
use crate::foundation::cancel::{CancelFlag, check_cancel};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{KEY_SHOW_TOO_LONG, ShowError, ShowResult};
use crate::show::config::{ResolvedRun, RunConfig};
use crate::show::effects::{EffectPhoto, plan_effect, run_effect};
use crate::show::model::{AudioMode, EndMode, PhotoSlide, ShowModel, TransitionKind};
use crate::show::transitions::{Direction, iris_mask, photo_states};
use crate::swf::writer::{SwfWriteOpts, serialize_movie};
use crate::timeline::movie::{DefId, Movie};
use crate::timeline::shape::Definition;
use crate::tween::builder::{Placement, TweenBuilder, TweenCtx};
use crate::tween::engine::tween;
use crate::tween::keyframes::KeyframeGeometry;
use crate::tween::span::{TweenSpan, TweenState};

/// Summary of a finished generation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Frames in the show container.
    pub frames: u32,
    /// Bytes written to the show container.
    pub bytes_written: u64,
    /// Bitmap tags written.
    pub bitmaps: usize,
    /// Photos replaced by the broken-image shape.
    pub broken_photos: usize,
    /// Photos whose effect was rasterized frame by frame.
    pub rasterized_effects: usize,
    /// Side-car audio container, when audio is external.
    pub audio_sidecar: Option<PathBuf>,
}

/// Frame counts of one photo's phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PhotoTiming {
    begin: u32,
    effect: u32,
    end: u32,
}

impl PhotoTiming {
    fn of(photo: &PhotoSlide, fps: Fps) -> Self {
        let begin = fps.secs_to_frames(photo.begin.duration);
        let effect = fps.secs_to_frames(photo.effect.duration);
        let end = fps.secs_to_frames(photo.end.duration);
        // a photo is on stage for at least one frame
        let effect = if begin == 0 && effect == 0 && end == 0 {
            1
        } else {
            effect
        };
        Self { begin, effect, end }
    }

    fn total(&self) -> u32 {
        self.begin
            .saturating_add(self.effect)
            .saturating_add(self.end)
    }
}

/// Frames the photos of `show` occupy at `fps`.
pub fn planned_frames(show: &ShowModel, fps: Fps) -> u32 {
    show.photos
        .iter()
        .fold(0u32, |acc, p| acc.saturating_add(PhotoTiming::of(p, fps).total()))
}

/// Generate `show` into the container at `out_path`.
///
/// Photo paths are used as given; see [`ShowModel::resolve_paths`]. The scratch store is always
/// released. The container is staged next to `out_path` and only moved into place once complete,
/// so a failed or cancelled run leaves any existing file at `out_path` untouched.
#[tracing::instrument(skip(show, config, cancel), fields(out = %out_path.display()))]
pub fn generate(
    show: &ShowModel,
    out_path: &Path,
    config: &RunConfig,
    cancel: Option<&CancelFlag>,
) -> ShowResult<GenerateReport> {
    show.validate()?;
    let run = config.resolve(show)?;

    let planned = planned_frames(show, run.fps);
    if planned > run.max_frames {
        return Err(ShowError::budget_exceeded(
            KEY_SHOW_TOO_LONG,
            planned,
            run.max_frames,
            run.fps,
        ));
    }

    let audio = match &show.audio {
        Some(spec) if spec.mode != AudioMode::None => {
            let track = AudioTrack::load(&spec.locator(Path::new("")), run.fps, run.max_frames)?;
            Some((track, spec.mode))
        }
        _ => None,
    };

    let out_dir = out_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let scratch_dir = config.scratch_dir.as_deref().unwrap_or(out_dir);
    let mut pipeline = LazyBitmapPipeline::new(scratch_dir, run.quality)?;

    tracing::info!(
        photos = show.photos.len(),
        frames = planned,
        fps = run.fps.as_f64(),
        quality = run.quality,
        "generating show"
    );

    let target = OutputTarget {
        path: out_path,
        dir: out_dir,
    };
    let result = build_and_write(show, &run, &target, &mut pipeline, audio.as_ref(), cancel);
    if let Err(e) = pipeline.release() {
        tracing::warn!(error = %e, "scratch release failed");
    }
    let mut report = result?;

    if let Some((track, AudioMode::External)) = &audio {
        let sidecar = out_dir.join(audio_file_name(out_path));
        track.write_standalone(&sidecar)?;
        tracing::info!(path = %sidecar.display(), "wrote side-car audio");
        report.audio_sidecar = Some(sidecar);
    }
    Ok(report)
}

/// Final container path and the directory its staging file lives in.
struct OutputTarget<'a> {
    path: &'a Path,
    dir: &'a Path,
}

fn build_and_write(
    show: &ShowModel,
    run: &ResolvedRun,
    target: &OutputTarget<'_>,
    pipeline: &mut LazyBitmapPipeline,
    audio: Option<&(AudioTrack, AudioMode)>,
    cancel: Option<&CancelFlag>,
) -> ShowResult<GenerateReport> {
    let mut movie = Movie::new(run.stage, run.fps, show.background);
    let mut report = GenerateReport::default();

    let mut frame = FrameIndex(0);
    for (index, photo) in show.photos.iter().enumerate() {
        check_cancel(cancel)?;
        let last = index + 1 == show.photos.len();
        let placed = place_photo(&mut movie, pipeline, run, photo, index, frame, last, cancel)?;
        report.broken_photos += usize::from(placed.broken);
        report.rasterized_effects += usize::from(placed.rasterized);
        frame = placed.next;
    }

    if let Some((track, AudioMode::Internal)) = audio {
        track.embed(&mut movie, FrameIndex(0));
    }

    let frames = movie.frame_count();
    if frames > run.max_frames {
        return Err(ShowError::budget_exceeded(
            KEY_SHOW_TOO_LONG,
            frames,
            run.max_frames,
            run.fps,
        ));
    }
    if show.end == EndMode::Stop && frames > 0 {
        movie.add_stop(FrameIndex(frames - 1));
    }

    let opts = SwfWriteOpts {
        version: run.swf_version,
    };
    let structural = serialize_movie(&movie, &opts, Some(&mut *pipeline))?;
    check_cancel(cancel)?;

    // dropped, and so deleted, unless persisted below
    let staging = tempfile::Builder::new()
        .prefix(".swfshow-")
        .suffix(".part")
        .tempfile_in(target.dir)
        .with_context(|| format!("create staging file in '{}'", target.dir.display()))?;
    let mut out = BufWriter::new(staging);
    let stats = write_output(Some(pipeline), structural.as_bytes(), &mut out)?;
    let staging = out
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush '{}': {}", target.path.display(), e.error()))?;
    staging
        .persist(target.path)
        .with_context(|| format!("move output into '{}'", target.path.display()))?;

    report.frames = frames.max(1);
    report.bytes_written = stats.bytes_written;
    report.bitmaps = stats.bitmaps;
    tracing::info!(
        frames = report.frames,
        bytes = report.bytes_written,
        bitmaps = report.bitmaps,
        broken = report.broken_photos,
        "show written"
    );
    Ok(report)
}

struct PlacedPhoto {
    next: FrameIndex,
    broken: bool,
    rasterized: bool,
}

/// Photo definitions and the pixels behind them.
struct PhotoDefs {
    shape: DefId,
    bitmap: Option<DefId>,
    width: f64,
    height: f64,
    pixels: Option<EffectPhoto>,
}

fn define_photo(
    movie: &mut Movie,
    pipeline: &mut LazyBitmapPipeline,
    photo: &PhotoSlide,
    index: usize,
) -> ShowResult<PhotoDefs> {
    let stage = movie.stage();
    let decoded = match load_image(&photo.path) {
        Ok(decoded) => decoded,
        Err(e @ (ShowError::Format(_) | ShowError::Resource(_) | ShowError::Other(_))) => {
            tracing::warn!(
                photo = index,
                path = %photo.path.display(),
                error = %e,
                "photo unavailable, using placeholder"
            );
            let shape = movie.define(Definition::broken_image(stage));
            return Ok(PhotoDefs {
                shape,
                bitmap: None,
                width: f64::from(stage.width),
                height: f64::from(stage.height),
                pixels: None,
            });
        }
        Err(e) => return Err(e),
    };

    let format = decoded.format;
    let mut image = fit_within(decoded.image, stage.width, stage.height);
    if let Some(tone) = photo.effect.photo_tone() {
        image = apply_tone(image, tone);
    }
    let lazy = pipeline.encode(&image, format)?;
    tracing::debug!(
        photo = index,
        width = lazy.width(),
        height = lazy.height(),
        "photo encoded"
    );
    let bitmap = movie.define(Definition::Bitmap(lazy));
    let shape = movie.define(Definition::centered_bitmap_shape(
        bitmap,
        lazy.width(),
        lazy.height(),
    ));
    Ok(PhotoDefs {
        shape,
        bitmap: Some(bitmap),
        width: f64::from(lazy.width()),
        height: f64::from(lazy.height()),
        pixels: Some(EffectPhoto { image, format }),
    })
}

#[allow(clippy::too_many_arguments)]
fn place_photo(
    movie: &mut Movie,
    pipeline: &mut LazyBitmapPipeline,
    run: &ResolvedRun,
    photo: &PhotoSlide,
    index: usize,
    start: FrameIndex,
    last: bool,
    cancel: Option<&CancelFlag>,
) -> ShowResult<PlacedPhoto> {
    let stage = run.stage;
    let timing = PhotoTiming::of(photo, run.fps);
    let mask_depth = 1 + (index % 2) as u16 * 2;
    let depth = mask_depth + 1;

    let defs = define_photo(movie, pipeline, photo, index)?;
    let geometry = KeyframeGeometry {
        stage,
        photo_width: defs.width,
        photo_height: defs.height,
    };
    let effect_start = start.offset(timing.begin);
    let plan = plan_effect(
        &photo.effect,
        &geometry,
        run.fps,
        effect_start,
        run.quality,
        defs.pixels.is_some(),
    )?;

    let mut ctx = TweenCtx {
        movie,
        pipeline: Some(pipeline),
        cancel,
    };

    // begin transition, ending on the effect's first frame
    if photo.begin.kind == TransitionKind::Iris && timing.begin > 0 {
        let mask = play_iris(&mut ctx, Direction::In, start, timing.begin, mask_depth, depth)?;
        ctx.movie.remove_instance(effect_start, mask_depth);
        ctx.movie.free_character(effect_start, mask);
    }
    let (begin, end) = photo_states(photo.begin.kind, Direction::In, plan.rest_in, stage);
    let duration = if timing.begin > 0 { timing.begin + 1 } else { 0 };
    let mut builder = TweenBuilder::place(defs.shape, depth, Placement::Add);
    tween(
        &mut builder,
        &mut ctx,
        &TweenSpan::new(start, duration, begin, end),
    )?;

    let anchor = match ctx.movie.last_instance_at(effect_start, depth) {
        Some(handle) => handle,
        None => ctx
            .movie
            .move_instance(effect_start, depth, plan.rest_in.composed(), None),
    };
    let live = run_effect(&plan, &mut ctx, anchor, depth, defs.pixels)?;

    let end_start = effect_start.offset(timing.effect);
    let mut end_mask = None;
    if timing.end > 0 {
        if photo.end.kind == TransitionKind::Iris {
            end_mask = Some(play_iris(
                &mut ctx,
                Direction::Out,
                end_start,
                timing.end,
                mask_depth,
                depth,
            )?);
        }
        let (begin, end) = photo_states(photo.end.kind, Direction::Out, plan.rest_out, stage);
        let mut builder = TweenBuilder::place(defs.shape, depth, Placement::Modify);
        tween(
            &mut builder,
            &mut ctx,
            &TweenSpan::new(end_start, timing.end, begin, end),
        )?;
    }

    let next = end_start.offset(timing.end);
    let movie = ctx.movie;
    movie.ensure_frames(next.0);
    if !last {
        if end_mask.is_some() {
            movie.remove_instance(next, mask_depth);
        }
        movie.remove_instance(next, depth);
        let mut released = vec![defs.shape];
        released.extend(defs.bitmap);
        released.extend(end_mask);
        if let Some((shape, bitmap)) = live {
            released.extend([shape, bitmap]);
        }
        for def in released {
            movie.free_character(next, def);
        }
    }

    tracing::debug!(
        photo = index,
        start = start.0,
        frames = timing.total(),
        rasterized = plan.rasterize,
        "photo placed"
    );
    Ok(PlacedPhoto {
        next,
        broken: defs.bitmap.is_none(),
        rasterized: plan.rasterize,
    })
}

/// Mask the photo at `photo_depth` with an iris morph over `frames` frames. Returns the mask
/// definition; the caller removes the mask.
fn play_iris(
    ctx: &mut TweenCtx<'_>,
    direction: Direction,
    start: FrameIndex,
    frames: u32,
    mask_depth: u16,
    photo_depth: u16,
) -> ShowResult<DefId> {
    let (shape, matrix) = iris_mask(direction, ctx.movie.stage());
    let mask = ctx.movie.define(shape);
    let state = TweenState::at(matrix);
    let mut builder = TweenBuilder::mask(mask, mask_depth, photo_depth, Placement::Add);
    tween(
        &mut builder,
        ctx,
        &TweenSpan::new(start, frames, state, state),
    )?;
    Ok(mask)
}

#[cfg(test)]
#[path = "../../tests/unit/show/generator.rs"]
mod tests;
