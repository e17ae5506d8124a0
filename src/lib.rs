//! swfshow turns a slideshow description into a single SWF container.
//!
//! A show is a list of photos, each with a begin transition, an effect (still or pan/zoom) and an
//! end transition, plus an optional MP3 soundtrack. Generation runs in two passes:
//!
//! 1. **Build**: photos are decoded and handed to a [`LazyBitmapPipeline`], which encodes them
//!    into a scratch file right away and returns plain [`LazyBitmap`] descriptors. Transitions
//!    and effects are expanded by the tween engine into per-frame display list operations on a
//!    [`Movie`]. Soundtracks are split into frame-aligned stream blocks by [`AudioTrack`].
//! 2. **Write**: the movie is serialized without bitmap bytes, then
//!    [`LazyBitmapPipeline::assemble`] splices the encoded bitmaps back in one pass and patches
//!    the container length.
//!
//! Bitmap bytes therefore never sit in memory all at once: peak extra memory during assembly is
//! the largest single payload.
//!
//! # Getting started
//!
//! - [`ShowModel`] is the serde JSON description; [`generate`] writes it out.
//! - [`AudioTrack::write_standalone`] writes an audio-only container.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Easing curves.
pub mod animation;
/// MP3 parsing, playlists and audio tracks.
pub mod audio;
/// Bitmap decoding, encoding delegates and the lazy bitmap pipeline.
pub mod bitmap;
mod foundation;
/// Show description, configuration and generation.
pub mod show;
/// Container writer.
pub mod swf;
/// Movie timeline model.
pub mod timeline;
/// Tween engine.
pub mod tween;

pub use crate::foundation::cancel::CancelFlag;
pub use crate::foundation::core::{
    Affine, ColorTransform, DEFAULT_MAX_FRAMES, Fps, FrameIndex, MAX_STAGE_PX, Point, Rect, Rgb,
    StageSize, TWIPS_PER_PIXEL, Vec2,
};
pub use crate::foundation::error::{
    KEY_AUDIO_TOO_LONG, KEY_SHOW_TOO_LONG, ShowError, ShowResult,
};
pub use crate::foundation::math::format_duration;

pub use crate::animation::ease::Ease;
pub use crate::audio::source::{AudioLocator, LocalOpener, OpenedResource, ResourceOpener};
pub use crate::audio::track::{AudioTrack, audio_file_name};
pub use crate::bitmap::pipeline::{AssemblyStats, LazyBitmap, LazyBitmapPipeline, write_output};
pub use crate::bitmap::scratch::purge_deferred_deletes;
pub use crate::bitmap::tone::{Tone, apply_tone};
pub use crate::show::config::RunConfig;
pub use crate::show::generator::{GenerateReport, generate};
pub use crate::show::model::ShowModel;
pub use crate::swf::writer::{SwfWriteOpts, serialize_movie};
pub use crate::timeline::movie::Movie;
pub use crate::tween::engine::{scale_source_to_dest, tween};
pub use crate::tween::span::{TweenSpan, TweenState};
