use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context as _;

use crate::audio::mp3::SoundStream;
use crate::audio::playlist::expand;
use crate::audio::source::{AudioLocator, LocalOpener, ResourceOpener, read_resource};
use crate::bitmap::pipeline::{AssemblyStats, write_output};
use crate::foundation::core::{Fps, FrameIndex, Rgb, StageSize};
use crate::foundation::error::{KEY_AUDIO_TOO_LONG, ShowError, ShowResult};
use crate::swf::writer::{SwfWriteOpts, serialize_movie};
use crate::timeline::movie::Movie;

/// Container version used for the side-car audio container.
pub const AUDIO_CONTAINER_VERSION: u8 = 4;

/// MP3 audio resolved from a single file or playlist, split into frame-aligned blocks.
#[derive(Clone, Debug)]
pub struct AudioTrack {
    primary: AudioLocator,
    fps: Fps,
    streams: Vec<SoundStream>,
    frame_count: u32,
}

impl AudioTrack {
    /// Load `locator` (MP3 or `.m3u`) from the local filesystem.
    pub fn load(locator: &AudioLocator, fps: Fps, max_frames: u32) -> ShowResult<Self> {
        Self::load_with(locator, fps, max_frames, &LocalOpener)
    }

    /// Load `locator` through `opener`. Any unreadable entry fails the whole track.
    #[tracing::instrument(skip(opener), fields(locator = %locator))]
    pub fn load_with(
        locator: &AudioLocator,
        fps: Fps,
        max_frames: u32,
        opener: &dyn ResourceOpener,
    ) -> ShowResult<Self> {
        let resources = expand(locator, opener)?;
        let mut streams = Vec::with_capacity(resources.len());
        for resource in &resources {
            let bytes = read_resource(opener, resource)?;
            let stream = SoundStream::from_mp3(&bytes, fps).map_err(|e| match e {
                ShowError::Format(msg) => ShowError::format(format!("{resource}: {msg}")),
                other => other,
            })?;
            tracing::debug!(
                resource = %resource,
                bytes = bytes.len(),
                frames = stream.frame_count(),
                "audio resource loaded"
            );
            streams.push(stream);
        }
        Self::from_streams(locator.clone(), streams, fps, max_frames)
    }

    /// Build a track from already split streams, enforcing the frame budget.
    pub fn from_streams(
        primary: AudioLocator,
        streams: Vec<SoundStream>,
        fps: Fps,
        max_frames: u32,
    ) -> ShowResult<Self> {
        if streams.is_empty() {
            return Err(ShowError::format(format!("'{primary}' names no audio")));
        }
        let frame_count = streams
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.frame_count()));
        if frame_count > max_frames {
            return Err(ShowError::budget_exceeded(
                KEY_AUDIO_TOO_LONG,
                frame_count,
                max_frames,
                fps,
            ));
        }
        tracing::info!(
            resources = streams.len(),
            frames = frame_count,
            "audio track ready"
        );
        Ok(Self {
            primary,
            fps,
            streams,
            frame_count,
        })
    }

    /// Locator the track was loaded from.
    pub fn primary(&self) -> &AudioLocator {
        &self.primary
    }

    /// Frame rate the blocks are aligned to.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Frames covered by the track.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frame_count)
    }

    /// Per-resource streams, in playback order.
    pub fn streams(&self) -> &[SoundStream] {
        &self.streams
    }

    /// Add the track to `movie` starting at `start`: each resource's header on its first frame,
    /// then one block per frame. Returns the frame after the last block.
    pub fn embed(&self, movie: &mut Movie, start: FrameIndex) -> FrameIndex {
        let mut frame = start;
        for stream in &self.streams {
            movie.add_sound_head(frame, stream.head.clone());
            for block in &stream.blocks {
                movie.add_sound_block(frame, block.clone());
                frame = frame.offset(1);
            }
        }
        frame
    }

    /// Audio-only movie: minimal stage, the track from frame 0, stopped on its first and last
    /// frames so a host controls playback.
    pub fn standalone_movie(&self) -> ShowResult<Movie> {
        let stage = StageSize::new(20, 20)?;
        let mut movie = Movie::new(stage, self.fps, Rgb::new(0xff, 0xff, 0xff));
        let end = self.embed(&mut movie, FrameIndex(0));
        movie.add_stop(FrameIndex(0));
        movie.add_stop(FrameIndex(end.0.saturating_sub(1)));
        Ok(movie)
    }

    /// Write the audio-only container to `path`.
    pub fn write_standalone(&self, path: &Path) -> ShowResult<AssemblyStats> {
        let movie = self.standalone_movie()?;
        let opts = SwfWriteOpts {
            version: AUDIO_CONTAINER_VERSION,
        };
        let structural = serialize_movie(&movie, &opts, None)?;
        let file =
            File::create(path).with_context(|| format!("create '{}'", path.display()))?;
        let mut out = BufWriter::new(file);
        let stats = write_output(None, structural.as_bytes(), &mut out)?;
        out.into_inner()
            .map_err(|e| anyhow::anyhow!("flush '{}': {}", path.display(), e.error()))?;
        Ok(stats)
    }
}

/// Side-car audio container name for a show written to `primary`: base name plus `-mp3.swf`.
pub fn audio_file_name(primary: &Path) -> String {
    let base = primary
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{base}-mp3.swf")
}

#[cfg(test)]
#[path = "../../tests/unit/audio/track.rs"]
mod tests;
