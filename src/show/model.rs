use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audio::source::{AudioLocator, uri_scheme};
use crate::bitmap::tone::Tone;
use crate::foundation::core::{Fps, Rgb, StageSize};
use crate::foundation::error::{ShowError, ShowResult};
use crate::tween::keyframes::{Keyframe, validate_keyframes};

fn default_fps() -> f32 {
    12.0
}

/// A slideshow: photos with transitions and effects, plus optional audio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowModel {
    /// Stage size in pixels.
    #[serde(default)]
    pub stage: StageSize,
    /// Stage background.
    #[serde(default)]
    pub background: Rgb,
    /// Frames per second.
    #[serde(default = "default_fps")]
    pub fps: f32,
    /// Encode lossless sources losslessly and rasterize rotating or zooming pan/zoom effects.
    #[serde(default)]
    pub quality: bool,
    /// Photos in display order.
    pub photos: Vec<PhotoSlide>,
    /// Soundtrack.
    #[serde(default)]
    pub audio: Option<AudioSpec>,
    /// What the player does after the last frame.
    #[serde(default)]
    pub end: EndMode,
}

/// One photo and its timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhotoSlide {
    /// Image file.
    pub path: PathBuf,
    /// Transition bringing the photo on stage.
    #[serde(default)]
    pub begin: TransitionSpec,
    /// What happens while the photo is fully on stage.
    #[serde(default)]
    pub effect: EffectSpec,
    /// Transition taking the photo off stage.
    #[serde(default)]
    pub end: TransitionSpec,
}

/// Transition styles. Begin transitions bring a photo in; end transitions play the mirror image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Cut.
    #[default]
    None,
    /// Alpha fade.
    Fade,
    /// Fade through black.
    FadeBlack,
    /// Fade through white.
    FadeWhite,
    /// Grow from (or shrink to) the photo center.
    Zoom,
    /// Move in or out travelling left.
    SlideLeft,
    /// Move in or out travelling right.
    SlideRight,
    /// Move in or out travelling up.
    SlideUp,
    /// Move in or out travelling down.
    SlideDown,
    /// Zoom while turning a full revolution.
    Spin,
    /// Swing open around the vertical axis.
    FlipHorizontal,
    /// Reveal (or hide) through a growing rectangular mask.
    Iris,
}

/// A transition and its length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionSpec {
    /// Style.
    #[serde(default)]
    pub kind: TransitionKind,
    /// Length in seconds.
    #[serde(default)]
    pub duration: f64,
}

/// Effect styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// The photo holds still.
    #[default]
    None,
    /// The photo moves through `keyframes`.
    PanZoom,
    /// The photo holds still, toned with `tone`.
    Tone,
}

/// Effect shown between the begin and end transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectSpec {
    /// Style.
    #[serde(default)]
    pub kind: EffectKind,
    /// Length in seconds.
    #[serde(default = "default_effect_secs")]
    pub duration: f64,
    /// Pan/zoom keyframes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<Keyframe>,
    /// Toning for [`EffectKind::Tone`].
    #[serde(default)]
    pub tone: Tone,
}

fn default_effect_secs() -> f64 {
    3.0
}

impl EffectSpec {
    /// Toning to apply to the photo pixels, if any.
    pub fn photo_tone(&self) -> Option<Tone> {
        (self.kind == EffectKind::Tone).then_some(self.tone)
    }
}

impl Default for EffectSpec {
    fn default() -> Self {
        Self {
            kind: EffectKind::None,
            duration: default_effect_secs(),
            keyframes: Vec::new(),
            tone: Tone::default(),
        }
    }
}

/// Where the soundtrack goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioMode {
    /// Streamed inside the show container.
    #[default]
    Internal,
    /// Written to a side-car container next to the show.
    External,
    /// Ignored.
    None,
}

/// Soundtrack: an MP3 file, an `.m3u` playlist or a URI to either.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioSpec {
    /// Path or URI.
    pub source: String,
    /// Placement.
    #[serde(default)]
    pub mode: AudioMode,
}

impl AudioSpec {
    /// Locator for `source`; relative paths resolve against `base`.
    pub fn locator(&self, base: &Path) -> AudioLocator {
        if uri_scheme(&self.source).is_some() {
            return AudioLocator::Uri(self.source.clone());
        }
        let path = Path::new(&self.source);
        if path.is_absolute() {
            AudioLocator::File(path.to_path_buf())
        } else {
            AudioLocator::File(base.join(path))
        }
    }
}

/// Behavior after the last frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndMode {
    /// Start over.
    #[default]
    Loop,
    /// Hold the last frame.
    Stop,
}

fn check_secs(what: &str, index: usize, secs: f64) -> ShowResult<()> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ShowError::validation(format!(
            "photo {index}: {what} duration must be a non-negative number of seconds"
        )));
    }
    Ok(())
}

impl ShowModel {
    /// Parse a show description from JSON.
    pub fn from_json(text: &str) -> ShowResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ShowError::validation(format!("parse show description: {e}")))
    }

    /// Validated frame rate.
    pub fn frame_rate(&self) -> ShowResult<Fps> {
        Fps::new(self.fps)
    }

    /// Validated stage size.
    pub fn stage_size(&self) -> ShowResult<StageSize> {
        StageSize::new(self.stage.width, self.stage.height)
    }

    /// Check sizes, durations and keyframe ordering.
    pub fn validate(&self) -> ShowResult<()> {
        self.stage_size()?;
        self.frame_rate()?;
        if self.photos.is_empty() {
            return Err(ShowError::validation("show has no photos"));
        }
        for (i, photo) in self.photos.iter().enumerate() {
            check_secs("begin transition", i, photo.begin.duration)?;
            check_secs("effect", i, photo.effect.duration)?;
            check_secs("end transition", i, photo.end.duration)?;
            if photo.effect.kind == EffectKind::PanZoom {
                validate_keyframes(&photo.effect.keyframes).map_err(|e| match e {
                    ShowError::Validation(msg) => {
                        ShowError::validation(format!("photo {i}: {msg}"))
                    }
                    other => other,
                })?;
            }
        }
        if let Some(audio) = &self.audio
            && audio.source.trim().is_empty()
        {
            return Err(ShowError::validation("audio source is empty"));
        }
        Ok(())
    }

    /// Resolve relative photo and audio paths against `base`, normally the description's
    /// directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        for photo in &mut self.photos {
            if photo.path.is_relative() {
                photo.path = base.join(&photo.path);
            }
        }
        if let Some(audio) = &mut self.audio
            && let AudioLocator::File(path) = audio.locator(base)
        {
            audio.source = path.to_string_lossy().into_owned();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/show/model.rs"]
mod tests;
