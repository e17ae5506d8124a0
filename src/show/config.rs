use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{DEFAULT_MAX_FRAMES, Fps, StageSize};
use crate::foundation::error::{ShowError, ShowResult};
use crate::show::model::ShowModel;
use crate::swf::writer::DEFAULT_SWF_VERSION;

fn default_max_frames() -> u32 {
    DEFAULT_MAX_FRAMES
}

fn default_swf_version() -> u8 {
    DEFAULT_SWF_VERSION
}

/// Settings for one generation run. Optional fields override the show description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Frame rate override.
    #[serde(default)]
    pub fps: Option<f32>,
    /// Quality mode override.
    #[serde(default)]
    pub quality: Option<bool>,
    /// Stage size override.
    #[serde(default)]
    pub stage: Option<StageSize>,
    /// Longest show or soundtrack, in frames.
    #[serde(default = "default_max_frames")]
    pub max_frames: u32,
    /// Container version byte.
    #[serde(default = "default_swf_version")]
    pub swf_version: u8,
    /// Directory for the bitmap scratch file. Defaults to the output's directory.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fps: None,
            quality: None,
            stage: None,
            max_frames: DEFAULT_MAX_FRAMES,
            swf_version: DEFAULT_SWF_VERSION,
            scratch_dir: None,
        }
    }
}

/// Settings after applying a [`RunConfig`] to a show.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedRun {
    /// Frame rate.
    pub fps: Fps,
    /// Quality mode.
    pub quality: bool,
    /// Stage size.
    pub stage: StageSize,
    /// Frame budget.
    pub max_frames: u32,
    /// Container version byte.
    pub swf_version: u8,
}

impl RunConfig {
    /// Merge with `show`, validating the result.
    pub fn resolve(&self, show: &ShowModel) -> ShowResult<ResolvedRun> {
        let fps = Fps::new(self.fps.unwrap_or(show.fps))?;
        let stage = self.stage.unwrap_or(show.stage);
        let stage = StageSize::new(stage.width, stage.height)?;
        if self.max_frames == 0 {
            return Err(ShowError::validation("max_frames must be positive"));
        }
        if self.swf_version == 0 {
            return Err(ShowError::validation("swf_version must be positive"));
        }
        Ok(ResolvedRun {
            fps,
            quality: self.quality.unwrap_or(show.quality),
            stage,
            max_frames: self.max_frames,
            swf_version: self.swf_version,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/show/config.rs"]
mod tests;
