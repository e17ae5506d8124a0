use crate::foundation::core::Fps;
use crate::foundation::math::format_duration;

/// Crate-wide result alias.
pub type ShowResult<T> = Result<T, ShowError>;

/// Message key reported when an audio track does not fit in the frame budget.
pub const KEY_AUDIO_TOO_LONG: &str = "error.audio-too-long";
/// Message key reported when the generated show does not fit in the frame budget.
pub const KEY_SHOW_TOO_LONG: &str = "error.show-too-long";

/// Errors produced while generating a show container.
#[derive(thiserror::Error, Debug)]
pub enum ShowError {
    /// An input file or URI could not be opened or read.
    #[error("resource error: {0}")]
    Resource(String),

    /// Input bytes were not in the expected format (MP3 frames, playlist entries, images).
    #[error("format error: {0}")]
    Format(String),

    /// A frame budget was exceeded. `actual` and `limit` are pre-formatted as `m:ss.hh`.
    #[error("frame budget exceeded ({key}): {actual} is longer than {limit}")]
    BudgetExceeded {
        /// Message key identifying which budget was exceeded.
        key: &'static str,
        /// Requested duration, formatted.
        actual: String,
        /// Maximum duration, formatted.
        limit: String,
    },

    /// A bitmap could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// An operation was invoked in the wrong lifecycle state.
    #[error("state error: {0}")]
    State(String),

    /// Show description or run configuration is invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// Generation was cancelled through a [`crate::CancelFlag`].
    #[error("generation cancelled")]
    Cancelled,

    /// Wrapped lower-level failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShowError {
    /// Build a [`ShowError::Resource`].
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`ShowError::Format`].
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`ShowError::Encoding`].
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`ShowError::State`].
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`ShowError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a budget error, rendering both frame counts as durations at `fps`.
    pub fn budget_exceeded(
        key: &'static str,
        actual_frames: u32,
        limit_frames: u32,
        fps: Fps,
    ) -> Self {
        Self::BudgetExceeded {
            key,
            actual: format_duration(fps.frames_to_secs(actual_frames)),
            limit: format_duration(fps.frames_to_secs(limit_frames)),
        }
    }

    /// Stable key a host can use to look up a localized message.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Resource(_) => "error.resource",
            Self::Format(_) => "error.format",
            Self::BudgetExceeded { key, .. } => key,
            Self::Encoding(_) => "error.encoding",
            Self::State(_) => "error.state",
            Self::Validation(_) => "error.validation",
            Self::Cancelled => "error.cancelled",
            Self::Other(_) => "error.other",
        }
    }

    /// Pre-formatted message arguments, in the order the message key expects them.
    pub fn message_args(&self) -> Vec<String> {
        match self {
            Self::BudgetExceeded { actual, limit, .. } => vec![actual.clone(), limit.clone()],
            Self::Cancelled => Vec::new(),
            Self::Other(e) => vec![format!("{e:#}")],
            Self::Resource(m)
            | Self::Format(m)
            | Self::Encoding(m)
            | Self::State(m)
            | Self::Validation(m) => vec![m.clone()],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
