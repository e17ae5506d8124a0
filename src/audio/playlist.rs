use std::path::Path;

use crate::audio::source::{AudioLocator, ResourceOpener, read_resource, resolve_uri, uri_scheme};
use crate::foundation::error::{ShowError, ShowResult};

/// Nesting limit for playlists that include other playlists.
pub const MAX_PLAYLIST_DEPTH: usize = 16;

/// Resolve one playlist line to a locator. Blank lines and `#` comments yield `None`.
///
/// For a local playlist the line is tried as an existing absolute path, then as a path relative
/// to the playlist's directory; anything else is treated as a URI, resolved against the
/// playlist's own URI when relative.
pub fn resolve_entry(line: &str, playlist: &AudioLocator) -> Option<AudioLocator> {
    if line.trim().is_empty() || line.starts_with('#') {
        return None;
    }

    if let Some(playlist_path) = playlist.local_path() {
        let candidate = Path::new(line);
        if candidate.is_absolute() && candidate.exists() {
            return Some(AudioLocator::File(candidate.to_path_buf()));
        }
        if let Some(dir) = playlist_path.parent() {
            let relative = dir.join(line);
            if relative.exists() {
                return Some(AudioLocator::File(relative));
            }
        }
    }

    if uri_scheme(line).is_some() {
        Some(AudioLocator::Uri(line.to_string()))
    } else {
        Some(AudioLocator::Uri(resolve_uri(
            &playlist.to_uri(),
            &line.replace('\\', "/"),
        )))
    }
}

/// Parse playlist text into locators, in order.
pub fn parse_playlist(text: &str, playlist: &AudioLocator) -> Vec<AudioLocator> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter_map(|line| resolve_entry(line, playlist))
        .collect()
}

/// Expand `locator` into the ordered list of audio resources it names. Nested playlists are
/// expanded in place.
pub fn expand(
    locator: &AudioLocator,
    opener: &dyn ResourceOpener,
) -> ShowResult<Vec<AudioLocator>> {
    let mut out = Vec::new();
    expand_into(locator, opener, 0, &mut out)?;
    Ok(out)
}

fn expand_into(
    locator: &AudioLocator,
    opener: &dyn ResourceOpener,
    depth: usize,
    out: &mut Vec<AudioLocator>,
) -> ShowResult<()> {
    if !locator.is_playlist() {
        out.push(locator.clone());
        return Ok(());
    }
    if depth >= MAX_PLAYLIST_DEPTH {
        return Err(ShowError::format(format!(
            "playlist '{locator}' nests deeper than {MAX_PLAYLIST_DEPTH} levels"
        )));
    }
    let bytes = read_resource(opener, locator)?;
    let text = String::from_utf8_lossy(&bytes);
    let entries = parse_playlist(&text, locator);
    tracing::debug!(playlist = %locator, entries = entries.len(), "playlist resolved");
    for entry in &entries {
        expand_into(entry, opener, depth + 1, out)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/playlist.rs"]
mod tests;
