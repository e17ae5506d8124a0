use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ShowError, ShowResult};

/// Where an audio resource or playlist lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AudioLocator {
    /// Local file.
    File(PathBuf),
    /// Absolute URI (`file:`, `http:` ...).
    Uri(String),
}

impl AudioLocator {
    /// `true` for `.m3u` playlists.
    pub fn is_playlist(&self) -> bool {
        let name = match self {
            Self::File(path) => path.to_string_lossy().into_owned(),
            Self::Uri(uri) => uri_path(uri).to_string(),
        };
        name.to_ascii_lowercase().ends_with(".m3u")
    }

    /// Local path, when the locator is a file or a `file:` URI.
    pub fn local_path(&self) -> Option<PathBuf> {
        match self {
            Self::File(path) => Some(path.clone()),
            Self::Uri(uri) => file_uri_to_path(uri),
        }
    }

    /// Absolute URI form of the locator.
    pub fn to_uri(&self) -> String {
        match self {
            Self::File(path) => path_to_file_uri(path),
            Self::Uri(uri) => uri.clone(),
        }
    }
}

impl std::fmt::Display for AudioLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Uri(uri) => f.write_str(uri),
        }
    }
}

/// An opened byte stream and its declared length, if the transport reported one.
pub struct OpenedResource {
    /// Stream positioned at the first byte.
    pub reader: Box<dyn Read>,
    /// Declared length in bytes.
    pub content_length: Option<u64>,
}

/// Opens audio resources. Hosts supply their own implementation to support remote schemes.
pub trait ResourceOpener {
    /// Open `locator` for reading.
    fn open(&self, locator: &AudioLocator) -> ShowResult<OpenedResource>;
}

/// Opener for local files and `file:` URIs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalOpener;

impl ResourceOpener for LocalOpener {
    fn open(&self, locator: &AudioLocator) -> ShowResult<OpenedResource> {
        let Some(path) = locator.local_path() else {
            return Err(ShowError::resource(format!(
                "no opener configured for '{locator}'"
            )));
        };
        let file = File::open(&path)
            .map_err(|e| ShowError::resource(format!("open '{}': {e}", path.display())))?;
        let len = file
            .metadata()
            .with_context(|| format!("stat '{}'", path.display()))?
            .len();
        Ok(OpenedResource {
            reader: Box::new(file),
            content_length: Some(len),
        })
    }
}

/// Read a resource fully.
///
/// With a declared length, at most that many bytes are read; a stream ending early yields the
/// bytes actually received.
pub fn read_resource(opener: &dyn ResourceOpener, locator: &AudioLocator) -> ShowResult<Vec<u8>> {
    let opened = opener.open(locator)?;
    let mut buf = Vec::new();
    match opened.content_length {
        Some(len) => {
            buf.reserve(usize::try_from(len).unwrap_or(0));
            opened
                .reader
                .take(len)
                .read_to_end(&mut buf)
                .map_err(|e| ShowError::resource(format!("read '{locator}': {e}")))?;
            if (buf.len() as u64) < len {
                tracing::warn!(
                    resource = %locator,
                    declared = len,
                    received = buf.len(),
                    "resource shorter than its declared length"
                );
            }
        }
        None => {
            let mut reader = opened.reader;
            reader
                .read_to_end(&mut buf)
                .map_err(|e| ShowError::resource(format!("read '{locator}': {e}")))?;
        }
    }
    Ok(buf)
}

/// Scheme of an absolute URI. Single letters are treated as drive letters, not schemes.
pub fn uri_scheme(s: &str) -> Option<&str> {
    let (scheme, _) = s.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if scheme.len() < 2 || !first.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

fn uri_path(uri: &str) -> &str {
    let end = uri.find(['?', '#']).unwrap_or(uri.len());
    &uri[..end]
}

/// Resolve `reference` against the absolute URI `base`.
///
/// Handles absolute references, authority-relative (`//host/..`), path-absolute and
/// path-relative references, and removes `.`/`..` segments.
pub fn resolve_uri(base: &str, reference: &str) -> String {
    if uri_scheme(reference).is_some() {
        return reference.to_string();
    }
    let Some(scheme) = uri_scheme(base) else {
        return reference.to_string();
    };
    let rest = &base[scheme.len() + 1..];
    let (authority, base_path) = match rest.strip_prefix("//") {
        Some(after) => {
            let split = after.find('/').unwrap_or(after.len());
            (Some(&after[..split]), uri_path(&after[split..]))
        }
        None => (None, uri_path(rest)),
    };

    if let Some(net) = reference.strip_prefix("//") {
        return format!("{scheme}://{net}");
    }

    let merged = if reference.starts_with('/') {
        reference.to_string()
    } else {
        let dir = match base_path.rfind('/') {
            Some(i) => &base_path[..=i],
            None => "/",
        };
        format!("{dir}{reference}")
    };
    let path = remove_dot_segments(&merged);
    match authority {
        Some(auth) => format!("{scheme}://{auth}{path}"),
        None => format!("{scheme}:{path}"),
    }
}

fn remove_dot_segments(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len().saturating_sub(1);
    for (i, seg) in segments.iter().enumerate() {
        match *seg {
            "." => {
                if i == last {
                    out.push("");
                }
            }
            ".." => {
                if out.len() > 1 {
                    out.pop();
                }
                if i == last {
                    out.push("");
                }
            }
            s => out.push(s),
        }
    }
    let joined = out.join("/");
    if joined.starts_with('/') {
        joined
    } else {
        format!("/{joined}")
    }
}

/// `file:` URI for an absolute path, percent-encoding bytes outside the unreserved set.
pub fn path_to_file_uri(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut out = String::from("file://");
    if !raw.starts_with('/') {
        out.push('/');
    }
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'/' | b'-' | b'_' | b'.' | b'~' | b':') {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Local path for a `file:` URI, decoding percent escapes.
pub fn file_uri_to_path(uri: &str) -> Option<PathBuf> {
    let scheme = uri_scheme(uri)?;
    if !scheme.eq_ignore_ascii_case("file") {
        return None;
    }
    let rest = uri_path(&uri[scheme.len() + 1..]);
    let path = match rest.strip_prefix("//") {
        Some(after) => {
            let split = after.find('/')?;
            let host = &after[..split];
            if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
                return None;
            }
            &after[split..]
        }
        None => rest,
    };
    let bytes = percent_decode(path)?;
    let decoded = String::from_utf8(bytes).ok()?;
    // `/C:/dir` on Windows
    let trimmed = match decoded.as_bytes() {
        [b'/', drive, b':', ..] if drive.is_ascii_alphabetic() && cfg!(windows) => &decoded[1..],
        _ => decoded.as_str(),
    };
    Some(PathBuf::from(trimmed))
}

fn percent_decode(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/source.rs"]
mod tests;
