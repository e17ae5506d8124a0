use super::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use crate::audio::source::{LocalOpener, OpenedResource};

struct MapOpener(HashMap<String, String>);

impl ResourceOpener for MapOpener {
    fn open(&self, locator: &AudioLocator) -> ShowResult<OpenedResource> {
        let text = self
            .0
            .get(&locator.to_string())
            .cloned()
            .ok_or_else(|| ShowError::resource(format!("missing {locator}")))?;
        Ok(OpenedResource {
            reader: Box::new(Cursor::new(text.into_bytes())),
            content_length: None,
        })
    }
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.mp3"), b"").unwrap();
    let list = AudioLocator::File(dir.path().join("list.m3u"));

    let entries = parse_playlist("#EXTM3U\r\n\r\n  \na.mp3\r\n#EXTINF:1,x\nmissing.mp3\n", &list);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], AudioLocator::File(dir.path().join("a.mp3")));
    match &entries[1] {
        AudioLocator::Uri(uri) => {
            assert!(uri.starts_with("file://"), "{uri}");
            assert!(uri.ends_with("/missing.mp3"), "{uri}");
        }
        other => panic!("expected a uri, got {other:?}"),
    }
}

#[test]
fn absolute_existing_paths_win() {
    let dir = tempfile::tempdir().unwrap();
    let song = dir.path().join("abs.mp3");
    std::fs::write(&song, b"").unwrap();
    let list = AudioLocator::File(PathBuf::from("/somewhere/else/list.m3u"));
    assert_eq!(
        resolve_entry(&song.to_string_lossy(), &list),
        Some(AudioLocator::File(song))
    );
}

#[test]
fn nested_local_playlists_expand_in_order() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.mp3", "b.mp3", "c.mp3"] {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub/inner.m3u"), "../a.mp3\n../b.mp3\n").unwrap();
    std::fs::write(dir.path().join("outer.m3u"), "sub/inner.m3u\nc.mp3\n").unwrap();

    let found = expand(
        &AudioLocator::File(dir.path().join("outer.m3u")),
        &LocalOpener,
    )
    .unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|l| {
            l.local_path()
                .unwrap()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(names, vec!["a.mp3", "b.mp3", "c.mp3"]);
}

#[test]
fn remote_playlists_resolve_against_their_uri() {
    let opener = MapOpener(HashMap::from([(
        "http://h/music/list.m3u".to_string(),
        "one.mp3\n# comment\nhttp://o/two.mp3\n../three.mp3\n".to_string(),
    )]));
    let found = expand(
        &AudioLocator::Uri("http://h/music/list.m3u".into()),
        &opener,
    )
    .unwrap();
    assert_eq!(
        found,
        vec![
            AudioLocator::Uri("http://h/music/one.mp3".into()),
            AudioLocator::Uri("http://o/two.mp3".into()),
            AudioLocator::Uri("http://h/three.mp3".into()),
        ]
    );
}

#[test]
fn self_including_playlists_hit_the_depth_limit() {
    let opener = MapOpener(HashMap::from([(
        "http://h/loop.m3u".to_string(),
        "loop.m3u\n".to_string(),
    )]));
    let err = expand(&AudioLocator::Uri("http://h/loop.m3u".into()), &opener).unwrap_err();
    assert!(matches!(err, ShowError::Format(_)));
}

#[test]
fn unreadable_entries_fail_the_expansion() {
    let opener = MapOpener(HashMap::from([(
        "http://h/list.m3u".to_string(),
        "gone.m3u\n".to_string(),
    )]));
    let err = expand(&AudioLocator::Uri("http://h/list.m3u".into()), &opener).unwrap_err();
    assert!(matches!(err, ShowError::Resource(_)));
}
