use super::*;

#[test]
fn append_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ScratchStore::create_in(dir.path()).unwrap();
    let name = store.path().unwrap().file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("lbm"));
    assert!(name.ends_with(".tmp"));

    store.writer().unwrap().write_all(b"hello ").unwrap();
    store.writer().unwrap().write_all(b"world").unwrap();
    assert_eq!(store.len(), 11);

    let mut buf = [0u8; 5];
    store.read_at(6, &mut buf).unwrap();
    assert_eq!(&buf, b"world");

    // Writing after a read still appends.
    store.writer().unwrap().write_all(b"!").unwrap();
    let mut all = vec![0u8; 12];
    store.read_at(0, &mut all).unwrap();
    assert_eq!(&all, b"hello world!");

    store.release().unwrap();
}

#[test]
fn dropping_a_writer_keeps_the_store_open() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ScratchStore::create_in(dir.path()).unwrap();
    {
        let mut w = store.writer().unwrap();
        w.write_all(b"abc").unwrap();
        w.flush().unwrap();
    }
    assert!(!store.is_released());
    let mut buf = [0u8; 3];
    store.read_at(0, &mut buf).unwrap();
    assert_eq!(&buf, b"abc");
    store.release().unwrap();
}

#[test]
fn read_past_end_is_a_state_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ScratchStore::create_in(dir.path()).unwrap();
    store.writer().unwrap().write_all(b"abc").unwrap();
    let mut buf = [0u8; 4];
    assert!(matches!(store.read_at(0, &mut buf), Err(ShowError::State(_))));
    store.release().unwrap();
}

#[test]
fn truncate_discards_tail() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ScratchStore::create_in(dir.path()).unwrap();
    store.writer().unwrap().write_all(b"keep-drop").unwrap();
    store.truncate(4).unwrap();
    assert_eq!(store.len(), 4);
    store.writer().unwrap().write_all(b"!").unwrap();
    let mut buf = [0u8; 5];
    store.read_at(0, &mut buf).unwrap();
    assert_eq!(&buf, b"keep!");
    assert!(store.truncate(10).is_err());
    store.release().unwrap();
}

#[test]
fn release_deletes_file_and_only_runs_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ScratchStore::create_in(dir.path()).unwrap();
    let path = store.path().unwrap().to_path_buf();
    assert!(path.exists());

    store.release().unwrap();
    assert!(!path.exists());
    assert!(store.is_released());
    assert!(matches!(store.release(), Err(ShowError::State(_))));
    assert!(matches!(store.writer(), Err(ShowError::State(_))));
}

#[test]
fn purge_with_nothing_pending_is_a_noop() {
    let before = deferred_delete_count();
    assert!(purge_deferred_deletes() <= before);
}
