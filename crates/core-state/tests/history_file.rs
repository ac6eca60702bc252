use core_state::History;
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn save_then_load_round_trips_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history");
    let mut h = History::new(10);
    for s in ["ls", "cd /tmp", "echo 漢字 😀"] {
        h.add(s);
    }
    h.save(&path).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "ls\ncd /tmp\necho 漢字 😀\n"
    );

    let mut loaded = History::new(10);
    assert_eq!(loaded.load(&path).unwrap(), 3);
    assert_eq!(loaded, h);
}

#[test]
fn load_strips_carriage_returns_and_respects_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history");
    fs::write(&path, "one\r\ntwo\r\ntwo\nthree\n").unwrap();
    let mut h = History::new(2);
    assert_eq!(h.load(&path).unwrap(), 4);
    assert_eq!(h.iter().collect::<Vec<_>>(), ["two", "three"]);
}

#[test]
fn load_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = History::default();
    let err = h.load(&dir.path().join("absent")).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    assert!(h.is_empty());
}

#[cfg(unix)]
#[test]
fn saved_file_is_private() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history");
    let mut h = History::default();
    h.add("secret-ish");
    h.save(&path).unwrap();
    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o077, 0);
}
