use super::*;

fn read_all(mut r: Box<dyn Read + '_>) -> Vec<u8> {
    let mut out = Vec::new();
    r.read_to_end(&mut out).unwrap();
    out
}

#[test]
fn rel_paths_resolve_against_the_base() {
    assert_eq!(resolve_rel_path("", "a/./b.png").unwrap(), "a/b.png");
    assert_eq!(resolve_rel_path("", "a\\b.png").unwrap(), "a/b.png");
    assert_eq!(resolve_rel_path("doc", "../img/a.png").unwrap(), "img/a.png");
    assert_eq!(resolve_rel_path("doc\\pages/", "./x/../y.png").unwrap(), "doc/pages/y.png");
}

#[test]
fn rel_paths_stay_under_the_root() {
    assert!(resolve_rel_path("", "/abs.png").is_err());
    assert!(resolve_rel_path("", "../up.png").is_err());
    assert!(resolve_rel_path("doc", "../../up.png").is_err());
    assert!(resolve_rel_path("doc", "").is_err());
    assert!(resolve_rel_path("", "./").is_err());
    assert!(resolve_rel_path("doc", "..").is_err());
}

#[test]
fn memory_resolver_serves_registered_bytes() {
    let r = MemoryResourceResolver::new().with_entry("a.png", vec![1, 2, 3]);
    assert_eq!(read_all(r.open("a.png").unwrap()), vec![1, 2, 3]);

    let err = r.open("missing.png").err().unwrap();
    assert!(err.to_string().contains("missing.png"));
}

#[test]
fn file_resolver_reads_under_root() {
    let dir = std::env::temp_dir().join(format!("fxg_swf_resolver_{}", std::process::id()));
    std::fs::create_dir_all(dir.join("img")).unwrap();
    std::fs::write(dir.join("img/x.bin"), b"hello").unwrap();

    let r = FileResourceResolver::new(&dir);
    assert_eq!(r.root(), dir.as_path());
    assert_eq!(read_all(r.open("img/x.bin").unwrap()), b"hello".to_vec());
    assert!(r.open("img/nope.bin").is_err());
    assert!(r.open("../x.bin").is_err());

    let nested = FileResourceResolver::new(&dir).with_base("doc");
    assert_eq!(read_all(nested.open("../img/x.bin").unwrap()), b"hello".to_vec());

    std::fs::remove_dir_all(&dir).unwrap();
}
