use super::*;
use std::sync::mpsc;

fn req(token: u64, source: &str) -> LoadRequest {
    LoadRequest {
        token: SessionToken(token),
        source: source.to_owned(),
        purpose: LoadPurpose::Element("img-1".to_owned()),
    }
}

#[test]
fn normalize_rel_path_rejects_traversal() {
    assert_eq!(normalize_rel_path("a/./b\\c.png").unwrap(), "a/b/c.png");
    assert!(normalize_rel_path("../etc/passwd").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn remote_sources_are_media_load_errors() {
    let err = resolve_source(Path::new("/srv"), "https://cdn.example/a.png").unwrap_err();
    assert!(matches!(err, StagecastError::MediaLoad(_)));
    assert_eq!(
        resolve_source(Path::new("/srv"), "img/a.png").unwrap(),
        PathBuf::from("/srv/img/a.png")
    );
    assert_eq!(
        resolve_source(Path::new("/srv"), "file:///tmp/a.png").unwrap(),
        PathBuf::from("/tmp/a.png")
    );
}

#[test]
fn fs_loader_reports_missing_file_through_channel() {
    let (tx, rx) = mpsc::channel();
    let mut loader = FsAssetLoader::new(std::env::temp_dir());
    loader.request(req(1, "stagecast-definitely-missing.png"), tx);
    let done = rx.recv().unwrap();
    assert_eq!(done.request.token, SessionToken(1));
    assert!(matches!(done.result, Err(StagecastError::MediaLoad(_))));
}

#[test]
fn manual_loader_parks_until_resolved() {
    let (tx, rx) = mpsc::channel();
    let mut loader = ManualLoader::new();
    let handle = loader.handle();
    loader.request(req(1, "a.png"), tx.clone());
    loader.request(req(1, "b.png"), tx);
    assert_eq!(handle.pending().len(), 2);
    assert!(rx.try_recv().is_err());

    assert_eq!(handle.resolve("a.png", Ok(solid_image(2, 2, [255, 0, 0, 255]))), 1);
    let done = rx.try_recv().unwrap();
    assert_eq!(done.request.source, "a.png");
    assert_eq!(done.result.unwrap().rgba8_premul.len(), 16);
    assert_eq!(handle.pending().len(), 1);
}

#[test]
fn cache_rerequests_for_new_token_only() {
    let mut cache = ImageCache::new();
    let t1 = SessionToken(1);
    let t2 = t1.next();
    assert!(cache.needs_request("a.png", t1));
    cache.mark_pending("a.png", t1);
    assert!(!cache.needs_request("a.png", t1));
    assert!(cache.has_pending(t1));
    assert!(cache.needs_request("a.png", t2));

    cache.mark_failed("a.png", t1);
    assert!(cache.failed("a.png", t1));
    assert!(!cache.failed("a.png", t2));
    assert!(cache.needs_request("a.png", t2));

    let handle = ImageHandle::from_decoded(&solid_image(1, 1, [0, 0, 0, 255])).unwrap();
    cache.insert_ready("a.png", handle);
    assert!(!cache.needs_request("a.png", t2));
    assert!(cache.ready("a.png").is_some());
    assert!(!cache.has_pending(t1));
}

#[test]
fn retain_sources_drops_everything_not_kept() {
    let mut cache = ImageCache::new();
    let t = SessionToken(1);
    for src in ["a.png", "b.png"] {
        let handle = ImageHandle::from_decoded(&solid_image(1, 1, [0, 0, 0, 255])).unwrap();
        cache.insert_ready(src, handle);
    }
    cache.mark_failed("c.png", t);
    cache.mark_pending("d.png", t);

    let dropped = cache.retain_sources(|src| src == "b.png" || src == "d.png");
    assert_eq!(dropped, 2);
    assert_eq!(cache.len(), 2);
    assert!(cache.ready("a.png").is_none());
    assert!(cache.ready("b.png").is_some());
    assert!(!cache.failed("c.png", t));
    assert!(cache.has_pending(t));
}
