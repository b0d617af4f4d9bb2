use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::assets::decode::{DecodedImage, ImageHandle, decode_image};
use crate::foundation::error::{StagecastError, StagecastResult};

/// Identity of one scene activation. Completions carrying an older token are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct SessionToken(pub u64);

impl SessionToken {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a decoded image is for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoadPurpose {
    Background,
    Element(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub token: SessionToken,
    pub source: String,
    pub purpose: LoadPurpose,
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub request: LoadRequest,
    pub result: StagecastResult<DecodedImage>,
}

/// Fire-and-forget image loading. Implementations must not block the caller for long and must
/// eventually send exactly one completion per request (unless the receiver is gone).
pub trait AssetLoader {
    fn request(&mut self, req: LoadRequest, done: Sender<LoadCompletion>);
}

/// Loads from the local filesystem, relative sources resolved against `root`.
///
/// Remote URLs are rejected with `MediaLoad`; fetching is the host's job.
#[derive(Clone, Debug)]
pub struct FsAssetLoader {
    root: PathBuf,
    threaded: bool,
}

impl FsAssetLoader {
    /// Loader that decodes on the calling thread; completions are still delivered through the
    /// channel and applied on the next pump.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            threaded: false,
        }
    }

    /// Decode each request on its own worker thread.
    pub fn threaded(mut self, threaded: bool) -> Self {
        self.threaded = threaded;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for FsAssetLoader {
    fn request(&mut self, req: LoadRequest, done: Sender<LoadCompletion>) {
        let root = self.root.clone();
        let job = move || {
            let result = load_local(&root, &req.source);
            // Receiver gone means the compositor was dropped; nothing to report to.
            let _ = done.send(LoadCompletion {
                request: req,
                result,
            });
        };
        if self.threaded {
            std::thread::spawn(job);
        } else {
            job();
        }
    }
}

pub(crate) fn load_local(root: &Path, source: &str) -> StagecastResult<DecodedImage> {
    let path = resolve_source(root, source)?;
    let bytes = std::fs::read(&path)
        .with_context(|| format!("read '{}'", path.display()))
        .map_err(|e| StagecastError::media_load(format!("{e:#}")))?;
    decode_image(&bytes, source)
}

/// Map a template media source to a local path.
pub(crate) fn resolve_source(root: &Path, source: &str) -> StagecastResult<PathBuf> {
    let s = source.trim();
    if s.is_empty() {
        return Err(StagecastError::media_load("empty media source"));
    }
    let lower = s.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Err(StagecastError::media_load(format!(
            "remote source '{s}' must be fetched by the host"
        )));
    }
    let s = s.strip_prefix("file://").unwrap_or(s);
    let p = Path::new(s);
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    Ok(root.join(normalize_rel_path(s)?))
}

/// Normalize a relative asset path: `/` separators, no `.` segments, no `..` traversal.
pub(crate) fn normalize_rel_path(source: &str) -> StagecastResult<String> {
    let s = source.replace('\\', "/");
    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StagecastError::media_load(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }
    if out.is_empty() {
        return Err(StagecastError::media_load(
            "asset path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

type PendingLoad = (LoadRequest, Sender<LoadCompletion>);

/// Loader that parks requests until a test (or embedding host) resolves them by hand.
#[derive(Clone, Default)]
pub struct ManualLoader {
    pending: Arc<Mutex<Vec<PendingLoad>>>,
}

impl ManualLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle; clones see the same queue.
    pub fn handle(&self) -> Self {
        self.clone()
    }

    pub fn pending(&self) -> Vec<LoadRequest> {
        self.lock().iter().map(|(r, _)| r.clone()).collect()
    }

    /// Deliver `result` to every parked request for `source`. Returns how many were resolved.
    pub fn resolve(&self, source: &str, result: StagecastResult<DecodedImage>) -> usize {
        let mut q = self.lock();
        let (hits, rest): (Vec<_>, Vec<_>) = q.drain(..).partition(|(r, _)| r.source == source);
        *q = rest;
        drop(q);

        let n = hits.len();
        for (req, tx) in hits {
            let _ = tx.send(LoadCompletion {
                request: req,
                result: clone_result(&result),
            });
        }
        n
    }

    /// Resolve every parked request with a solid `width`x`height` image of `rgba` (straight).
    pub fn resolve_all_solid(&self, width: u32, height: u32, rgba: [u8; 4]) -> usize {
        let sources = self
            .pending()
            .into_iter()
            .map(|r| r.source)
            .collect::<std::collections::BTreeSet<_>>();
        sources
            .iter()
            .map(|s| self.resolve(s, Ok(solid_image(width, height, rgba))))
            .sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PendingLoad>> {
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl AssetLoader for ManualLoader {
    fn request(&mut self, req: LoadRequest, done: Sender<LoadCompletion>) {
        self.lock().push((req, done));
    }
}

fn clone_result(r: &StagecastResult<DecodedImage>) -> StagecastResult<DecodedImage> {
    match r {
        Ok(img) => Ok(img.clone()),
        Err(e) => Err(StagecastError::media_load(e.to_string())),
    }
}

/// Solid-color decoded image from a straight-alpha RGBA color.
pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> DecodedImage {
    let px = crate::foundation::core::Rgba8Premul::from_straight_rgba(rgba[0], rgba[1], rgba[2], rgba[3])
        .to_array();
    let n = (width as usize) * (height as usize);
    let mut data = Vec::with_capacity(n * 4);
    for _ in 0..n {
        data.extend_from_slice(&px);
    }
    DecodedImage {
        width,
        height,
        rgba8_premul: data,
    }
}

#[derive(Clone, Debug)]
enum CacheEntry {
    Pending(SessionToken),
    Ready(Arc<ImageHandle>),
    Failed(SessionToken),
}

/// Decoded images by source, shared across scene activations.
///
/// Ready entries serve synchronous restores during selective repaint. Pending and failed entries
/// remember the token that created them so a new activation re-requests them.
#[derive(Default)]
pub struct ImageCache {
    entries: HashMap<String, CacheEntry>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(&self, source: &str) -> Option<Arc<ImageHandle>> {
        match self.entries.get(source) {
            Some(CacheEntry::Ready(h)) => Some(Arc::clone(h)),
            _ => None,
        }
    }

    /// `true` once a load for `source` failed in the current activation.
    pub fn failed(&self, source: &str, token: SessionToken) -> bool {
        matches!(self.entries.get(source), Some(CacheEntry::Failed(t)) if *t == token)
    }

    /// `true` when no load for `source` is ready or in flight for `token`.
    pub fn needs_request(&self, source: &str, token: SessionToken) -> bool {
        match self.entries.get(source) {
            None => true,
            Some(CacheEntry::Ready(_)) => false,
            Some(CacheEntry::Pending(t)) | Some(CacheEntry::Failed(t)) => *t != token,
        }
    }

    pub fn mark_pending(&mut self, source: &str, token: SessionToken) {
        self.entries
            .insert(source.to_owned(), CacheEntry::Pending(token));
    }

    pub fn insert_ready(&mut self, source: &str, handle: ImageHandle) -> Arc<ImageHandle> {
        let h = Arc::new(handle);
        self.entries
            .insert(source.to_owned(), CacheEntry::Ready(Arc::clone(&h)));
        h
    }

    pub fn mark_failed(&mut self, source: &str, token: SessionToken) {
        self.entries
            .insert(source.to_owned(), CacheEntry::Failed(token));
    }

    pub fn has_pending(&self, token: SessionToken) -> bool {
        self.entries
            .values()
            .any(|e| matches!(e, CacheEntry::Pending(t) if *t == token))
    }

    /// Drop every entry whose source fails `keep`. Returns how many were dropped.
    pub fn retain_sources(&mut self, keep: impl Fn(&str) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|source, _| keep(source));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
