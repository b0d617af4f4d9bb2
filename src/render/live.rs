use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::assets::loader::SessionToken;
use crate::foundation::core::PixelRect;
use crate::render::draw::paint_clip;
use crate::scene::model::ElementDef;

/// Cancellable periodic tick bound to one scene activation.
///
/// A started ticker fires on the first check and then every `interval`. Checking it with a
/// different session token stops it for good, so a tick can never repaint a newer scene.
#[derive(Clone, Debug)]
pub struct LiveTicker {
    interval: Duration,
    token: Option<SessionToken>,
    next_due: Option<Instant>,
    ticks: u64,
}

impl LiveTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            token: None,
            next_due: None,
            ticks: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm for `token`; the next check fires immediately.
    pub fn start(&mut self, token: SessionToken) {
        self.token = Some(token);
        self.next_due = None;
    }

    /// Arm for `token` with the first tick at `first`.
    pub fn start_at(&mut self, token: SessionToken, first: Instant) {
        self.token = Some(token);
        self.next_due = Some(first);
    }

    pub fn stop(&mut self) {
        self.token = None;
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.token.is_some()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// `true` when a tick for `current` is due at `now`. Missed ticks collapse into one.
    pub fn due(&mut self, now: Instant, current: SessionToken) -> bool {
        let Some(token) = self.token else {
            return false;
        };
        if token != current {
            tracing::debug!(%token, %current, "live ticker outlived its session; stopping");
            self.stop();
            return false;
        }
        if let Some(due) = self.next_due
            && now < due
        {
            return false;
        }
        let mut next = self.next_due.unwrap_or(now) + self.interval;
        while next <= now {
            next += self.interval;
        }
        self.next_due = Some(next);
        self.ticks += 1;
        true
    }
}

/// One live element's repaint region and what lies under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RepaintRegion {
    /// Index of the live element in the sorted element list.
    pub(crate) live: usize,
    /// Padded bounds, clipped to the surface.
    pub(crate) rect: PixelRect,
    /// Non-live raster elements whose paint clip meets `rect`, in stacking order, each with
    /// the part of `rect` it may repaint.
    pub(crate) underlays: SmallVec<[(usize, PixelRect); 8]>,
}

/// Visible live elements of one scene with their padded repaint rectangles.
///
/// Rebuilt on every full render and only read by the tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiveElementSet {
    entries: Vec<(usize, PixelRect)>,
    padding: i32,
    bounds: PixelRect,
}

impl LiveElementSet {
    /// Live elements of `elements` (stacking order) with bounds grown by `padding` and clipped
    /// to `bounds`.
    pub fn collect(elements: &[ElementDef], padding: i32, bounds: PixelRect) -> Self {
        let entries = elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.visible && e.kind().is_live())
            .map(|(i, e)| (i, paint_clip(e, padding, bounds)))
            .filter(|(_, r)| !r.is_empty())
            .collect();
        Self {
            entries,
            padding,
            bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rects(&self) -> Vec<PixelRect> {
        self.entries.iter().map(|(_, r)| *r).collect()
    }

    /// `(element index, repaint rect)` pairs.
    pub fn entries(&self) -> &[(usize, PixelRect)] {
        &self.entries
    }

    /// Plan the two-pass repaint: for each live region, the raster elements to restore under it.
    ///
    /// Overlay-realized kinds never appear; they live on the overlay layer.
    pub(crate) fn plan_repaint(&self, elements: &[ElementDef]) -> Vec<RepaintRegion> {
        let clips: Vec<Option<PixelRect>> = elements
            .iter()
            .map(|e| {
                let k = e.kind();
                (e.visible && !k.is_live() && !k.is_overlay())
                    .then(|| paint_clip(e, self.padding, self.bounds))
            })
            .collect();
        self.entries
            .iter()
            .map(|&(live, rect)| RepaintRegion {
                live,
                rect,
                underlays: clips
                    .iter()
                    .enumerate()
                    .filter_map(|(i, c)| {
                        let clip = c.as_ref()?.intersect(&rect);
                        (!clip.is_empty()).then_some((i, clip))
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/live.rs"]
mod tests;
