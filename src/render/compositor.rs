use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Instant;

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};

use crate::assets::decode::ImageHandle;
use crate::assets::loader::{
    AssetLoader, FsAssetLoader, ImageCache, LoadCompletion, LoadPurpose, LoadRequest, SessionToken,
};
use crate::assets::text::TextLayoutEngine;
use crate::config::EngineConfig;
use crate::foundation::core::{Affine, PixelRect, Rect, Rgba8Premul};
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::foundation::time::{Clock, SystemClock};
use crate::layout::scaler::ScaleContext;
use crate::navigation::action::{ActionHost, ActionOutcome};
use crate::navigation::focus::{Direction, FocusNavigator};
use crate::render::background::{
    BackgroundConfig, BackgroundRenderer, MediaPlayer, StallWatchdog, WatchdogAction,
};
use crate::render::draw::paint_clip;
use crate::render::elements::{
    RenderCtx, TextBlock, draw_shaped, live_overlay_node, render_isolated, renderer_for,
};
use crate::render::host::HostSurface;
use crate::render::live::{LiveElementSet, LiveTicker};
use crate::render::overlay::OverlayNode;
use crate::render::session::{RenderPhase, RenderSession};
use crate::render::target::{OverlayNodeTarget, PaintTarget, RasterScratch, RasterTarget};
use crate::scene::model::{ActionDef, ElementDef, ElementKind, StyleDef, TextAlign};
use crate::scene::store::TemplateStore;

const FAILURE_MESSAGE: &str = "Failed to render template";

/// Stable sort into stacking order: ascending `z_index`, document order for ties.
pub fn sort_by_stacking(elements: &mut [ElementDef]) {
    elements.sort_by_key(|e| e.z_index);
}

/// Outcome of one full render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderReport {
    pub token: SessionToken,
    /// Elements in the scene after lenient parsing.
    pub elements: usize,
    /// Elements the template parser skipped or left out for unusable geometry.
    pub skipped: usize,
    /// Elements whose renderer failed (isolated and logged).
    pub failed: usize,
    /// Elements wait for the background image; they render from [`Compositor::pump`].
    pub deferred: bool,
}

/// What one [`Compositor::pump`] call did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Completions applied to the current scene.
    pub completions: usize,
    /// Completions dropped because their scene is gone.
    pub stale: usize,
    pub ticked: bool,
    /// Live elements repainted (or live overlay nodes refreshed) by the tick.
    pub live_repainted: usize,
    /// Element repaints that failed during this call (isolated and logged).
    pub repaint_failures: usize,
    pub watchdog: Option<WatchdogAction>,
}

/// Drives a host surface from the current template.
///
/// Single-threaded: the host calls [`Compositor::render`] for a new scene and then
/// [`Compositor::pump`] from its event loop to apply async loads and run the live tick.
pub struct Compositor {
    store: Arc<dyn TemplateStore>,
    config: EngineConfig,
    host: Option<HostSurface>,
    scratch: RasterScratch,
    loader: Box<dyn AssetLoader>,
    done_tx: Sender<LoadCompletion>,
    done_rx: Receiver<LoadCompletion>,
    clock: Arc<dyn Clock>,
    local_offset: Option<FixedOffset>,
    text: TextLayoutEngine,
    images: ImageCache,
    background: BackgroundRenderer,
    session: Option<RenderSession>,
    last_token: SessionToken,
    phase: RenderPhase,
    phases: Vec<RenderPhase>,
    ticker: LiveTicker,
    watchdog: StallWatchdog,
    player: Option<Box<dyn MediaPlayer>>,
    focus: FocusNavigator,
}

impl Compositor {
    /// Compositor with a filesystem loader rooted at `config.assets_root`, the system clock and
    /// fonts from `config.font_path` (or well-known system locations).
    pub fn new(store: Arc<dyn TemplateStore>, config: EngineConfig) -> Self {
        let (done_tx, done_rx) = channel();
        Self {
            store,
            loader: Box::new(FsAssetLoader::new(config.assets_root.clone())),
            text: TextLayoutEngine::discover(
                config.font_path.as_deref(),
                config.bold_font_path.as_deref(),
            ),
            ticker: LiveTicker::new(config.live_tick_interval()),
            watchdog: StallWatchdog::new(config.watchdog_stall_samples, config.watchdog_interval()),
            focus: FocusNavigator::new(config.focus),
            local_offset: config
                .utc_offset_minutes
                .and_then(|m| FixedOffset::east_opt(m.saturating_mul(60))),
            config,
            host: None,
            scratch: RasterScratch::new(1, 1),
            done_tx,
            done_rx,
            clock: Arc::new(SystemClock),
            images: ImageCache::new(),
            background: BackgroundRenderer::new(),
            session: None,
            last_token: SessionToken::default(),
            phase: RenderPhase::Idle,
            phases: Vec::new(),
            player: None,
        }
    }

    pub fn with_loader(mut self, loader: Box<dyn AssetLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_text_engine(mut self, text: TextLayoutEngine) -> Self {
        self.text = text;
        self
    }

    /// Fixed display offset for clocks, instead of the host's local offset.
    pub fn with_local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = Some(offset);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Attach (or replace) the host surface. A replaced host is returned.
    pub fn attach_host(&mut self, host: HostSurface) -> Option<HostSurface> {
        self.host.replace(host)
    }

    pub fn detach_host(&mut self) -> Option<HostSurface> {
        self.cleanup();
        self.host.take()
    }

    pub fn host(&self) -> Option<&HostSurface> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut HostSurface> {
        self.host.as_mut()
    }

    pub fn session(&self) -> Option<&RenderSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// Phases entered since the last [`Compositor::render`] began.
    pub fn phase_history(&self) -> &[RenderPhase] {
        &self.phases
    }

    pub fn focused_element(&self) -> Option<&str> {
        self.focus.focused_element().map(|c| c.id.as_str())
    }

    pub fn focus_navigator(&self) -> &FocusNavigator {
        &self.focus
    }

    /// Padded repaint rectangles of the live elements.
    pub fn live_rects(&self) -> Vec<PixelRect> {
        self.session
            .as_ref()
            .map(RenderSession::live_rects)
            .unwrap_or_default()
    }

    pub fn is_animating(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn has_pending_loads(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| self.images.has_pending(s.token))
    }

    fn enter(&mut self, phase: RenderPhase) {
        tracing::trace!(?phase, "render phase");
        self.phase = phase;
        self.phases.push(phase);
    }

    fn display_offset(&self, now: DateTime<Utc>) -> FixedOffset {
        self.local_offset
            .unwrap_or_else(|| Local.offset_from_utc_datetime(&now.naive_utc()).fix())
    }

    /// Full render of the store's current template.
    ///
    /// A missing host is `PlatformUnavailable` and a missing template is `Config`; both leave the
    /// previous frame untouched. An invalid template replaces the frame with a failure panel and
    /// returns its `Config` error.
    #[tracing::instrument(skip(self), fields(token = tracing::field::Empty))]
    pub fn render(&mut self) -> StagecastResult<RenderReport> {
        self.phases.clear();
        self.enter(RenderPhase::LoadTemplate);
        let Some((sw, sh)) = self.host.as_ref().map(HostSurface::size) else {
            self.enter(RenderPhase::Idle);
            return Err(StagecastError::platform("no host surface attached"));
        };
        let Some(template) = self.store.current() else {
            tracing::warn!("render requested without a template");
            self.enter(RenderPhase::Idle);
            return Err(StagecastError::config("no template loaded"));
        };
        if let Err(err) = template.validate() {
            tracing::error!(error = %err, "template rejected");
            self.teardown();
            self.draw_failure_panel();
            self.enter(RenderPhase::Idle);
            return Err(err);
        }
        for issue in template.issues() {
            tracing::warn!(%issue, "template issue");
        }

        self.teardown();
        let token = self.last_token.next();
        self.last_token = token;
        tracing::Span::current().record("token", token.0);

        self.enter(RenderPhase::ComputeScale);
        let canvas = template.canvas();
        let scale = ScaleContext::initialize(sw, sh, canvas.width, canvas.height, self.config.fit_mode);
        let scaled = scale.scale_template_data(template.def());

        self.enter(RenderPhase::SortElements);
        let mut elements: Vec<ElementDef> = scaled
            .elements
            .into_iter()
            .zip(template.elements())
            .filter(|(_, design)| design.has_usable_geometry())
            .map(|(e, _)| e)
            .collect();
        let unusable = template.elements().len() - elements.len();
        sort_by_stacking(&mut elements);

        self.enter(RenderPhase::DetermineBackgroundMode);
        let background = BackgroundConfig::from_canvas(&scaled.canvas);
        let referenced: HashSet<&str> = elements
            .iter()
            .filter_map(|e| e.body.image_source())
            .map(str::trim)
            .chain(background.image.as_deref())
            .collect();
        let evicted = self.images.retain_sources(|src| referenced.contains(src));
        if evicted > 0 {
            tracing::debug!(evicted, "unreferenced images evicted");
        }
        let awaited = background
            .image
            .clone()
            .filter(|_| background.awaits_image());
        let cached = awaited.as_deref().and_then(|src| self.images.ready(src));
        let report = RenderReport {
            token,
            elements: elements.len(),
            skipped: template.skipped_elements() + unusable,
            failed: 0,
            deferred: awaited.is_some() && cached.is_none(),
        };
        self.session = Some(RenderSession {
            token,
            template: Arc::clone(&template),
            scale,
            elements,
            background,
            background_image: cached,
            activated_at: self.clock.now(),
            elements_rendered: false,
            live: LiveElementSet::default(),
            failed_elements: 0,
            repaint_failures: 0,
        });

        if let (true, Some(src)) = (report.deferred, awaited) {
            self.enter(RenderPhase::BackgroundAsync);
            self.paint_background();
            self.dispatch(vec![LoadRequest {
                token,
                source: src,
                purpose: LoadPurpose::Background,
            }]);
            tracing::debug!(%token, "elements deferred until the background image resolves");
            return Ok(report);
        }

        self.enter(RenderPhase::BackgroundSync);
        self.paint_background();
        let failed = self.activate_elements();
        tracing::info!(%token, elements = report.elements, failed, "scene rendered");
        Ok(RenderReport { failed, ..report })
    }

    /// Re-read the store and render again.
    pub fn refresh(&mut self) -> StagecastResult<RenderReport> {
        self.render()
    }

    /// Repaint the live elements now, outside the tick schedule.
    pub fn update_clocks(&mut self) -> usize {
        self.live_tick().0
    }

    /// (Re)start the live tick for the current scene with the first tick at `now`.
    pub fn start_animation_loop(&mut self, now: Instant) {
        match &self.session {
            Some(s) if !s.live.is_empty() => self.ticker.start_at(s.token, now),
            _ => tracing::debug!("no live elements; live tick not started"),
        }
    }

    pub fn stop_animation_loop(&mut self) {
        self.ticker.stop();
    }

    /// Apply finished loads, then run the live tick and the video watchdog when due.
    pub fn pump(&mut self, now: Instant) -> PumpReport {
        let mut report = PumpReport::default();
        while let Ok(c) = self.done_rx.try_recv() {
            self.apply_completion(c, &mut report);
        }
        if let Some(token) = self.session.as_ref().map(|s| s.token)
            && self.ticker.due(now, token)
        {
            report.ticked = true;
            let (repainted, failed) = self.live_tick();
            report.live_repainted = repainted;
            report.repaint_failures += failed;
        }
        let video = self
            .session
            .as_ref()
            .is_some_and(|s| s.background.is_video());
        if video && let Some(player) = self.player.as_deref_mut() {
            report.watchdog = self.watchdog.poll(now, player);
        }
        report
    }

    /// Leave the current scene: stop the tick and watchdog, remove every overlay node and
    /// invalidate in-flight loads. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        self.teardown();
        if let Some(host) = self.host.as_mut() {
            self.background.remove_node(host.overlay.as_mut());
        }
        self.enter(RenderPhase::Idle);
    }

    /// Stop the tick and watchdog, then have each overlay-owning renderer remove its nodes.
    /// Nodes the host placed itself stay. The background video node is reconciled by the next
    /// background paint so its measured size survives a re-render of the same source.
    fn teardown(&mut self) {
        self.ticker.stop();
        self.watchdog.reset();
        self.focus.cleanup();
        let old = self.session.take();
        if let Some(host) = self.host.as_mut() {
            let overlay = host.overlay.as_mut();
            for e in old.iter().flat_map(|s| s.elements.iter()) {
                for id in renderer_for(e.kind()).overlay_ids(e) {
                    overlay.remove(&id);
                }
            }
        }
        if let Some(old) = old {
            self.last_token = self.last_token.max(old.token).next();
        }
    }

    /// Move focus and toggle the two affected focus rings. The raster is not touched.
    pub fn move_focus(&mut self, dir: Direction) -> bool {
        let before = self.focus.focused_element().map(|c| c.id.clone());
        if !self.focus.move_focus(dir) {
            return false;
        }
        let after = self.focus.focused_element().map(|c| c.id.clone());
        if let Some(host) = self.host.as_mut() {
            if let Some(id) = before {
                host.overlay.set_visible(&OverlayNode::focus_id(&id), false);
            }
            if let Some(id) = after {
                host.overlay.set_visible(&OverlayNode::focus_id(&id), true);
            }
        }
        true
    }

    /// Run the focused element's action against `host`.
    pub fn execute_focused(&mut self, host: &mut dyn ActionHost) -> StagecastResult<ActionOutcome> {
        let Some(focused) = self.focus.focused_element() else {
            return Ok(ActionOutcome::NothingFocused);
        };
        let Some(action) = focused.action.clone() else {
            tracing::debug!(element_id = %focused.id, "focused element has no action");
            return Ok(ActionOutcome::NoAction);
        };
        match action {
            ActionDef::LaunchApp { package } => {
                host.launch_app(&package)?;
                Ok(ActionOutcome::Launched(package))
            }
            ActionDef::Template { template_id } => {
                let link = self.store.link_context();
                let next = host.fetch_template(&template_id, &link)?;
                self.store.replace(next);
                self.render()?;
                Ok(ActionOutcome::TemplateRendered(template_id))
            }
            ActionDef::Url { url } => {
                host.open_url(&url)?;
                Ok(ActionOutcome::UrlLogged(url))
            }
        }
    }

    /// Attach the player behind the background video node for stall supervision.
    pub fn attach_background_player(&mut self, player: Box<dyn MediaPlayer>) {
        self.watchdog.reset();
        self.player = Some(player);
    }

    /// Intrinsic video size arrived: re-fit the background video node.
    pub fn on_background_video_metadata(&mut self, width: u32, height: u32) -> Option<Rect> {
        let host = self.host.as_mut()?;
        let size = host.size();
        self.background
            .on_video_metadata(host.overlay.as_mut(), size, width, height)
    }

    fn dispatch(&mut self, requests: Vec<LoadRequest>) {
        for req in requests {
            if !self.images.needs_request(&req.source, req.token) {
                continue;
            }
            tracing::debug!(source = %req.source, token = %req.token, "image load requested");
            self.images.mark_pending(&req.source, req.token);
            self.loader.request(req, self.done_tx.clone());
        }
    }

    fn apply_completion(&mut self, c: LoadCompletion, report: &mut PumpReport) {
        let LoadCompletion { request, result } = c;
        let current = self.session.as_ref().map(|s| s.token);
        if current != Some(request.token) {
            tracing::debug!(
                source = %request.source,
                token = %request.token,
                "stale load completion ignored"
            );
            report.stale += 1;
            return;
        }
        report.completions += 1;

        let handle = match result.and_then(|img| ImageHandle::from_decoded(&img)) {
            Ok(h) => Some(self.images.insert_ready(&request.source, h)),
            Err(err) => {
                tracing::warn!(source = %request.source, error = %err, "image load failed");
                self.images.mark_failed(&request.source, request.token);
                None
            }
        };

        match request.purpose {
            LoadPurpose::Background => {
                if let Some(s) = self.session.as_mut() {
                    s.background_image = handle;
                }
                self.paint_background();
                let failed = self.activate_elements();
                tracing::info!(token = %request.token, failed, "scene rendered after background load");
            }
            LoadPurpose::Element(_) => {
                if self.session.as_ref().is_some_and(|s| s.elements_rendered) {
                    report.repaint_failures += self.repaint_image_elements(&request.source);
                }
            }
        }
    }

    fn paint_background(&mut self) {
        let Self {
            host,
            scratch,
            session,
            background,
            ..
        } = self;
        let (Some(host), Some(session)) = (host.as_mut(), session.as_ref()) else {
            return;
        };
        if let Err(err) = background.render(
            &mut host.surface,
            scratch,
            &session.background,
            session.background_image.as_deref(),
            Some(host.overlay.as_mut()),
        ) {
            tracing::warn!(error = %err, "background paint failed");
        }
    }

    /// Full element pass, then focus and live tick setup. Returns the number of failed elements.
    fn activate_elements(&mut self) -> usize {
        self.enter(RenderPhase::RenderElements);
        let now = self.clock.now();
        let offset = self.display_offset(now);
        let tolerance = self.config.overlay_measure_tolerance_px;
        let padding = self.repaint_padding();

        let mut requests = Vec::new();
        let Self {
            host,
            scratch,
            text,
            images,
            session,
            focus,
            ..
        } = self;
        let (Some(host), Some(session)) = (host.as_mut(), session.as_mut()) else {
            return 0;
        };
        let mut ctx = RenderCtx {
            now,
            activated_at: session.activated_at,
            local_offset: offset,
            text,
            images: &*images,
            requests: Some(&mut requests),
            token: session.token,
        };
        let video = session.background.is_video();
        let failed = paint_elements(
            &mut ctx,
            host,
            scratch,
            &session.elements,
            video,
            tolerance,
            padding,
        );
        session.failed_elements = failed;
        session.elements_rendered = true;
        session.live = LiveElementSet::collect(&session.elements, padding, host.surface.bounds());

        if focus.initialize_navigation(&session.elements) > 0
            && let Some(first) = focus.focused_element()
        {
            host.overlay
                .set_visible(&OverlayNode::focus_id(&first.id), true);
        }

        let token = session.token;
        let live = !session.live.is_empty();
        self.dispatch(requests);

        self.enter(RenderPhase::ScheduleLiveTick);
        if live {
            self.ticker.start(token);
        }
        self.enter(RenderPhase::Idle);
        failed
    }

    /// Repaint the regions of the image elements showing `source`. Returns the failed repaints.
    fn repaint_image_elements(&mut self, source: &str) -> usize {
        let now = self.clock.now();
        let offset = self.display_offset(now);
        let padding = self.repaint_padding();
        let Self {
            host,
            scratch,
            text,
            images,
            session,
            background,
            ..
        } = self;
        let (Some(host), Some(session)) = (host.as_mut(), session.as_mut()) else {
            return 0;
        };
        let bounds = host.surface.bounds();
        let rects: Vec<PixelRect> = session
            .elements
            .iter()
            .filter(|e| e.kind() == ElementKind::Image && e.body.image_source().map(str::trim) == Some(source))
            .map(|e| paint_clip(e, padding, bounds))
            .filter(|r| !r.is_empty())
            .collect();
        let mut ctx = RenderCtx {
            now,
            activated_at: session.activated_at,
            local_offset: offset,
            text,
            images: &*images,
            requests: None,
            token: session.token,
        };
        let video = session.background.is_video();
        let mut failed = 0;
        for rect in rects {
            restore_background(background, host, scratch, session, rect);
            for e in session.elements.iter().filter(|e| {
                let k = e.kind();
                !k.is_overlay() && !(video && k.is_live())
            }) {
                let clip = paint_clip(e, padding, bounds).intersect(&rect);
                if clip.is_empty() {
                    continue;
                }
                let mut target = RasterTarget::new(&mut host.surface, scratch, clip, None);
                if render_isolated(&mut ctx, e, &mut target).is_err() {
                    failed += 1;
                }
            }
        }
        session.repaint_failures += failed;
        failed
    }

    /// Two-pass selective repaint of the live elements. Returns how many were updated and how
    /// many element repaints failed.
    fn live_tick(&mut self) -> (usize, usize) {
        let now = self.clock.now();
        let offset = self.display_offset(now);
        let tolerance = self.config.overlay_measure_tolerance_px;
        let Self {
            host,
            scratch,
            text,
            images,
            session,
            background,
            ..
        } = self;
        let (Some(host), Some(session)) = (host.as_mut(), session.as_mut()) else {
            return (0, 0);
        };
        if !session.elements_rendered {
            return (0, 0);
        }
        let mut ctx = RenderCtx {
            now,
            activated_at: session.activated_at,
            local_offset: offset,
            text,
            images: &*images,
            requests: None,
            token: session.token,
        };

        if session.background.is_video() {
            // Raster untouched; the live overlay nodes carry the text.
            let logical = host.size();
            let mut target =
                OverlayNodeTarget::new(host.overlay.as_mut(), logical, host.measured, tolerance);
            let mut n = 0;
            for e in session.elements.iter().filter(|e| e.kind().is_live()) {
                if let Some(node) = live_overlay_node(&ctx, e)
                    && target.place(node).is_ok()
                {
                    n += 1;
                }
            }
            return (n, 0);
        }

        let mut failed = 0;
        let plan = session.live.plan_repaint(&session.elements);
        for region in &plan {
            restore_background(background, host, scratch, session, region.rect);
            for &(i, clip) in &region.underlays {
                let mut target = RasterTarget::new(&mut host.surface, scratch, clip, None);
                if render_isolated(&mut ctx, &session.elements[i], &mut target).is_err() {
                    failed += 1;
                }
            }
        }
        for &(i, rect) in session.live.entries() {
            let mut target = RasterTarget::new(&mut host.surface, scratch, rect, None);
            if render_isolated(&mut ctx, &session.elements[i], &mut target).is_err() {
                failed += 1;
            }
        }
        session.repaint_failures += failed;
        (session.live.len(), failed)
    }

    fn repaint_padding(&self) -> i32 {
        i32::try_from(self.config.repaint_padding_px).unwrap_or(i32::MAX)
    }

    /// Opaque panel with a centred message, replacing whatever was on screen.
    fn draw_failure_panel(&mut self) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        host.overlay.clear();
        host.surface.fill(Rgba8Premul::black());
        let (w, h) = host.size();
        let pw = (f64::from(w) * 0.6).round().max(1.0);
        let ph = (f64::from(h) * 0.2).round().max(1.0);
        let panel = PixelRect::covering(Rect::from_center_size(
            (f64::from(w) / 2.0, f64::from(h) / 2.0),
            (pw, ph),
        ));
        host.surface
            .fill_rect(panel, Rgba8Premul::from_straight_rgba(0x5a, 0x16, 0x16, 0xff));

        let mut block = TextBlock::from_style(&StyleDef::default(), (ph * 0.3).max(8.0));
        block.align = TextAlign::Center;
        match self.text.shape(FAILURE_MESSAGE, block.style, Some(pw as f32)) {
            Ok(shaped) => {
                let area = panel.to_rect();
                let drawn = self.scratch.draw_onto(&mut host.surface, panel, &mut |vctx| {
                    draw_shaped(vctx, Affine::IDENTITY, &shaped, area, &block);
                });
                if let Err(err) = drawn {
                    tracing::warn!(error = %err, "failure message not drawn");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failure message not drawn"),
        }
    }
}

fn restore_background(
    background: &mut BackgroundRenderer,
    host: &mut HostSurface,
    scratch: &mut RasterScratch,
    session: &RenderSession,
    rect: PixelRect,
) {
    if let Err(err) = background.restore_rect(
        &mut host.surface,
        scratch,
        &session.background,
        session.background_image.as_deref(),
        rect,
    ) {
        tracing::warn!(error = %err, ?rect, "background restore failed");
    }
}

/// One pass over the sorted elements, each through the target its kind needs.
///
/// Raster paint of an element is clipped to its padded bounds, the same rectangle a selective
/// repaint restores.
fn paint_elements(
    ctx: &mut RenderCtx<'_>,
    host: &mut HostSurface,
    scratch: &mut RasterScratch,
    elements: &[ElementDef],
    video_background: bool,
    tolerance: u32,
    padding: i32,
) -> usize {
    let logical = host.size();
    let bounds = host.surface.bounds();
    let mut failed = 0;
    for e in elements {
        let kind = e.kind();
        let result = if kind.is_overlay() || (video_background && kind.is_live()) {
            let mut target =
                OverlayNodeTarget::new(host.overlay.as_mut(), logical, host.measured, tolerance);
            if kind.is_live() {
                match live_overlay_node(ctx, e) {
                    Some(node) => target.place(node),
                    None => Ok(()),
                }
            } else {
                render_isolated(ctx, e, &mut target)
            }
        } else {
            let mut target = RasterTarget::new(
                &mut host.surface,
                scratch,
                paint_clip(e, padding, bounds),
                Some(host.overlay.as_mut()),
            );
            render_isolated(ctx, e, &mut target)
        };
        if result.is_err() {
            failed += 1;
        }
    }
    failed
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
