//! The overlay session: lifecycle owner and command router.
//!
//! A session owns the host window, the style state machine, the geometry
//! controller and the embedded surface. It is driven from a single UI context;
//! the only work that leaves that context is the handle lookup, which comes
//! back through [`OverlaySession::on_resolved`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::Error;
use crate::overlay::geometry::{GeometryController, Point, Rect};
use crate::overlay::platform::WindowStyler;
use crate::overlay::resolver::{CancelHandle, Resolution, cancellable, resolve_with};
use crate::overlay::style::{StyleMachine, StyleState};
use crate::overlay::surface::{EmbeddedSurface, SurfaceBackend, SurfacePolicy, SurfaceState};
use crate::overlay::window::OverlayWindow;
use crate::settings::OverlaySettings;

/// The native host window, as far as the session is concerned.
pub trait HostWindow: Send {
    fn set_rect(&mut self, rect: Rect) -> Result<(), Error>;
    fn close(&mut self) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Lifecycle {
    Initializing,
    Active,
    ClosingRequested,
    Closed,
}

/// Every input source (chrome, hotkey, tray) funnels into one of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayCommand {
    ToggleClickThrough,
    EnableClickThrough,
    DisableClickThrough,
    Close,
    MoveStart(Point),
    MoveDrag(Point),
    ResizeStart(Point),
    ResizeDrag(Point),
    DragEnd,
    ResetSize,
    StartSurface,
}

/// What a command changed, for the caller to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Geometry(Rect),
    Style(StyleState),
    /// No usable window handle (stale, or never styled); run [`OverlaySession::restyle`].
    NeedsResolve,
    SurfaceStarted,
    /// The chat surface could not be created; the session continues without it.
    SurfaceFailed(String),
    Closed,
}

/// A handle lookup to be driven on the async runtime.
pub struct StylingPass {
    pub generation: u64,
    pub future: Pin<Box<dyn Future<Output = Resolution> + Send>>,
}

pub struct Activation {
    pub styling: StylingPass,
    pub surface: Effect,
}

pub struct OverlaySession<H: HostWindow, B: SurfaceBackend> {
    settings: OverlaySettings,
    lifecycle: Lifecycle,
    geometry: GeometryController,
    style: StyleMachine,
    surface: EmbeddedSurface,
    host: Option<H>,
    backend: B,
    pending_resolve: Option<CancelHandle>,
    generation: u64,
    rearm_pending: bool,
}

impl<H: HostWindow, B: SurfaceBackend> OverlaySession<H, B> {
    /// Validates `settings` and creates the host window.
    ///
    /// Configuration errors are returned before `create_host` runs, so an
    /// invalid setup never puts a window on screen.
    pub fn initialize<F>(
        settings: OverlaySettings,
        styler: Arc<dyn WindowStyler>,
        backend: B,
        create_host: F,
    ) -> Result<Self, Error>
    where
        F: FnOnce(&OverlaySettings, Rect) -> Result<H, Error>,
    {
        let url = settings.validate()?;
        let rect = settings.initial_rect();
        let host = create_host(&settings, rect)?;
        info!(target: "chatlay::session", %url, ?rect, "host window created");

        Ok(Self {
            geometry: GeometryController::new(rect, settings.min_size()),
            style: StyleMachine::new(styler, settings.opacity),
            surface: EmbeddedSurface::new(url, settings.surface_insets()),
            settings,
            lifecycle: Lifecycle::Initializing,
            host: Some(host),
            backend,
            pending_resolve: None,
            generation: 0,
            rearm_pending: false,
        })
    }

    /// Moves to `Active`: schedules the delayed styling pass and, under the
    /// immediate policy, creates the chat surface. `None` unless initializing.
    pub fn activate(&mut self) -> Option<Activation> {
        if self.lifecycle != Lifecycle::Initializing {
            return None;
        }
        self.lifecycle = Lifecycle::Active;

        let styling = self.schedule_resolve(self.settings.startup_delay());
        let surface = match self.settings.surface_policy {
            SurfacePolicy::Immediate => self.start_surface(),
            SurfacePolicy::Deferred => {
                info!(target: "chatlay::session", "chat surface deferred until requested");
                Effect::None
            }
        };
        info!(target: "chatlay::session", "overlay active");
        Some(Activation { styling, surface })
    }

    /// Runs the resolver again right away, e.g. after a stale handle.
    pub fn restyle(&mut self) -> Option<StylingPass> {
        (self.lifecycle == Lifecycle::Active).then(|| self.schedule_resolve(Duration::ZERO))
    }

    /// Applies the result of a styling pass. Results from superseded or
    /// cancelled passes are ignored.
    pub fn on_resolved(&mut self, generation: u64, resolution: Resolution) -> Effect {
        if generation != self.generation || self.lifecycle != Lifecycle::Active {
            debug!(target: "chatlay::session", generation, ?resolution, "stale styling result");
            return Effect::None;
        }
        match resolution {
            Resolution::Cancelled => Effect::None,
            Resolution::NotFound => {
                self.pending_resolve = None;
                let err = Error::HandleNotFound(self.settings.title.clone());
                warn!(target: "chatlay::session", "{}, continuing without styling", err);
                Effect::None
            }
            Resolution::Found(handle) => {
                self.pending_resolve = None;
                match self.style.attach(handle) {
                    Ok(state) => {
                        let rearmed = self.try_rearm();
                        Effect::Style(rearmed.unwrap_or(state))
                    }
                    Err(e) => {
                        warn!(target: "chatlay::session", "failed to style overlay window: {}", e);
                        Effect::None
                    }
                }
            }
        }
    }

    pub fn dispatch(&mut self, command: OverlayCommand) -> Effect {
        if command != OverlayCommand::Close && self.lifecycle != Lifecycle::Active {
            debug!(target: "chatlay::session", ?command, lifecycle = ?self.lifecycle, "command ignored");
            return Effect::None;
        }

        let mode = self.style.input_mode();
        let previous = self.geometry.rect();
        match command {
            OverlayCommand::ToggleClickThrough => {
                let result = self.style.toggle();
                self.on_style(result)
            }
            OverlayCommand::EnableClickThrough => {
                let result = self.style.enable_click_through();
                self.on_style(result)
            }
            OverlayCommand::DisableClickThrough => {
                let result = self.style.disable_click_through();
                self.on_style(result)
            }
            OverlayCommand::MoveStart(pointer) => {
                self.geometry.begin_move(pointer, mode);
                Effect::None
            }
            OverlayCommand::ResizeStart(pointer) => {
                self.geometry.begin_resize(pointer, mode);
                Effect::None
            }
            OverlayCommand::MoveDrag(pointer) => {
                let changed = self.geometry.on_move_drag(pointer, mode);
                self.on_geometry(previous, changed)
            }
            OverlayCommand::ResizeDrag(pointer) => {
                let changed = self.geometry.on_resize_drag(pointer, mode);
                self.on_geometry(previous, changed)
            }
            OverlayCommand::DragEnd => {
                self.geometry.end_drag();
                Effect::None
            }
            OverlayCommand::ResetSize => {
                let changed = self.geometry.reset_size(self.settings.default_size());
                self.on_geometry(previous, changed)
            }
            OverlayCommand::StartSurface => self.start_surface(),
            OverlayCommand::Close => self.close(),
        }
    }

    /// Destroys the surface, then the host window. Safe in any state.
    pub fn close(&mut self) -> Effect {
        if matches!(
            self.lifecycle,
            Lifecycle::ClosingRequested | Lifecycle::Closed
        ) {
            return Effect::None;
        }
        self.lifecycle = Lifecycle::ClosingRequested;
        info!(target: "chatlay::session", "closing overlay");

        if let Some(pending) = self.pending_resolve.take() {
            pending.cancel();
        }
        self.generation += 1;

        self.surface.destroy(&mut self.backend);
        if let Some(mut host) = self.host.take() {
            if let Err(e) = host.close() {
                warn!(target: "chatlay::session", "failed to close host window: {}", e);
            }
        }

        self.lifecycle = Lifecycle::Closed;
        Effect::Closed
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn style_state(&self) -> StyleState {
        self.style.state()
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn rect(&self) -> Rect {
        self.geometry.rect()
    }

    pub fn surface_state(&self) -> SurfaceState {
        self.surface.state()
    }

    /// Rectangle currently held by the surface, when it exists.
    pub fn surface_rect(&self) -> Option<Rect> {
        self.surface.rect()
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn window(&self) -> OverlayWindow {
        OverlayWindow {
            rect: self.geometry.rect(),
            opacity: self.settings.opacity,
            click_through: self.style.click_through(),
            always_on_top: self.style.state() != StyleState::Unstyled,
            lifecycle: self.lifecycle,
            style: self.style.state(),
            surface: self.surface.state(),
            surface_rect: self.surface.rect(),
        }
    }

    fn schedule_resolve(&mut self, delay: Duration) -> StylingPass {
        if let Some(previous) = self.pending_resolve.take() {
            previous.cancel();
        }
        self.generation += 1;

        let lookup = resolve_with(
            self.style.styler(),
            self.settings.window_match(),
            self.settings.retry_policy(),
        );
        let (future, cancel) = cancellable(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            lookup.await
        });
        self.pending_resolve = Some(cancel);

        StylingPass {
            generation: self.generation,
            future: Box::pin(future),
        }
    }

    fn start_surface(&mut self) -> Effect {
        match self.surface.state() {
            SurfaceState::Creating | SurfaceState::Active | SurfaceState::Destroyed => {
                return Effect::None;
            }
            SurfaceState::Uncreated => {}
        }
        match self.surface.create(&mut self.backend, self.geometry.rect()) {
            Ok(()) => {
                self.rearm_pending = self.settings.click_through_on_surface;
                self.try_rearm();
                Effect::SurfaceStarted
            }
            Err(e) => {
                warn!(target: "chatlay::session", "continuing without chat surface: {}", e);
                Effect::SurfaceFailed(e.to_string())
            }
        }
    }

    /// Enables click-through once both the surface and the styling are ready,
    /// when configured to do so.
    fn try_rearm(&mut self) -> Option<StyleState> {
        if !self.rearm_pending || !self.surface.is_active() {
            return None;
        }
        match self.style.state() {
            StyleState::Unstyled => None,
            StyleState::ClickThrough => {
                self.rearm_pending = false;
                None
            }
            StyleState::Opaque => {
                self.rearm_pending = false;
                match self.style.enable_click_through() {
                    Ok(state) => Some(state),
                    Err(e) => {
                        warn!(target: "chatlay::session", "failed to re-arm click-through: {}", e);
                        None
                    }
                }
            }
        }
    }

    fn on_style(&mut self, result: Result<StyleState, Error>) -> Effect {
        match result {
            // No handle and no lookup running: the earlier pass failed or gave
            // up, so this request retries it.
            Ok(_) if self.style.handle().is_none() && self.pending_resolve.is_none() => {
                Effect::NeedsResolve
            }
            Ok(state) => {
                if state == StyleState::ClickThrough {
                    self.geometry.end_drag();
                }
                Effect::Style(state)
            }
            Err(Error::StaleHandle(handle)) => {
                warn!(target: "chatlay::session", handle, "overlay window handle went stale");
                Effect::NeedsResolve
            }
            Err(e) => {
                warn!(target: "chatlay::session", "style change failed: {}", e);
                Effect::None
            }
        }
    }

    fn on_geometry(&mut self, previous: Rect, changed: Option<Rect>) -> Effect {
        let Some(rect) = changed else {
            return Effect::None;
        };
        if let Some(host) = self.host.as_mut() {
            if let Err(e) = host.set_rect(rect) {
                warn!(target: "chatlay::session", "failed to move host window: {}", e);
                self.geometry.restore(previous);
                return Effect::None;
            }
        }
        if let Err(e) = self.surface.sync(&mut self.backend, rect) {
            warn!(target: "chatlay::session", "failed to resize chat surface: {}", e);
        }
        // Repositioning can drop the window below another topmost one.
        if let Err(e) = self.style.reassert_topmost() {
            debug!(target: "chatlay::session", "topmost not reasserted: {}", e);
        }
        Effect::Geometry(rect)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::ErrorKind;
    use crate::overlay::fakes::{FakeHost, FakeStyler, FakeSurface};
    use crate::overlay::geometry::Size;
    use crate::overlay::platform::{ExStyle, WindowHandle};

    const HWND: WindowHandle = WindowHandle(0xbeef);

    type Session = OverlaySession<FakeHost, FakeSurface>;

    fn settings() -> OverlaySettings {
        OverlaySettings {
            url: "https://example.com/chat".into(),
            x: 100.0,
            y: 100.0,
            width: 400.0,
            height: 600.0,
            chrome_height: 28.0,
            ..OverlaySettings::default()
        }
    }

    fn session_with(settings: OverlaySettings, styler: Arc<FakeStyler>, surface: FakeSurface) -> Session {
        Session::initialize(settings, styler, surface, |_, _| Ok(FakeHost::default())).unwrap()
    }

    async fn active_styled(settings: OverlaySettings) -> (Session, Arc<FakeStyler>) {
        let styler = FakeStyler::with_window("Chat Overlay", HWND);
        let mut session = session_with(settings, styler.clone(), FakeSurface::default());
        let activation = session.activate().unwrap();
        let resolution = activation.styling.future.await;
        session.on_resolved(activation.styling.generation, resolution);
        (session, styler)
    }

    fn host_pushes(session: &Session) -> usize {
        session.host().unwrap().log.lock().unwrap().rects.len()
    }

    #[test]
    fn invalid_url_aborts_before_any_window_exists() {
        let created = Cell::new(false);
        let result = Session::initialize(
            OverlaySettings {
                url: "not-a-url".into(),
                ..settings()
            },
            FakeStyler::new(),
            FakeSurface::default(),
            |_, _| {
                created.set(true);
                Ok(FakeHost::default())
            },
        );

        let err = result.err().expect("initialization must fail");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!created.get());
    }

    #[test]
    fn host_creation_failure_is_reported() {
        let result = Session::initialize(settings(), FakeStyler::new(), FakeSurface::default(), |_, _| {
            Err(Error::WindowCreation("overlay".into()))
        });
        assert_eq!(result.err().unwrap().kind(), ErrorKind::WindowCreation);
    }

    #[tokio::test(start_paused = true)]
    async fn valid_url_reaches_active_and_styles_after_delay() {
        let styler = FakeStyler::with_window("Chat Overlay", HWND);
        let mut session = session_with(settings(), styler.clone(), FakeSurface::default());
        assert_eq!(session.lifecycle(), Lifecycle::Initializing);

        let activation = session.activate().unwrap();
        assert_eq!(session.lifecycle(), Lifecycle::Active);
        assert_eq!(activation.surface, Effect::SurfaceStarted);
        assert_eq!(session.style_state(), StyleState::Unstyled);
        assert!(session.activate().is_none());

        let start = tokio::time::Instant::now();
        let resolution = activation.styling.future.await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert_eq!(resolution, Resolution::Found(HWND));

        let effect = session.on_resolved(activation.styling.generation, resolution);
        assert_eq!(effect, Effect::Style(StyleState::Opaque));
        assert!(styler.style(HWND).contains(ExStyle::LAYERED | ExStyle::TOPMOST));
        assert!(session.window().always_on_top);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_surface_is_sized_to_the_host() {
        let (session, _) = active_styled(settings()).await;

        let log = session.backend().log.lock().unwrap();
        assert_eq!(log.created.len(), 1);
        assert_eq!(log.created[0].0, "https://example.com/chat");
        assert_eq!(log.created[0].1, Rect::new(100.0, 128.0, 400.0, 572.0));
    }

    #[tokio::test(start_paused = true)]
    async fn move_drag_translates_the_surface_with_the_window() {
        let (mut session, _) = active_styled(settings()).await;
        let before = session.surface_rect().unwrap();

        session.dispatch(OverlayCommand::MoveStart(Point::new(150.0, 110.0)));
        let effect = session.dispatch(OverlayCommand::MoveDrag(Point::new(200.0, 90.0)));
        session.dispatch(OverlayCommand::DragEnd);

        assert_eq!(effect, Effect::Geometry(Rect::new(150.0, 80.0, 400.0, 600.0)));
        let after = session.surface_rect().unwrap();
        assert_eq!(after.x, before.x + 50.0);
        assert_eq!(after.y, before.y - 20.0);
        assert_eq!(after.size(), before.size());
        assert_eq!(
            session.backend().log.lock().unwrap().resized.last(),
            Some(&after)
        );
        assert_eq!(host_pushes(&session), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn click_through_freezes_geometry() {
        let (mut session, _) = active_styled(settings()).await;
        assert_eq!(
            session.dispatch(OverlayCommand::ToggleClickThrough),
            Effect::Style(StyleState::ClickThrough)
        );
        let before = session.rect();

        for command in [
            OverlayCommand::MoveStart(Point::new(0.0, 0.0)),
            OverlayCommand::MoveDrag(Point::new(80.0, 80.0)),
            OverlayCommand::DragEnd,
            OverlayCommand::ResizeStart(Point::new(0.0, 0.0)),
            OverlayCommand::ResizeDrag(Point::new(300.0, 300.0)),
        ] {
            assert_eq!(session.dispatch(command), Effect::None);
        }

        assert_eq!(session.rect(), before);
        assert_eq!(host_pushes(&session), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn enabling_click_through_mid_drag_ends_the_drag() {
        let (mut session, _) = active_styled(settings()).await;
        session.dispatch(OverlayCommand::MoveStart(Point::new(0.0, 0.0)));
        session.dispatch(OverlayCommand::EnableClickThrough);
        session.dispatch(OverlayCommand::DisableClickThrough);

        assert_eq!(
            session.dispatch(OverlayCommand::MoveDrag(Point::new(40.0, 40.0))),
            Effect::None
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resize_clamps_and_reset_restores_default() {
        let (mut session, _) = active_styled(settings()).await;

        session.dispatch(OverlayCommand::ResizeStart(Point::new(500.0, 700.0)));
        session.dispatch(OverlayCommand::ResizeDrag(Point::new(-1000.0, -1000.0)));
        assert_eq!(session.rect().size(), Size::new(250.0, 180.0));

        session.dispatch(OverlayCommand::ResetSize);
        assert_eq!(session.rect(), Rect::new(100.0, 100.0, 400.0, 600.0));
        assert_eq!(
            session.surface_rect(),
            Some(Rect::new(100.0, 128.0, 400.0, 572.0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn deferred_surface_waits_for_start_command() {
        let mut session = session_with(
            OverlaySettings {
                surface_policy: SurfacePolicy::Deferred,
                ..settings()
            },
            FakeStyler::new(),
            FakeSurface::default(),
        );

        let activation = session.activate().unwrap();
        assert_eq!(activation.surface, Effect::None);
        assert_eq!(session.surface_state(), SurfaceState::Uncreated);

        assert_eq!(
            session.dispatch(OverlayCommand::StartSurface),
            Effect::SurfaceStarted
        );
        assert_eq!(session.dispatch(OverlayCommand::StartSurface), Effect::None);
        assert_eq!(session.backend().log.lock().unwrap().created.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn surface_failure_degrades_to_chrome_only() {
        let mut session = session_with(settings(), FakeStyler::new(), FakeSurface::failing());

        let activation = session.activate().unwrap();
        assert!(matches!(activation.surface, Effect::SurfaceFailed(_)));
        assert_eq!(session.lifecycle(), Lifecycle::Active);
        assert_eq!(session.surface_state(), SurfaceState::Uncreated);

        session.dispatch(OverlayCommand::MoveStart(Point::new(0.0, 0.0)));
        assert!(matches!(
            session.dispatch(OverlayCommand::MoveDrag(Point::new(10.0, 10.0))),
            Effect::Geometry(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_window_leaves_session_usable() {
        let styler = FakeStyler::new();
        let mut session = session_with(settings(), styler.clone(), FakeSurface::default());

        let activation = session.activate().unwrap();
        let resolution = activation.styling.future.await;
        assert_eq!(resolution, Resolution::NotFound);
        assert_eq!(styler.find_calls(), 10);

        assert_eq!(
            session.on_resolved(activation.styling.generation, resolution),
            Effect::None
        );
        assert_eq!(session.lifecycle(), Lifecycle::Active);
        assert_eq!(
            session.dispatch(OverlayCommand::ToggleClickThrough),
            Effect::NeedsResolve
        );
        assert!(session.restyle().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_initial_styling_is_retried_on_toggle() {
        let styler = FakeStyler::with_window("Chat Overlay", HWND);
        styler.fail_styling(true);
        let mut session = session_with(settings(), styler.clone(), FakeSurface::default());

        let activation = session.activate().unwrap();
        let resolution = activation.styling.future.await;
        assert_eq!(resolution, Resolution::Found(HWND));
        assert_eq!(
            session.on_resolved(activation.styling.generation, resolution),
            Effect::None
        );
        assert_eq!(session.style_state(), StyleState::Unstyled);

        styler.fail_styling(false);
        assert_eq!(
            session.dispatch(OverlayCommand::ToggleClickThrough),
            Effect::NeedsResolve
        );
        let pass = session.restyle().unwrap();
        let resolution = pass.future.await;
        assert_eq!(
            session.on_resolved(pass.generation, resolution),
            Effect::Style(StyleState::Opaque)
        );

        assert_eq!(
            session.dispatch(OverlayCommand::ToggleClickThrough),
            Effect::Style(StyleState::ClickThrough)
        );
        assert!(styler.style(HWND).contains(ExStyle::TRANSPARENT));
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_while_lookup_is_pending_does_not_restart_it() {
        let styler = FakeStyler::with_window("Chat Overlay", HWND);
        let mut session = session_with(settings(), styler, FakeSurface::default());
        let _activation = session.activate().unwrap();

        assert_eq!(
            session.dispatch(OverlayCommand::ToggleClickThrough),
            Effect::Style(StyleState::Unstyled)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn refused_host_move_keeps_model_and_surface_in_place() {
        let (mut session, _) = active_styled(settings()).await;
        let rect = session.rect();
        let surface_rect = session.surface_rect();
        session.host().unwrap().log.lock().unwrap().fail_set_rect = true;

        session.dispatch(OverlayCommand::MoveStart(Point::new(150.0, 110.0)));
        let effect = session.dispatch(OverlayCommand::MoveDrag(Point::new(200.0, 90.0)));

        assert_eq!(effect, Effect::None);
        assert_eq!(session.rect(), rect);
        assert_eq!(session.surface_rect(), surface_rect);
        assert!(session.backend().log.lock().unwrap().resized.is_empty());

        session.host().unwrap().log.lock().unwrap().fail_set_rect = false;
        let effect = session.dispatch(OverlayCommand::MoveDrag(Point::new(200.0, 90.0)));
        assert_eq!(effect, Effect::Geometry(Rect::new(150.0, 80.0, 400.0, 600.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn geometry_changes_reassert_topmost() {
        let (mut session, styler) = active_styled(settings()).await;
        let before = styler.topmost_calls();

        session.dispatch(OverlayCommand::ResetSize);
        session.dispatch(OverlayCommand::ResizeStart(Point::new(0.0, 0.0)));
        session.dispatch(OverlayCommand::ResizeDrag(Point::new(40.0, 40.0)));

        assert_eq!(styler.topmost_calls(), before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn click_through_rearms_when_configured() {
        let (session, styler) = active_styled(OverlaySettings {
            click_through_on_surface: true,
            ..settings()
        })
        .await;

        assert_eq!(session.style_state(), StyleState::ClickThrough);
        assert!(styler.style(HWND).contains(ExStyle::TRANSPARENT));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_handle_triggers_a_new_resolve() {
        let (mut session, styler) = active_styled(settings()).await;

        styler.remove_window(HWND);
        assert_eq!(
            session.dispatch(OverlayCommand::ToggleClickThrough),
            Effect::NeedsResolve
        );

        let replacement = WindowHandle(0xcafe);
        styler.add_window("Chat Overlay", replacement);
        let pass = session.restyle().unwrap();
        let resolution = pass.future.await;
        assert_eq!(
            session.on_resolved(pass.generation, resolution),
            Effect::Style(StyleState::Opaque)
        );
        assert_eq!(
            session.dispatch(OverlayCommand::ToggleClickThrough),
            Effect::Style(StyleState::ClickThrough)
        );
        assert!(styler.style(replacement).contains(ExStyle::TRANSPARENT));
    }

    #[tokio::test(start_paused = true)]
    async fn close_cancels_pending_styling_and_tears_down_once() {
        let mut session = session_with(settings(), FakeStyler::new(), FakeSurface::default());
        let activation = session.activate().unwrap();
        let host_log = session.host().unwrap().log.clone();

        assert_eq!(session.dispatch(OverlayCommand::Close), Effect::Closed);
        assert_eq!(session.close(), Effect::None);
        assert_eq!(session.lifecycle(), Lifecycle::Closed);

        assert_eq!(activation.styling.future.await, Resolution::Cancelled);
        assert_eq!(session.backend().log.lock().unwrap().destroyed, 1);
        assert_eq!(host_log.lock().unwrap().closed, 1);
        assert!(session.host().is_none());

        assert_eq!(session.dispatch(OverlayCommand::ResetSize), Effect::None);
        assert_eq!(session.dispatch(OverlayCommand::StartSurface), Effect::None);
    }

    #[test]
    fn close_before_activation_is_safe() {
        let mut session = session_with(
            OverlaySettings {
                surface_policy: SurfacePolicy::Deferred,
                ..settings()
            },
            FakeStyler::new(),
            FakeSurface::default(),
        );

        assert_eq!(session.close(), Effect::Closed);
        assert_eq!(session.backend().log.lock().unwrap().destroyed, 0);
        assert!(session.activate().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_styling_results_are_ignored() {
        let styler = FakeStyler::with_window("Chat Overlay", HWND);
        let mut session = session_with(settings(), styler, FakeSurface::default());
        let first = session.activate().unwrap().styling;
        let second = session.restyle().unwrap();

        assert_eq!(first.future.await, Resolution::Cancelled);
        assert_eq!(
            session.on_resolved(first.generation, Resolution::Found(HWND)),
            Effect::None
        );
        assert_eq!(session.style_state(), StyleState::Unstyled);

        let resolution = second.future.await;
        assert_eq!(
            session.on_resolved(second.generation, resolution),
            Effect::Style(StyleState::Opaque)
        );
    }
}
