#![forbid(unsafe_code)]

//! Snap panel controller.
//!
//! [`SnapPanel`] composes the height machine, scroll ownership gate, and snap
//! resolver behind one event-driven API. Hosts either drive it directly with
//! [`start`](SnapPanel::start) / [`move_to`](SnapPanel::move_to) /
//! [`end`](SnapPanel::end), or feed it [`DragSignal`]s from a
//! [`GestureTracker`](snapsheet_core::GestureTracker) through
//! [`handle_signal`](SnapPanel::handle_signal).
//!
//! # Lifecycle
//!
//! ```text
//!  hidden ──set_visible(true)──▶ open @ open_height
//!    ▲                              │ start
//!    │                              ▼
//!    │ release < close_threshold  dragging ──move_to──▶ dragging
//!    └──────────── or backdrop tap  │ end
//!                                   ▼
//!                               open @ nearest snap point
//! ```
//!
//! Dismissal marks the panel logically closed. Late `end` calls and backdrop
//! taps are ignored until the host opens it again, so the dismiss callback
//! fires at most once per close.
//!
//! # Invariants
//!
//! 1. While dragging, `drag_floor < height <= 100`.
//! 2. While open and not dragging, height is a configured snap point.
//! 3. The scroll owner is only read, never mutated.
//! 4. Every input returns an outcome; malformed sequences are ignored, not
//!    errors.

use std::fmt;
use std::time::Duration;

use snapsheet_core::{DragSignal, PointerSource, Viewport};
use tracing::{debug, info};

use crate::config::{ConfigError, SheetConfig};
use crate::height::{HeightLimits, HeightMachine};
use crate::scroll_owner::{CedeReason, DeltaRoute, ScrollOwner, route_delta};
use crate::session::DragSession;
use crate::snap::{SnapResolver, SnapTarget};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why the panel dropped an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelIgnoredReason {
    /// The panel is hidden or was dismissed.
    NotVisible,
    /// Move or end without a live drag session.
    NoSession,
    /// Coordinate or pixel height was NaN or infinite.
    NonFiniteCoordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session was already live and has been abandoned without snapping.
    Replaced,
    Ignored(PanelIgnoredReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// Height was written (possibly unchanged after clamping).
    Resized { height: f64 },
    /// Delta belongs to the content's scroll region.
    Ceded(CedeReason),
    Ignored(PanelIgnoredReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    Snapped(f64),
    Dismissed,
    Ignored(PanelIgnoredReason),
}

/// Result of [`SnapPanel::handle_signal`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalOutcome {
    Start(StartOutcome),
    Move(MoveOutcome),
    Release(ReleaseOutcome),
}

// ---------------------------------------------------------------------------
// Visual state
// ---------------------------------------------------------------------------

/// How the host should apply a height change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightTransition {
    /// Follow the pointer with no animation.
    Immediate,
    /// Animate to the new height over `duration`.
    Settle { duration: Duration },
}

/// Outbound visual contract, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetVisual {
    pub visible: bool,
    /// Percent of viewport height.
    pub height: f64,
    pub backdrop_opacity: f64,
    /// Whether taps on the backdrop dismiss the panel.
    pub backdrop_interactive: bool,
    pub handle_visible: bool,
    pub square_corners: bool,
    pub content_scrollable: bool,
    pub dragging: bool,
    pub transition: HeightTransition,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from constructing a [`SnapPanel`].
#[derive(Debug)]
pub enum PanelError {
    Config(ConfigError),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid panel configuration: {e}"),
        }
    }
}

impl std::error::Error for PanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
        }
    }
}

impl From<ConfigError> for PanelError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

// ---------------------------------------------------------------------------
// SnapPanel
// ---------------------------------------------------------------------------

type DismissCallback = Box<dyn FnMut()>;

/// Gesture-driven snap panel.
///
/// Starts hidden; call [`set_visible(true)`](Self::set_visible) to open it.
pub struct SnapPanel {
    config: SheetConfig,
    viewport: Viewport,
    machine: HeightMachine,
    resolver: SnapResolver,
    visible: bool,
    session: Option<DragSession>,
    next_session: u64,
    on_dismiss: Option<DismissCallback>,
    dismiss_count: u64,
}

impl fmt::Debug for SnapPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapPanel")
            .field("viewport", &self.viewport)
            .field("height", &self.machine.height())
            .field("dragging", &self.machine.is_dragging())
            .field("visible", &self.visible)
            .field("session", &self.session)
            .field("has_on_dismiss", &self.on_dismiss.is_some())
            .field("dismiss_count", &self.dismiss_count)
            .finish()
    }
}

impl SnapPanel {
    /// Create a hidden panel. Fails if `config` does not validate.
    pub fn new(config: SheetConfig, viewport: Viewport) -> Result<Self, PanelError> {
        let config = config.validated()?;
        let machine = HeightMachine::new(HeightLimits::from_config(&config), config.open_height);
        let resolver = SnapResolver::from_config(&config);
        Ok(Self {
            config,
            viewport,
            machine,
            resolver,
            visible: false,
            session: None,
            next_session: 1,
            on_dismiss: None,
            dismiss_count: 0,
        })
    }

    /// Register the dismissal callback, replacing any previous one.
    pub fn set_on_dismiss(&mut self, callback: impl FnMut() + 'static) {
        self.on_dismiss = Some(Box::new(callback));
    }

    pub fn clear_on_dismiss(&mut self) {
        self.on_dismiss = None;
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub const fn height(&self) -> f64 {
        self.machine.height()
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.machine.is_dragging()
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.machine.is_expanded()
    }

    #[must_use]
    pub fn is_maximized(&self) -> bool {
        self.machine.is_maximized()
    }

    /// Backdrop shown. Always false while hidden.
    #[must_use]
    pub fn is_backdrop_visible(&self) -> bool {
        self.visible && self.machine.is_backdrop_visible()
    }

    /// Number of times the panel has dismissed itself.
    #[must_use]
    pub const fn dismiss_count(&self) -> u64 {
        self.dismiss_count
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    // -- Visibility ---------------------------------------------------------

    /// Apply the host's visibility. Opening always starts at `open_height`;
    /// hiding drops any live session without snapping or dismissing.
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        self.session = None;
        if visible {
            self.machine.reset_on_open(self.config.open_height);
            debug!(height = self.machine.height(), "panel opened");
        } else {
            self.machine.end_drag();
            debug!("panel hidden by host");
        }
    }

    /// Host resize. The committed percentage is kept; a live session keeps
    /// its pixel anchors.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        debug!(
            from = self.viewport.height(),
            to = viewport.height(),
            "viewport resized"
        );
        self.viewport = viewport;
    }

    // -- Drag session -------------------------------------------------------

    /// Open a drag session anchored at `pointer_y` with the panel currently
    /// `pixel_height` tall. `owner` is consulted on every move while expanded.
    pub fn start(&mut self, pointer_y: f64, pixel_height: f64, owner: ScrollOwner) -> StartOutcome {
        self.start_from(pointer_y, pixel_height, owner, None)
    }

    fn start_from(
        &mut self,
        pointer_y: f64,
        pixel_height: f64,
        owner: ScrollOwner,
        source: Option<PointerSource>,
    ) -> StartOutcome {
        if !self.visible {
            return ignored_start(PanelIgnoredReason::NotVisible);
        }
        if !pointer_y.is_finite() || !pixel_height.is_finite() {
            return ignored_start(PanelIgnoredReason::NonFiniteCoordinate);
        }

        let id = self.next_session;
        self.next_session = self.next_session.wrapping_add(1);
        let replaced = self.session.replace(DragSession::new(
            id,
            pointer_y,
            pixel_height,
            owner,
            source,
        ));
        self.machine.begin_drag();

        match replaced {
            Some(old) => {
                debug!(
                    abandoned = old.id(),
                    session = id,
                    "drag session replaced before release"
                );
                StartOutcome::Replaced
            }
            None => {
                debug!(session = id, pointer_y, pixel_height, "drag session started");
                StartOutcome::Started
            }
        }
    }

    /// Feed a pointer position to the live session.
    pub fn move_to(&mut self, pointer_y: f64) -> MoveOutcome {
        let Some(session) = self.session.as_ref() else {
            return ignored_move(PanelIgnoredReason::NoSession);
        };
        if !pointer_y.is_finite() {
            return ignored_move(PanelIgnoredReason::NonFiniteCoordinate);
        }

        let delta = session.delta_for(pointer_y);
        let route = route_delta(
            delta,
            self.machine.is_expanded(),
            session.owner(),
            self.config.scroll_top_tolerance,
        );
        match route {
            DeltaRoute::Cede(reason) => {
                debug!(session = session.id(), delta, ?reason, "delta ceded to content");
                MoveOutcome::Ceded(reason)
            }
            DeltaRoute::Resize => {
                let anchor = session.anchor_height_px();
                let height = self.machine.apply_delta(anchor, delta, &self.viewport);
                MoveOutcome::Resized { height }
            }
        }
    }

    /// Close the live session and resolve the release.
    pub fn end(&mut self) -> ReleaseOutcome {
        let Some(session) = self.session.take() else {
            debug!(reason = ?PanelIgnoredReason::NoSession, "release ignored");
            return ReleaseOutcome::Ignored(PanelIgnoredReason::NoSession);
        };
        self.machine.end_drag();

        let released_at = self.machine.height();
        match self.resolver.resolve(released_at) {
            SnapTarget::Point(point) => {
                self.machine.commit(point);
                info!(session = session.id(), released_at, point, "panel snapped");
                ReleaseOutcome::Snapped(point)
            }
            SnapTarget::Close => {
                info!(session = session.id(), released_at, "panel released below close threshold");
                self.dismiss();
                ReleaseOutcome::Dismissed
            }
        }
    }

    /// Route a normalized gesture signal. Start anchors at the panel's current
    /// pixel height.
    ///
    /// `resolve_owner` runs only for [`DragSignal::Start`]; the owner it
    /// returns is cached on the session and never re-resolved on later moves.
    pub fn handle_signal<F>(&mut self, signal: DragSignal, resolve_owner: F) -> SignalOutcome
    where
        F: FnOnce() -> ScrollOwner,
    {
        match signal {
            DragSignal::Start { pointer_y, source } => {
                let pixel_height = self.viewport.percent_to_px(self.machine.height());
                let owner = resolve_owner();
                SignalOutcome::Start(self.start_from(pointer_y, pixel_height, owner, Some(source)))
            }
            DragSignal::Move { pointer_y } => SignalOutcome::Move(self.move_to(pointer_y)),
            DragSignal::End => SignalOutcome::Release(self.end()),
        }
    }

    // -- Backdrop -----------------------------------------------------------

    /// Tap on the backdrop. Dismisses iff the backdrop is currently shown.
    pub fn tap_backdrop(&mut self) -> bool {
        if !self.is_backdrop_visible() {
            debug!(
                visible = self.visible,
                height = self.machine.height(),
                "backdrop tap ignored"
            );
            return false;
        }
        info!(height = self.machine.height(), "backdrop tapped");
        self.dismiss();
        true
    }

    // -- Programmatic -------------------------------------------------------

    /// Settle at a configured snap point. Ignored while hidden, while
    /// dragging, or for heights that are not snap points.
    pub fn snap_to(&mut self, point: f64) -> bool {
        if !self.visible || self.machine.is_dragging() || !self.config.is_snap_point(point) {
            debug!(
                point,
                visible = self.visible,
                dragging = self.machine.is_dragging(),
                "programmatic snap ignored"
            );
            return false;
        }
        self.machine.commit(point);
        true
    }

    /// Snap to the top point.
    pub fn expand(&mut self) -> bool {
        self.snap_to(self.config.top())
    }

    /// Snap back to the open height.
    pub fn collapse(&mut self) -> bool {
        self.snap_to(self.config.open_height)
    }

    // -- Visual -------------------------------------------------------------

    #[must_use]
    pub fn visual(&self) -> SheetVisual {
        let dragging = self.machine.is_dragging();
        let backdrop = self.is_backdrop_visible();
        let maximized = self.machine.is_maximized();
        SheetVisual {
            visible: self.visible,
            height: self.machine.height(),
            backdrop_opacity: if backdrop { 1.0 } else { 0.0 },
            backdrop_interactive: backdrop,
            handle_visible: !maximized,
            square_corners: maximized,
            content_scrollable: self.machine.is_expanded(),
            dragging,
            transition: if dragging {
                HeightTransition::Immediate
            } else {
                HeightTransition::Settle {
                    duration: Duration::from_millis(self.config.settle_duration_ms),
                }
            },
        }
    }

    fn dismiss(&mut self) {
        self.session = None;
        self.machine.end_drag();
        self.visible = false;
        self.dismiss_count += 1;
        info!(dismiss_count = self.dismiss_count, "panel dismissed");
        if let Some(callback) = self.on_dismiss.as_mut() {
            callback();
        }
    }
}

fn ignored_start(reason: PanelIgnoredReason) -> StartOutcome {
    debug!(?reason, "drag start ignored");
    StartOutcome::Ignored(reason)
}

fn ignored_move(reason: PanelIgnoredReason) -> MoveOutcome {
    debug!(?reason, "drag move ignored");
    MoveOutcome::Ignored(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn open_panel() -> SnapPanel {
        let vp = Viewport::new(400.0, 1000.0).expect("valid viewport");
        let mut panel = SnapPanel::new(SheetConfig::default(), vp).expect("default config");
        panel.set_visible(true);
        panel
    }

    #[test]
    fn starts_hidden_and_opens_at_middle() {
        let vp = Viewport::new(400.0, 1000.0).expect("valid viewport");
        let mut panel = SnapPanel::new(SheetConfig::default(), vp).expect("default config");
        assert!(!panel.is_visible());
        assert!(!panel.visual().backdrop_interactive);
        panel.set_visible(true);
        assert_eq!(panel.height(), 60.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let vp = Viewport::new(400.0, 1000.0).expect("valid viewport");
        let config = SheetConfig {
            snap_points: Vec::new(),
            ..SheetConfig::default()
        };
        let err = SnapPanel::new(config, vp).expect_err("empty snap points");
        assert!(err.to_string().starts_with("invalid panel configuration"));
    }

    #[test]
    fn drag_up_and_release_snaps_top() {
        let mut panel = open_panel();
        assert_eq!(panel.start(500.0, 600.0, ScrollOwner::none()), StartOutcome::Started);
        assert_eq!(panel.move_to(250.0), MoveOutcome::Resized { height: 85.0 });
        assert_eq!(panel.end(), ReleaseOutcome::Snapped(100.0));
        assert_eq!(panel.height(), 100.0);
        assert!(!panel.is_dragging());
    }

    #[test]
    fn move_without_session_is_ignored() {
        let mut panel = open_panel();
        assert_eq!(
            panel.move_to(100.0),
            MoveOutcome::Ignored(PanelIgnoredReason::NoSession)
        );
        assert_eq!(panel.height(), 60.0);
    }

    #[test]
    fn hidden_panel_ignores_start() {
        let vp = Viewport::new(400.0, 1000.0).expect("valid viewport");
        let mut panel = SnapPanel::new(SheetConfig::default(), vp).expect("default config");
        assert_eq!(
            panel.start(500.0, 600.0, ScrollOwner::none()),
            StartOutcome::Ignored(PanelIgnoredReason::NotVisible)
        );
    }

    #[test]
    fn non_finite_inputs_are_ignored() {
        let mut panel = open_panel();
        assert_eq!(
            panel.start(f64::NAN, 600.0, ScrollOwner::none()),
            StartOutcome::Ignored(PanelIgnoredReason::NonFiniteCoordinate)
        );
        panel.start(500.0, 600.0, ScrollOwner::none());
        assert_eq!(
            panel.move_to(f64::INFINITY),
            MoveOutcome::Ignored(PanelIgnoredReason::NonFiniteCoordinate)
        );
        assert_eq!(panel.height(), 60.0);
    }

    #[test]
    fn second_start_replaces_session() {
        let mut panel = open_panel();
        panel.start(500.0, 600.0, ScrollOwner::none());
        panel.move_to(400.0);
        assert_eq!(panel.height(), 70.0);
        assert_eq!(
            panel.start(300.0, 700.0, ScrollOwner::none()),
            StartOutcome::Replaced
        );
        assert_eq!(panel.session().map(DragSession::id), Some(2));
        // Replacement does not snap.
        assert_eq!(panel.height(), 70.0);
        assert!(panel.is_dragging());
    }

    #[test]
    fn release_in_dead_zone_dismisses_once() {
        let fired = Rc::new(Cell::new(0u32));
        let mut panel = open_panel();
        let counter = Rc::clone(&fired);
        panel.set_on_dismiss(move || counter.set(counter.get() + 1));

        panel.start(400.0, 600.0, ScrollOwner::none());
        panel.move_to(1000.0);
        assert_eq!(panel.end(), ReleaseOutcome::Dismissed);
        assert_eq!(panel.end(), ReleaseOutcome::Ignored(PanelIgnoredReason::NoSession));
        assert!(!panel.tap_backdrop());
        assert_eq!(fired.get(), 1);
        assert_eq!(panel.dismiss_count(), 1);
        assert!(!panel.is_visible());
    }

    #[test]
    fn backdrop_tap_requires_visible_backdrop() {
        let mut panel = open_panel();
        assert!(panel.tap_backdrop());
        assert_eq!(panel.dismiss_count(), 1);

        panel.set_visible(false);
        panel.set_visible(true);
        // Drag into the band where the backdrop is hidden, then tap.
        panel.start(400.0, 600.0, ScrollOwner::none());
        panel.move_to(750.0);
        assert_eq!(panel.height(), 25.0);
        assert!(!panel.tap_backdrop());
        assert_eq!(panel.dismiss_count(), 1);
    }

    #[test]
    fn programmatic_snaps_only_accept_snap_points() {
        let mut panel = open_panel();
        assert!(panel.expand());
        assert_eq!(panel.height(), 100.0);
        assert!(!panel.snap_to(85.0));
        assert!(panel.collapse());
        assert_eq!(panel.height(), 60.0);

        panel.start(500.0, 600.0, ScrollOwner::none());
        assert!(!panel.expand());
    }

    #[test]
    fn visual_tracks_height_and_drag() {
        let mut panel = open_panel();
        let v = panel.visual();
        assert_eq!(v.backdrop_opacity, 1.0);
        assert!(v.handle_visible);
        assert!(!v.square_corners);
        assert!(!v.content_scrollable);
        assert_eq!(
            v.transition,
            HeightTransition::Settle {
                duration: Duration::from_millis(300)
            }
        );

        panel.start(500.0, 600.0, ScrollOwner::none());
        assert_eq!(panel.visual().transition, HeightTransition::Immediate);
        panel.move_to(0.0);
        panel.end();

        let v = panel.visual();
        assert_eq!(v.height, 100.0);
        assert!(!v.handle_visible);
        assert!(v.square_corners);
        assert!(v.content_scrollable);
    }

    #[test]
    fn signals_anchor_at_current_height() {
        let mut panel = open_panel();
        let out = panel.handle_signal(
            DragSignal::Start {
                pointer_y: 400.0,
                source: PointerSource::Mouse,
            },
            ScrollOwner::none,
        );
        assert_eq!(out, SignalOutcome::Start(StartOutcome::Started));
        assert_eq!(panel.session().map(DragSession::anchor_height_px), Some(600.0));
        assert_eq!(
            panel.session().and_then(DragSession::source),
            Some(PointerSource::Mouse)
        );
        assert_eq!(
            panel.handle_signal(DragSignal::Move { pointer_y: 300.0 }, ScrollOwner::none),
            SignalOutcome::Move(MoveOutcome::Resized { height: 70.0 })
        );
        assert_eq!(
            panel.handle_signal(DragSignal::End, ScrollOwner::none),
            SignalOutcome::Release(ReleaseOutcome::Snapped(60.0))
        );
    }

    #[test]
    fn owner_resolves_once_per_drag() {
        let mut panel = open_panel();
        let calls = Cell::new(0u32);
        let resolve = || {
            calls.set(calls.get() + 1);
            ScrollOwner::none()
        };
        panel.handle_signal(
            DragSignal::Start {
                pointer_y: 500.0,
                source: PointerSource::Touch,
            },
            resolve,
        );
        panel.handle_signal(DragSignal::Move { pointer_y: 450.0 }, resolve);
        panel.handle_signal(DragSignal::Move { pointer_y: 400.0 }, resolve);
        panel.handle_signal(DragSignal::End, resolve);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn resize_keeps_percentage() {
        let mut panel = open_panel();
        panel.set_viewport(Viewport::new(400.0, 700.0).expect("valid viewport"));
        assert_eq!(panel.height(), 60.0);
        assert_eq!(panel.viewport().height(), 700.0);
    }

    #[test]
    fn hiding_drops_session_without_dismiss() {
        let mut panel = open_panel();
        panel.start(500.0, 600.0, ScrollOwner::none());
        panel.set_visible(false);
        assert!(panel.session().is_none());
        assert!(!panel.is_dragging());
        assert_eq!(panel.dismiss_count(), 0);
    }
}
