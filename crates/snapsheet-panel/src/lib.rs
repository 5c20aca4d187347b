#![forbid(unsafe_code)]

//! Snap panel: a draggable bottom sheet that snaps between discrete heights.
//!
//! # Role in snapsheet
//! `snapsheet-panel` owns every decision about panel height. It consumes
//! normalized [`DragSignal`](snapsheet_core::DragSignal)s (or direct
//! start/move/end calls), decides per move whether the delta resizes the
//! panel or belongs to nested scrolling content, and on release commits the
//! nearest snap point or dismisses.
//!
//! # Modules
//! - [`config`]: policy-as-data tunables and their loaders.
//! - [`scroll_owner`]: scroll regions, owner handles, and the delta gate.
//! - [`height`]: the clamped height state machine.
//! - [`snap`]: release-time resolution.
//! - [`session`]: per-drag anchors.
//! - [`panel`]: the composition root hosts talk to.

pub mod config;
pub mod height;
pub mod panel;
pub mod scroll_owner;
pub mod session;
pub mod snap;

pub use config::{
    BACKDROP_THRESHOLD, CLOSE_THRESHOLD, ConfigError, DRAG_FLOOR, SNAP_MIDDLE, SNAP_TOP,
    SheetConfig,
};
pub use height::{HeightLimits, HeightMachine};
pub use panel::{
    HeightTransition, MoveOutcome, PanelError, PanelIgnoredReason, ReleaseOutcome, SheetVisual,
    SignalOutcome, SnapPanel, StartOutcome,
};
pub use scroll_owner::{
    CedeReason, DeltaRoute, Overflow, RegionId, RegionTree, ScrollMetrics, ScrollOwner,
    ScrollRegion, ScrollViewport, find_scroll_owner, route_delta,
};
pub use session::DragSession;
pub use snap::{SnapResolver, SnapTarget};
