#![forbid(unsafe_code)]

//! snapsheet public facade crate.
//!
//! Re-exports the types a host needs to embed the snap panel and offers a
//! prelude for day-to-day usage.
//!
//! ```rust,ignore
//! use snapsheet::prelude::*;
//!
//! let viewport = Viewport::new(390.0, 844.0)?;
//! let mut panel = SnapPanel::new(SheetConfig::default(), viewport)?;
//! panel.set_on_dismiss(|| println!("closed"));
//! panel.set_visible(true);
//!
//! let mut tracker = GestureTracker::default();
//! if let Some(signal) = tracker.process(&PointerEvent::touch_start(0, 500.0)).signal {
//!     panel.handle_signal(signal, ScrollOwner::none);
//! }
//! ```

pub mod error;

pub use error::{Error, Result};

// --- Input re-exports -------------------------------------------------------

pub use snapsheet_core::{
    DragSignal, GestureConfig, GestureDispatch, GestureIgnoredReason, GestureLogEntry,
    GestureOutcome, GesturePhase, GestureTracker, MouseButton, PointerEvent, PointerSource,
    TouchPoint, Viewport, ViewportError,
};

// --- Panel re-exports -------------------------------------------------------

pub use snapsheet_panel::{
    CedeReason, ConfigError, HeightTransition, MoveOutcome, Overflow, PanelError,
    PanelIgnoredReason, RegionId, RegionTree, ReleaseOutcome, ScrollMetrics, ScrollOwner,
    ScrollRegion, ScrollViewport, SheetConfig, SheetVisual, SignalOutcome, SnapPanel,
    SnapResolver, SnapTarget, StartOutcome, find_scroll_owner,
};

// --- Prelude ----------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        DragSignal, Error, GestureTracker, PointerEvent, Result, ScrollOwner, ScrollRegion,
        ScrollViewport, SheetConfig, SheetVisual, SnapPanel, Viewport,
    };

    pub use crate::{core, panel};

    #[cfg(feature = "harness")]
    pub use crate::harness;
}

pub use snapsheet_core as core;
#[cfg(feature = "harness")]
pub use snapsheet_harness as harness;
pub use snapsheet_panel as panel;
