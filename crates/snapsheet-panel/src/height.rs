#![forbid(unsafe_code)]

//! Panel height state machine.
//!
//! Owns the panel height (percent of viewport height) and the dragging
//! flag. It is the only writer of either value.
//!
//! # Invariants
//!
//! 1. `height` is always within `[0, 100]`.
//! 2. Drag writes land in `(drag_floor, 100]`; a candidate at or below the
//!    floor is pinned `DRAG_FLOOR_MARGIN` above it, so the floor band is
//!    never a live height but a release from there always dismisses.
//! 3. Derived flags (`is_expanded`, `is_maximized`, `is_backdrop_visible`)
//!    are computed on read and never stored.

use snapsheet_core::Viewport;
use tracing::trace;

use crate::config::{DRAG_FLOOR_MARGIN, SheetConfig};

/// Thresholds the machine needs from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightLimits {
    pub top: f64,
    pub drag_floor: f64,
    pub expanded_tolerance: f64,
    pub backdrop_threshold: f64,
}

impl HeightLimits {
    #[must_use]
    pub fn from_config(config: &SheetConfig) -> Self {
        Self {
            top: config.top(),
            drag_floor: config.drag_floor,
            expanded_tolerance: config.expanded_tolerance,
            backdrop_threshold: config.backdrop_threshold,
        }
    }
}

impl Default for HeightLimits {
    fn default() -> Self {
        Self::from_config(&SheetConfig::default())
    }
}

/// Height state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMachine {
    height: f64,
    dragging: bool,
    limits: HeightLimits,
}

impl HeightMachine {
    /// Create a machine at `initial` (clamped to `[0, 100]`).
    #[must_use]
    pub fn new(limits: HeightLimits, initial: f64) -> Self {
        Self {
            height: clamp_percent(initial, 0.0),
            dragging: false,
            limits,
        }
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[inline]
    #[must_use]
    pub const fn limits(&self) -> HeightLimits {
        self.limits
    }

    /// At (or within tolerance of) the top snap point.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.height >= self.limits.top - self.limits.expanded_tolerance
    }

    /// At full viewport height.
    #[must_use]
    pub fn is_maximized(&self) -> bool {
        self.height >= 100.0
    }

    #[must_use]
    pub fn is_backdrop_visible(&self) -> bool {
        self.height > self.limits.backdrop_threshold
    }

    pub(crate) fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub(crate) fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Reset for a fresh open. Never restores a remembered height.
    pub fn reset_on_open(&mut self, open_height: f64) {
        self.dragging = false;
        self.height = clamp_percent(open_height, self.height);
    }

    /// Apply a drag delta.
    ///
    /// `anchor_px` is the panel's pixel height at drag start and `delta_px`
    /// the pointer travel since then (positive = upward). Returns the stored
    /// height. Non-finite candidates leave the height untouched.
    pub fn apply_delta(&mut self, anchor_px: f64, delta_px: f64, viewport: &Viewport) -> f64 {
        let candidate = viewport.px_to_percent(anchor_px + delta_px);
        if !candidate.is_finite() {
            return self.height;
        }
        let floor = self.limits.drag_floor + DRAG_FLOOR_MARGIN;
        let next = if candidate <= self.limits.drag_floor {
            floor
        } else {
            candidate.clamp(floor, 100.0)
        };
        trace!(candidate, height = next, "drag height applied");
        self.height = next;
        next
    }

    /// Commit a resolved snap point.
    pub fn commit(&mut self, point: f64) {
        self.height = clamp_percent(point, self.height);
    }

    /// Programmatic write, clamped to `[0, 100]`.
    pub fn set_height(&mut self, height: f64) -> f64 {
        self.height = clamp_percent(height, self.height);
        self.height
    }
}

/// Clamp to `[0, 100]`; NaN keeps `fallback`.
fn clamp_percent(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 100.0)
    }
}
