#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! Hosts translate whatever their UI runtime delivers (DOM touch/mouse
//! events, winit pointer events, scripted scenarios) into [`PointerEvent`]
//! values. The gesture tracker consumes these and produces the single
//! delta-based drag stream the panel understands.
//!
//! # Design Notes
//!
//! - Coordinates are CSS pixels relative to the viewport, origin top-left.
//! - Only the vertical coordinate drives the panel; `x` is carried for
//!   diagnostics and hit testing on the host side.
//! - Touch lists mirror `TouchEvent.touches`: the first entry is primary.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which device produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerSource {
    Touch,
    Mouse,
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MouseButton {
    /// Left button (or the only button).
    #[default]
    Primary,
    /// Right button.
    Secondary,
    /// Middle button / wheel press.
    Auxiliary,
}

/// One active touch point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TouchPoint {
    /// Host-assigned identifier, stable for the touch's lifetime.
    pub identifier: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub const fn new(identifier: u32, x: f64, y: f64) -> Self {
        Self { identifier, x, y }
    }
}

/// Raw pointer input delivered by the host.
///
/// Touch events carry the full list of touches still on the surface, as the
/// DOM does; `TouchEnd`/`TouchCancel` carry the touches that *remain*.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum PointerEvent {
    TouchStart {
        touches: Vec<TouchPoint>,
    },
    TouchMove {
        touches: Vec<TouchPoint>,
    },
    TouchEnd {
        #[cfg_attr(feature = "serde", serde(default))]
        remaining: Vec<TouchPoint>,
    },
    TouchCancel {
        #[cfg_attr(feature = "serde", serde(default))]
        remaining: Vec<TouchPoint>,
    },
    MouseDown {
        #[cfg_attr(feature = "serde", serde(default))]
        button: MouseButton,
        #[cfg_attr(feature = "serde", serde(default))]
        x: f64,
        y: f64,
    },
    MouseMove {
        #[cfg_attr(feature = "serde", serde(default))]
        x: f64,
        y: f64,
    },
    MouseUp {
        #[cfg_attr(feature = "serde", serde(default))]
        button: MouseButton,
    },
    /// The host lost pointer capture (e.g. `lostpointercapture`).
    LostPointerCapture,
    /// The window lost focus mid-gesture.
    Blur,
}

impl PointerEvent {
    /// Source device for this event, if it is device specific.
    #[must_use]
    pub const fn source(&self) -> Option<PointerSource> {
        match self {
            Self::TouchStart { .. }
            | Self::TouchMove { .. }
            | Self::TouchEnd { .. }
            | Self::TouchCancel { .. } => Some(PointerSource::Touch),
            Self::MouseDown { .. } | Self::MouseMove { .. } | Self::MouseUp { .. } => {
                Some(PointerSource::Mouse)
            }
            Self::LostPointerCapture | Self::Blur => None,
        }
    }

    /// Convenience constructor for a single-finger touch start.
    #[must_use]
    pub fn touch_start(identifier: u32, y: f64) -> Self {
        Self::TouchStart {
            touches: vec![TouchPoint::new(identifier, 0.0, y)],
        }
    }

    /// Convenience constructor for a single-finger touch move.
    #[must_use]
    pub fn touch_move(identifier: u32, y: f64) -> Self {
        Self::TouchMove {
            touches: vec![TouchPoint::new(identifier, 0.0, y)],
        }
    }

    /// Convenience constructor for the last finger lifting.
    #[must_use]
    pub fn touch_end() -> Self {
        Self::TouchEnd {
            remaining: Vec::new(),
        }
    }
}
