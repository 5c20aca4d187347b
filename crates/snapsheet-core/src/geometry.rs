#![forbid(unsafe_code)]

//! Viewport geometry and pixel/percent conversion.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Visible area of the host surface, in CSS pixels.
///
/// Panel heights are stored as a percentage of `height`; drag deltas arrive
/// in pixels. All conversions between the two go through this type.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawViewport"))]
pub struct Viewport {
    width: f64,
    height: f64,
}

impl Viewport {
    /// Create a viewport. Height must be finite and positive; width must be
    /// finite and non-negative.
    pub fn new(width: f64, height: f64) -> Result<Self, ViewportError> {
        if !height.is_finite() || height <= 0.0 {
            return Err(ViewportError::InvalidHeight { height });
        }
        if !width.is_finite() || width < 0.0 {
            return Err(ViewportError::InvalidWidth { width });
        }
        Ok(Self { width, height })
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Convert a pixel length to a percentage of the viewport height.
    #[inline]
    #[must_use]
    pub fn px_to_percent(&self, px: f64) -> f64 {
        px * 100.0 / self.height
    }

    /// Convert a percentage of the viewport height to pixels.
    #[inline]
    #[must_use]
    pub fn percent_to_px(&self, percent: f64) -> f64 {
        percent * self.height / 100.0
    }
}

impl Default for Viewport {
    /// A 390x844 portrait phone.
    fn default() -> Self {
        Self {
            width: 390.0,
            height: 844.0,
        }
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawViewport {
    #[serde(default)]
    width: f64,
    height: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawViewport> for Viewport {
    type Error = ViewportError;

    fn try_from(raw: RawViewport) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height)
    }
}

/// Viewport construction errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportError {
    InvalidHeight { height: f64 },
    InvalidWidth { width: f64 },
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHeight { height } => {
                write!(f, "viewport height must be finite and > 0 (got {height})")
            }
            Self::InvalidWidth { width } => {
                write!(f, "viewport width must be finite and >= 0 (got {width})")
            }
        }
    }
}

impl std::error::Error for ViewportError {}
