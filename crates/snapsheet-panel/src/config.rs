#![forbid(unsafe_code)]

//! Policy-as-data configuration for the snap panel.
//!
//! Every tunable of the controller lives in one [`SheetConfig`] that can be
//! loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # snapsheet.toml
//! snap_points = [60.0, 100.0]
//! open_height = 60.0
//! close_threshold = 15.0
//! scroll_top_tolerance = 0.0
//! ```
//!
//! ```rust,ignore
//! let config = SheetConfig::from_toml_file("snapsheet.toml")?.validated()?;
//! ```
//!
//! # Defaults
//!
//! `SheetConfig::default()` reproduces the product constants: snap points at
//! 60% and 100%, backdrop above 30%, dismissal below 15%, a 10% drag floor.

#[cfg(feature = "config-file")]
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Full-height snap point.
pub const SNAP_TOP: f64 = 100.0;
/// Peek snap point; also the height every open starts at.
pub const SNAP_MIDDLE: f64 = 60.0;
/// Backdrop is shown (and tappable) strictly above this height.
pub const BACKDROP_THRESHOLD: f64 = 30.0;
/// Releasing strictly below this height dismisses the panel.
pub const CLOSE_THRESHOLD: f64 = 15.0;
/// Drag never produces a height at or below this value.
pub const DRAG_FLOOR: f64 = 10.0;
/// Heights within this distance of the top snap point count as expanded.
pub const EXPANDED_TOLERANCE: f64 = 2.0;
/// Scroll offsets at or below this value count as "scrolled to top".
pub const SCROLL_TOP_TOLERANCE: f64 = 1.0;
/// Duration of the settle transition applied outside drags.
pub const SETTLE_DURATION_MS: u64 = 300;

/// Distance above the drag floor at which dragged heights are pinned.
pub const DRAG_FLOOR_MARGIN: f64 = 0.01;

/// Snap panel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Snap points in percent of viewport height, in tie-break priority
    /// order: on equal distance the earlier entry wins.
    pub snap_points: Vec<f64>,
    /// Height applied whenever the panel becomes visible.
    pub open_height: f64,
    pub backdrop_threshold: f64,
    pub close_threshold: f64,
    pub drag_floor: f64,
    pub expanded_tolerance: f64,
    pub scroll_top_tolerance: f64,
    pub settle_duration_ms: u64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            snap_points: vec![SNAP_MIDDLE, SNAP_TOP],
            open_height: SNAP_MIDDLE,
            backdrop_threshold: BACKDROP_THRESHOLD,
            close_threshold: CLOSE_THRESHOLD,
            drag_floor: DRAG_FLOOR,
            expanded_tolerance: EXPANDED_TOLERANCE,
            scroll_top_tolerance: SCROLL_TOP_TOLERANCE,
            settle_duration_ms: SETTLE_DURATION_MS,
        }
    }
}

impl SheetConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Highest configured snap point (the "expanded" position).
    #[must_use]
    pub fn top(&self) -> f64 {
        self.snap_points
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Whether `height` is exactly one of the configured snap points.
    #[must_use]
    pub fn is_snap_point(&self, height: f64) -> bool {
        self.snap_points.iter().any(|&p| p == height)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let scalars = [
            ("open_height", self.open_height),
            ("backdrop_threshold", self.backdrop_threshold),
            ("close_threshold", self.close_threshold),
            ("drag_floor", self.drag_floor),
            ("expanded_tolerance", self.expanded_tolerance),
            ("scroll_top_tolerance", self.scroll_top_tolerance),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                errors.push(format!("{name} must be finite, got {value}"));
            }
        }

        for (name, value) in [
            ("backdrop_threshold", self.backdrop_threshold),
            ("close_threshold", self.close_threshold),
            ("drag_floor", self.drag_floor),
        ] {
            if value.is_finite() && !(0.0..=100.0).contains(&value) {
                errors.push(format!("{name} must be in [0, 100], got {value}"));
            }
        }

        if self.snap_points.is_empty() {
            errors.push("snap_points must not be empty".into());
        }
        for &point in &self.snap_points {
            if !point.is_finite() || point <= self.close_threshold || point > 100.0 {
                errors.push(format!(
                    "snap point {point} must be in ({}, 100]",
                    self.close_threshold
                ));
            }
        }

        if !self.is_snap_point(self.open_height) {
            errors.push(format!(
                "open_height {} must be one of the snap points",
                self.open_height
            ));
        }

        if self.drag_floor + DRAG_FLOOR_MARGIN >= self.close_threshold {
            errors.push(format!(
                "close_threshold ({}) must exceed drag_floor ({}) by more than {DRAG_FLOOR_MARGIN}",
                self.close_threshold, self.drag_floor
            ));
        }

        if self.expanded_tolerance < 0.0 {
            errors.push(format!(
                "expanded_tolerance must be >= 0, got {}",
                self.expanded_tolerance
            ));
        }
        if self.scroll_top_tolerance < 0.0 {
            errors.push(format!(
                "scroll_top_tolerance must be >= 0, got {}",
                self.scroll_top_tolerance
            ));
        }

        errors
    }

    /// Consume the config, returning it only if [`validate`](Self::validate)
    /// reports no errors.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from loading or validating a [`SheetConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
