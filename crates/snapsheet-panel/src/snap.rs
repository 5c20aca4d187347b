#![forbid(unsafe_code)]

//! Release-time snap resolution.
//!
//! Maps the height at the end of a drag to either a committed snap point or
//! a dismissal. Pure and synchronous; the panel applies the result.

use crate::config::SheetConfig;

/// Committed outcome of a release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapTarget {
    /// Settle at this height (one of the configured snap points).
    Point(f64),
    /// Dismiss the panel.
    Close,
}

/// Nearest-point resolver with a dismissal boundary.
///
/// Candidates are evaluated in order and a later candidate only wins when it
/// is strictly closer, so list order encodes tie-break priority. With the
/// default `[MIDDLE, TOP]` list an exact midpoint resolves to `MIDDLE`.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResolver {
    points: Vec<f64>,
    close_threshold: f64,
}

impl SnapResolver {
    #[must_use]
    pub fn new(points: Vec<f64>, close_threshold: f64) -> Self {
        Self {
            points,
            close_threshold,
        }
    }

    #[must_use]
    pub fn from_config(config: &SheetConfig) -> Self {
        Self::new(config.snap_points.clone(), config.close_threshold)
    }

    #[must_use]
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    #[must_use]
    pub const fn close_threshold(&self) -> f64 {
        self.close_threshold
    }

    /// Resolve a release at `height`.
    ///
    /// Heights strictly below the close threshold dismiss. Anything else
    /// (including NaN, which compares false everywhere) resolves to the
    /// first configured point, then to any strictly closer one.
    #[must_use]
    pub fn resolve(&self, height: f64) -> SnapTarget {
        if height < self.close_threshold {
            return SnapTarget::Close;
        }
        let mut points = self.points.iter().copied();
        let Some(first) = points.next() else {
            return SnapTarget::Close;
        };
        let mut best = first;
        let mut best_distance = (height - first).abs();
        for point in points {
            let distance = (height - point).abs();
            if distance < best_distance {
                best = point;
                best_distance = distance;
            }
        }
        SnapTarget::Point(best)
    }
}

impl Default for SnapResolver {
    fn default() -> Self {
        Self::from_config(&SheetConfig::default())
    }
}
