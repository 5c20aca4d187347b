#![forbid(unsafe_code)]

//! Ephemeral drag session.
//!
//! Created on start, destroyed on end or replacement. Holds the anchors
//! every move is measured against and the scroll owner resolved at start.

use snapsheet_core::PointerSource;

use crate::scroll_owner::ScrollOwner;

/// One live drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    id: u64,
    anchor_pointer_y: f64,
    anchor_height_px: f64,
    owner: ScrollOwner,
    source: Option<PointerSource>,
}

impl DragSession {
    #[must_use]
    pub fn new(
        id: u64,
        anchor_pointer_y: f64,
        anchor_height_px: f64,
        owner: ScrollOwner,
        source: Option<PointerSource>,
    ) -> Self {
        Self {
            id,
            anchor_pointer_y,
            anchor_height_px,
            owner,
            source,
        }
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn anchor_pointer_y(&self) -> f64 {
        self.anchor_pointer_y
    }

    #[inline]
    #[must_use]
    pub const fn anchor_height_px(&self) -> f64 {
        self.anchor_height_px
    }

    #[must_use]
    pub fn owner(&self) -> &ScrollOwner {
        &self.owner
    }

    #[must_use]
    pub const fn source(&self) -> Option<PointerSource> {
        self.source
    }

    /// Pointer travel since start. Positive is upward (screen y decreases).
    #[inline]
    #[must_use]
    pub fn delta_for(&self, pointer_y: f64) -> f64 {
        self.anchor_pointer_y - pointer_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_positive_upward() {
        let s = DragSession::new(1, 500.0, 600.0, ScrollOwner::none(), None);
        assert_eq!(s.delta_for(400.0), 100.0);
        assert_eq!(s.delta_for(650.0), -150.0);
        assert_eq!(s.delta_for(500.0), 0.0);
    }

    #[test]
    fn keeps_anchors() {
        let s = DragSession::new(
            7,
            320.0,
            480.0,
            ScrollOwner::none(),
            Some(PointerSource::Touch),
        );
        assert_eq!(s.id(), 7);
        assert_eq!(s.anchor_pointer_y(), 320.0);
        assert_eq!(s.anchor_height_px(), 480.0);
        assert_eq!(s.source(), Some(PointerSource::Touch));
        assert!(!s.owner().is_attached());
    }
}
