#![forbid(unsafe_code)]

//! Scroll ownership: who consumes vertical motion while the panel is
//! expanded.
//!
//! The panel hosts opaque content that may contain its own scrollable
//! regions. When the panel is expanded, an upward drag always scrolls
//! content, and a downward drag only resizes the panel once the owning
//! region is scrolled to its top.
//!
//! # Obtaining an owner
//!
//! - **Explicit handle** (preferred): content that knows which region it
//!   scrolls passes it via [`ScrollOwner::from_region`].
//! - **Tree walk**: hosts that retain a region hierarchy register it in a
//!   [`RegionTree`] and call [`RegionTree::scroll_owner_for`] with the
//!   hit-tested node, or run [`find_scroll_owner`] over an ancestor chain.
//!
//! Owners are resolved once per drag session and held weakly: the panel
//! only ever reads the region's scroll offset and never keeps it alive.
//!
//! # Failure Modes
//!
//! A missing owner, a non-scrollable target, or a region dropped mid-drag
//! all read as "scrolled to top", which always permits panel resize.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Region metrics
// ---------------------------------------------------------------------------

/// Overflow policy of a region on the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Auto,
    Scroll,
}

impl Overflow {
    /// Whether this policy lets the user scroll overflowing content.
    #[must_use]
    pub const fn permits_scrolling(self) -> bool {
        matches!(self, Self::Auto | Self::Scroll)
    }
}

/// Snapshot of a region's vertical scroll geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_offset: f64,
    pub content_height: f64,
    pub visible_height: f64,
    pub overflow: Overflow,
}

impl ScrollMetrics {
    /// Content overflows and the policy permits scrolling it.
    #[must_use]
    pub fn is_scrollable(&self) -> bool {
        self.overflow.permits_scrolling() && self.content_height > self.visible_height
    }

    /// Offset is at (or within `tolerance` of) the top.
    #[must_use]
    pub fn is_at_top(&self, tolerance: f64) -> bool {
        self.scroll_offset.is_nan() || self.scroll_offset <= tolerance
    }
}

/// Anything with a vertical scroll position the panel may need to consult.
pub trait ScrollRegion {
    fn metrics(&self) -> ScrollMetrics;
}

// ---------------------------------------------------------------------------
// ScrollViewport
// ---------------------------------------------------------------------------

/// Reference [`ScrollRegion`] with interior-mutable geometry.
///
/// Hosts that do not already have a region type can share one of these
/// (behind `Rc`) between the content that scrolls it and the panel.
#[derive(Debug, Default)]
pub struct ScrollViewport {
    scroll_offset: Cell<f64>,
    content_height: Cell<f64>,
    visible_height: Cell<f64>,
    overflow: Cell<Overflow>,
}

impl ScrollViewport {
    #[must_use]
    pub fn new(content_height: f64, visible_height: f64, overflow: Overflow) -> Self {
        Self {
            scroll_offset: Cell::new(0.0),
            content_height: Cell::new(content_height.max(0.0)),
            visible_height: Cell::new(visible_height.max(0.0)),
            overflow: Cell::new(overflow),
        }
    }

    /// Largest reachable offset.
    #[must_use]
    pub fn max_offset(&self) -> f64 {
        (self.content_height.get() - self.visible_height.get()).max(0.0)
    }

    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset.get()
    }

    /// Set the offset, clamped to `[0, max_offset]`. Returns the stored value.
    pub fn set_scroll_offset(&self, offset: f64) -> f64 {
        let clamped = if offset.is_nan() {
            self.scroll_offset.get()
        } else {
            offset.clamp(0.0, self.max_offset())
        };
        self.scroll_offset.set(clamped);
        clamped
    }

    pub fn scroll_by(&self, delta: f64) -> f64 {
        self.set_scroll_offset(self.scroll_offset.get() + delta)
    }

    pub fn set_content_height(&self, content_height: f64) {
        self.content_height.set(content_height.max(0.0));
        self.set_scroll_offset(self.scroll_offset.get());
    }

    pub fn set_visible_height(&self, visible_height: f64) {
        self.visible_height.set(visible_height.max(0.0));
        self.set_scroll_offset(self.scroll_offset.get());
    }

    pub fn set_overflow(&self, overflow: Overflow) {
        self.overflow.set(overflow);
    }
}

impl ScrollRegion for ScrollViewport {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_offset: self.scroll_offset.get(),
            content_height: self.content_height.get(),
            visible_height: self.visible_height.get(),
            overflow: self.overflow.get(),
        }
    }
}

// ---------------------------------------------------------------------------
// ScrollOwner
// ---------------------------------------------------------------------------

/// Weak handle to the region that owns a drag session's vertical motion.
#[derive(Clone, Default)]
pub struct ScrollOwner {
    region: Option<Weak<dyn ScrollRegion>>,
}

impl fmt::Debug for ScrollOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollOwner")
            .field("attached", &self.is_attached())
            .field("scroll_offset", &self.scroll_offset())
            .finish()
    }
}

impl ScrollOwner {
    /// No owner: the panel always resizes.
    #[must_use]
    pub const fn none() -> Self {
        Self { region: None }
    }

    /// Explicit capability handle supplied by hosted content.
    #[must_use]
    pub fn from_region<R: ScrollRegion + 'static>(region: &Rc<R>) -> Self {
        let weak: Weak<R> = Rc::downgrade(region);
        Self { region: Some(weak) }
    }

    /// Same as [`from_region`](Self::from_region) for an already-erased handle.
    #[must_use]
    pub fn from_dyn(region: &Rc<dyn ScrollRegion>) -> Self {
        Self {
            region: Some(Rc::downgrade(region)),
        }
    }

    /// Whether the owner still refers to a live region.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.region.as_ref().is_some_and(|w| w.strong_count() > 0)
    }

    /// Current offset of the owning region, if it is still alive.
    #[must_use]
    pub fn scroll_offset(&self) -> Option<f64> {
        self.region
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|region| region.metrics().scroll_offset)
    }

    /// Whether the owner is scrolled to its top. Missing owners always are.
    #[must_use]
    pub fn is_at_top(&self, tolerance: f64) -> bool {
        match self.region.as_ref().and_then(Weak::upgrade) {
            Some(region) => region.metrics().is_at_top(tolerance),
            None => true,
        }
    }
}

/// First scrollable region in `ancestors`, ordered from the hit target
/// outward and ending before the panel root.
pub fn find_scroll_owner<'a, I>(ancestors: I) -> ScrollOwner
where
    I: IntoIterator<Item = &'a Rc<dyn ScrollRegion>>,
{
    ancestors
        .into_iter()
        .find(|region| region.metrics().is_scrollable())
        .map_or_else(ScrollOwner::none, ScrollOwner::from_dyn)
}

// ---------------------------------------------------------------------------
// RegionTree
// ---------------------------------------------------------------------------

/// Index of a node in a [`RegionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(usize);

struct RegionNode {
    parent: Option<RegionId>,
    region: Option<Rc<dyn ScrollRegion>>,
}

/// Arena of content nodes with parent links, for hosts that resolve the
/// scroll owner by walking up from a hit-tested node.
///
/// Nodes without a region are plain containers and never own scrolling.
#[derive(Default)]
pub struct RegionTree {
    nodes: Vec<RegionNode>,
}

impl fmt::Debug for RegionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionTree")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl RegionTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a parentless node (typically the panel root).
    pub fn add_root(&mut self, region: Option<Rc<dyn ScrollRegion>>) -> RegionId {
        self.push(None, region)
    }

    /// Add a child of `parent`. Returns `None` if `parent` is unknown.
    pub fn add_child(
        &mut self,
        parent: RegionId,
        region: Option<Rc<dyn ScrollRegion>>,
    ) -> Option<RegionId> {
        if parent.0 >= self.nodes.len() {
            return None;
        }
        Some(self.push(Some(parent), region))
    }

    #[must_use]
    pub fn parent(&self, id: RegionId) -> Option<RegionId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Walk up from `hit` toward `root` (exclusive) and return the first
    /// scrollable region. Unknown ids and paths that never scroll yield no
    /// owner.
    #[must_use]
    pub fn scroll_owner_for(&self, hit: RegionId, root: RegionId) -> ScrollOwner {
        let mut cursor = Some(hit);
        while let Some(id) = cursor {
            if id == root {
                break;
            }
            let Some(node) = self.nodes.get(id.0) else {
                break;
            };
            if let Some(region) = &node.region
                && region.metrics().is_scrollable()
            {
                return ScrollOwner::from_dyn(region);
            }
            cursor = node.parent;
        }
        ScrollOwner::none()
    }

    fn push(&mut self, parent: Option<RegionId>, region: Option<Rc<dyn ScrollRegion>>) -> RegionId {
        let id = RegionId(self.nodes.len());
        self.nodes.push(RegionNode { parent, region });
        id
    }
}

// ---------------------------------------------------------------------------
// Delta routing
// ---------------------------------------------------------------------------

/// Why a delta was handed to content instead of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CedeReason {
    /// Expanded and dragging up: nothing left to grow, content scrolls.
    ExpandedUpward,
    /// Expanded, dragging down, and the owner has not reached its top.
    ContentNotAtTop,
}

/// Routing decision for one move delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaRoute {
    Resize,
    Cede(CedeReason),
}

/// Decide whether `delta` (positive = upward) resizes the panel.
///
/// Only an expanded panel ever cedes; otherwise every delta resizes.
#[must_use]
pub fn route_delta(delta: f64, expanded: bool, owner: &ScrollOwner, tolerance: f64) -> DeltaRoute {
    if !expanded {
        return DeltaRoute::Resize;
    }
    if delta > 0.0 {
        return DeltaRoute::Cede(CedeReason::ExpandedUpward);
    }
    if delta < 0.0 && !owner.is_at_top(tolerance) {
        return DeltaRoute::Cede(CedeReason::ContentNotAtTop);
    }
    DeltaRoute::Resize
}
