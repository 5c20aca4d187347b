#![forbid(unsafe_code)]

//! Deterministic scenario replay for the snap panel.
//!
//! A [`Scenario`] is a JSON document describing a viewport, configuration
//! overrides, named scroll regions, and a list of [`Step`]s. [`run_scenario`]
//! replays the steps through a [`GestureTracker`] into a [`SnapPanel`] and
//! records one [`Frame`] of visual state per step, plus an FNV-1a checksum
//! over the whole frame sequence for golden comparisons.
//!
//! ```json
//! {
//!   "viewport": { "width": 390, "height": 1000 },
//!   "regions": [
//!     { "name": "list", "content_height": 3000, "visible_height": 900, "overflow": "auto" }
//!   ],
//!   "steps": [
//!     { "op": "touch_start", "y": 500 },
//!     { "op": "touch_move", "y": 250 },
//!     { "op": "touch_end" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use snapsheet_core::{
    GestureOutcome, GestureTracker, MouseButton, PointerEvent, TouchPoint, Viewport, ViewportError,
};
use snapsheet_panel::{
    HeightTransition, MoveOutcome, Overflow, PanelError, ReleaseOutcome, ScrollOwner,
    ScrollViewport, SheetConfig, SignalOutcome, SnapPanel, StartOutcome,
};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Scenario model
// ---------------------------------------------------------------------------

/// A named scroll region hosted inside the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub name: String,
    pub content_height: f64,
    pub visible_height: f64,
    #[serde(default = "default_overflow")]
    pub overflow: Overflow,
    #[serde(default)]
    pub scroll_offset: f64,
}

fn default_overflow() -> Overflow {
    Overflow::Auto
}

const fn default_true() -> bool {
    true
}

/// One replayed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    TouchStart {
        y: f64,
        #[serde(default)]
        id: u32,
        /// Region under the finger, if any.
        #[serde(default)]
        region: Option<String>,
    },
    TouchMove {
        y: f64,
        #[serde(default)]
        id: u32,
    },
    TouchEnd,
    MouseDown {
        y: f64,
        #[serde(default)]
        button: MouseButton,
        #[serde(default)]
        region: Option<String>,
    },
    MouseMove {
        y: f64,
    },
    MouseUp,
    LostCapture,
    SetScroll {
        region: String,
        offset: f64,
    },
    SetVisible {
        visible: bool,
    },
    TapBackdrop,
    Resize {
        #[serde(default)]
        width: f64,
        height: f64,
    },
    SnapTo {
        point: f64,
    },
}

impl Step {
    /// Short label used in frames and logs.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::TouchStart { .. } => "touch_start",
            Self::TouchMove { .. } => "touch_move",
            Self::TouchEnd => "touch_end",
            Self::MouseDown { .. } => "mouse_down",
            Self::MouseMove { .. } => "mouse_move",
            Self::MouseUp => "mouse_up",
            Self::LostCapture => "lost_capture",
            Self::SetScroll { .. } => "set_scroll",
            Self::SetVisible { .. } => "set_visible",
            Self::TapBackdrop => "tap_backdrop",
            Self::Resize { .. } => "resize",
            Self::SnapTo { .. } => "snap_to",
        }
    }
}

/// Replayable scenario document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub viewport: Viewport,
    /// Overrides merged over [`SheetConfig::default`].
    #[serde(default)]
    pub config: SheetConfig,
    #[serde(default)]
    pub regions: Vec<RegionSpec>,
    /// Whether the panel is open before the first step.
    #[serde(default = "default_true")]
    pub initially_visible: bool,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json_str(s: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(s).map_err(ScenarioError::Parse)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ScenarioError::Io)?;
        Self::from_json_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Visual state after one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub step: usize,
    pub op: String,
    pub outcome: String,
    pub visible: bool,
    pub height: f64,
    pub dragging: bool,
    pub backdrop_opacity: f64,
    pub handle_visible: bool,
    pub square_corners: bool,
    pub content_scrollable: bool,
    /// Settle duration in milliseconds; 0 while following the pointer.
    pub transition_ms: u64,
    pub dismiss_count: u64,
}

/// Frames from one replay plus their checksum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub frames: Vec<Frame>,
    pub checksum: u64,
}

impl ScenarioRun {
    #[must_use]
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Checksum as the fixed-width hex string used in golden files.
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        format!("{:016x}", self.checksum)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ScenarioError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Viewport(ViewportError),
    Panel(PanelError),
    DuplicateRegion(String),
    UnknownRegion { step: usize, name: String },
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(e) => write!(f, "scenario parse error: {e}"),
            Self::Viewport(e) => write!(f, "invalid viewport: {e}"),
            Self::Panel(e) => write!(f, "{e}"),
            Self::DuplicateRegion(name) => write!(f, "region {name:?} declared twice"),
            Self::UnknownRegion { step, name } => {
                write!(f, "step {step} references unknown region {name:?}")
            }
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Viewport(e) => Some(e),
            Self::Panel(e) => Some(e),
            Self::DuplicateRegion(_) | Self::UnknownRegion { .. } => None,
        }
    }
}

impl From<PanelError> for ScenarioError {
    fn from(err: PanelError) -> Self {
        Self::Panel(err)
    }
}

impl From<ViewportError> for ScenarioError {
    fn from(err: ViewportError) -> Self {
        Self::Viewport(err)
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Replay `scenario` and collect one frame per step.
pub fn run_scenario(scenario: &Scenario) -> Result<ScenarioRun, ScenarioError> {
    let mut regions: HashMap<&str, Rc<ScrollViewport>> = HashMap::new();
    for spec in &scenario.regions {
        let region = Rc::new(ScrollViewport::new(
            spec.content_height,
            spec.visible_height,
            spec.overflow,
        ));
        region.set_scroll_offset(spec.scroll_offset);
        if regions.insert(spec.name.as_str(), region).is_some() {
            return Err(ScenarioError::DuplicateRegion(spec.name.clone()));
        }
    }

    let mut panel = SnapPanel::new(scenario.config.clone(), scenario.viewport)?;
    panel.set_visible(scenario.initially_visible);
    let mut tracker = GestureTracker::default();
    let mut frames = Vec::with_capacity(scenario.steps.len());

    info!(
        name = scenario.name.as_deref().unwrap_or("<unnamed>"),
        steps = scenario.steps.len(),
        "replaying scenario"
    );

    for (index, step) in scenario.steps.iter().enumerate() {
        let owner_for = |region: &Option<String>| -> Result<ScrollOwner, ScenarioError> {
            match region {
                None => Ok(ScrollOwner::none()),
                Some(name) => regions
                    .get(name.as_str())
                    .map(ScrollOwner::from_region)
                    .ok_or_else(|| ScenarioError::UnknownRegion {
                        step: index,
                        name: name.clone(),
                    }),
            }
        };

        let outcome = match step {
            Step::TouchStart { y, id, region } => {
                let owner = owner_for(region)?;
                let touches = vec![TouchPoint::new(*id, 0.0, *y)];
                pointer(&mut tracker, &mut panel, &PointerEvent::TouchStart { touches }, owner)
            }
            Step::TouchMove { y, id } => {
                let touches = vec![TouchPoint::new(*id, 0.0, *y)];
                pointer(
                    &mut tracker,
                    &mut panel,
                    &PointerEvent::TouchMove { touches },
                    ScrollOwner::none(),
                )
            }
            Step::TouchEnd => pointer(
                &mut tracker,
                &mut panel,
                &PointerEvent::TouchEnd {
                    remaining: Vec::new(),
                },
                ScrollOwner::none(),
            ),
            Step::MouseDown { y, button, region } => {
                let owner = owner_for(region)?;
                let event = PointerEvent::MouseDown {
                    button: *button,
                    x: 0.0,
                    y: *y,
                };
                pointer(&mut tracker, &mut panel, &event, owner)
            }
            Step::MouseMove { y } => pointer(
                &mut tracker,
                &mut panel,
                &PointerEvent::MouseMove { x: 0.0, y: *y },
                ScrollOwner::none(),
            ),
            Step::MouseUp => pointer(
                &mut tracker,
                &mut panel,
                &PointerEvent::MouseUp {
                    button: MouseButton::Primary,
                },
                ScrollOwner::none(),
            ),
            Step::LostCapture => pointer(
                &mut tracker,
                &mut panel,
                &PointerEvent::LostPointerCapture,
                ScrollOwner::none(),
            ),
            Step::SetScroll { region, offset } => {
                let Some(target) = regions.get(region.as_str()) else {
                    return Err(ScenarioError::UnknownRegion {
                        step: index,
                        name: region.clone(),
                    });
                };
                format!("scrolled:{}", target.set_scroll_offset(*offset))
            }
            Step::SetVisible { visible } => {
                panel.set_visible(*visible);
                if !*visible {
                    tracker.reset();
                }
                "applied".to_owned()
            }
            Step::TapBackdrop => {
                if panel.tap_backdrop() {
                    "dismissed".to_owned()
                } else {
                    "ignored".to_owned()
                }
            }
            Step::Resize { width, height } => {
                panel.set_viewport(Viewport::new(*width, *height)?);
                "applied".to_owned()
            }
            Step::SnapTo { point } => {
                if panel.snap_to(*point) {
                    format!("snapped:{point}")
                } else {
                    "ignored".to_owned()
                }
            }
        };

        let frame = capture(index, step, outcome, &panel);
        debug!(step = index, op = step.op(), outcome = %frame.outcome, height = frame.height, "step replayed");
        frames.push(frame);
    }

    let checksum = fnv1a_frames(&frames);
    Ok(ScenarioRun { frames, checksum })
}

fn pointer(
    tracker: &mut GestureTracker,
    panel: &mut SnapPanel,
    event: &PointerEvent,
    owner: ScrollOwner,
) -> String {
    let dispatch = tracker.process(event);
    match dispatch.signal {
        Some(signal) => outcome_label(panel.handle_signal(signal, || owner)),
        None => match dispatch.log.outcome {
            GestureOutcome::Ignored(reason) => format!("gesture_ignored:{reason:?}"),
            GestureOutcome::Forwarded | GestureOutcome::Replaced => "gesture_only".to_owned(),
        },
    }
}

fn outcome_label(outcome: SignalOutcome) -> String {
    match outcome {
        SignalOutcome::Start(StartOutcome::Started) => "started".to_owned(),
        SignalOutcome::Start(StartOutcome::Replaced) => "replaced".to_owned(),
        SignalOutcome::Start(StartOutcome::Ignored(reason))
        | SignalOutcome::Move(MoveOutcome::Ignored(reason))
        | SignalOutcome::Release(ReleaseOutcome::Ignored(reason)) => format!("ignored:{reason:?}"),
        SignalOutcome::Move(MoveOutcome::Resized { height }) => format!("resized:{height}"),
        SignalOutcome::Move(MoveOutcome::Ceded(reason)) => format!("ceded:{reason:?}"),
        SignalOutcome::Release(ReleaseOutcome::Snapped(point)) => format!("snapped:{point}"),
        SignalOutcome::Release(ReleaseOutcome::Dismissed) => "dismissed".to_owned(),
    }
}

fn capture(index: usize, step: &Step, outcome: String, panel: &SnapPanel) -> Frame {
    let visual = panel.visual();
    let transition_ms = match visual.transition {
        HeightTransition::Immediate => 0,
        HeightTransition::Settle { duration } => {
            u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
        }
    };
    Frame {
        step: index,
        op: step.op().to_owned(),
        outcome,
        visible: visual.visible,
        height: visual.height,
        dragging: visual.dragging,
        backdrop_opacity: visual.backdrop_opacity,
        handle_visible: visual.handle_visible,
        square_corners: visual.square_corners,
        content_scrollable: visual.content_scrollable,
        transition_ms,
        dismiss_count: panel.dismiss_count(),
    }
}

// ---------------------------------------------------------------------------
// FNV-1a checksum
// ---------------------------------------------------------------------------

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// FNV-1a over the state fields of every frame. Outcome labels are excluded
/// so the checksum only tracks what the host would render.
#[must_use]
pub fn fnv1a_frames(frames: &[Frame]) -> u64 {
    let mut hash = FNV_OFFSET;
    for frame in frames {
        let flags = u8::from(frame.visible)
            | (u8::from(frame.dragging) << 1)
            | (u8::from(frame.handle_visible) << 2)
            | (u8::from(frame.square_corners) << 3)
            | (u8::from(frame.content_scrollable) << 4);
        hash = fnv1a_bytes(hash, &frame.height.to_bits().to_le_bytes());
        hash = fnv1a_bytes(hash, &frame.backdrop_opacity.to_bits().to_le_bytes());
        hash = fnv1a_bytes(hash, &[flags]);
        hash = fnv1a_bytes(hash, &frame.transition_ms.to_le_bytes());
        hash = fnv1a_bytes(hash, &frame.dismiss_count.to_le_bytes());
    }
    hash
}
