#![forbid(unsafe_code)]

//! Gesture tracking: normalizes touch and mouse input into one drag stream.
//!
//! [`GestureTracker`] is a stateful processor that converts raw
//! [`PointerEvent`]s into [`DragSignal`]s (`Start` → `Move`* → `End`),
//! regardless of the input device and of how many fingers are down.
//!
//! # State Machine
//!
//! ```text
//! Idle --(touch start | primary mouse down)--> Active
//! Active --(move of the tracked pointer)--> Active      emits Move
//! Active --(primary lifted | mouse up | capture lost | blur)--> Idle   emits End
//! Active --(new start)--> Active                         emits Start (replaced)
//! ```
//!
//! # Invariants
//!
//! 1. Every `Move` and `End` is preceded by a `Start` on the same stream.
//! 2. At most one stream is tracked; a new start replaces the old one
//!    (last-writer-wins) and is reported as [`GestureOutcome::Replaced`].
//! 3. Mouse move/up are only observed while a mouse stream is active, the
//!    equivalent of subscribing document listeners on start and dropping
//!    them on end.
//! 4. Only the primary touch (first in the start list) drives the stream.
//!
//! # Failure Modes
//!
//! Nothing here is fatal. Events that cannot be attributed to the active
//! stream are dropped and reported through [`GestureIgnoredReason`] in the
//! dispatch log, never as errors.

use tracing::{debug, trace};

use crate::event::{MouseButton, PointerEvent, PointerSource, TouchPoint};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tracker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureConfig {
    /// Mouse button that may begin a drag (default: primary).
    pub activation_button: MouseButton,
    /// Follow the primary touch by identifier. When false, the first touch
    /// in every list is treated as primary (for hosts without stable ids).
    pub follow_touch_identifier: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            activation_button: MouseButton::Primary,
            follow_touch_identifier: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Normalized drag signal consumed by the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragSignal {
    Start {
        pointer_y: f64,
        source: PointerSource,
    },
    Move {
        pointer_y: f64,
    },
    End,
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    MouseDown,
    MouseMove,
    MouseUp,
    LostPointerCapture,
    Blur,
}

impl GesturePhase {
    fn of(event: &PointerEvent) -> Self {
        match event {
            PointerEvent::TouchStart { .. } => Self::TouchStart,
            PointerEvent::TouchMove { .. } => Self::TouchMove,
            PointerEvent::TouchEnd { .. } => Self::TouchEnd,
            PointerEvent::TouchCancel { .. } => Self::TouchCancel,
            PointerEvent::MouseDown { .. } => Self::MouseDown,
            PointerEvent::MouseMove { .. } => Self::MouseMove,
            PointerEvent::MouseUp { .. } => Self::MouseUp,
            PointerEvent::LostPointerCapture => Self::LostPointerCapture,
            PointerEvent::Blur => Self::Blur,
        }
    }
}

/// Why an incoming event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureIgnoredReason {
    /// Move/end with no stream open (stale or hover event).
    NoActiveStream,
    /// Touch start/move carried no touches.
    EmptyTouchList,
    /// Mouse down with a button other than the activation button.
    ButtonNotAllowed,
    /// Event from a different device than the active stream.
    SourceMismatch,
    /// A secondary finger lifted while the primary is still down.
    PrimaryTouchStillDown,
    /// Coordinate was NaN or infinite.
    NonFiniteCoordinate,
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Forwarded,
    /// A start arrived while a stream was already open; the old stream was
    /// abandoned without an `End`.
    Replaced,
    Ignored(GestureIgnoredReason),
}

/// Structured log record for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureLogEntry {
    pub phase: GesturePhase,
    /// Stream sequence number the event was attributed to, if any.
    pub stream: Option<u64>,
    pub source: Option<PointerSource>,
    pub pointer_y: Option<f64>,
    pub outcome: GestureOutcome,
}

/// Result of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureDispatch {
    pub signal: Option<DragSignal>,
    pub log: GestureLogEntry,
}

impl GestureDispatch {
    fn ignored(phase: GesturePhase, reason: GestureIgnoredReason, pointer_y: Option<f64>) -> Self {
        debug!(?phase, ?reason, "gesture event ignored");
        Self {
            signal: None,
            log: GestureLogEntry {
                phase,
                stream: None,
                source: None,
                pointer_y,
                outcome: GestureOutcome::Ignored(reason),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// GestureTracker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveStream {
    id: u64,
    source: PointerSource,
    touch_id: Option<u32>,
}

/// Stateful normalizer from raw pointer events to [`DragSignal`]s.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    config: GestureConfig,
    active: Option<ActiveStream>,
    next_stream: u64,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureTracker {
    /// Create a tracker with the given configuration.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            active: None,
            next_stream: 1,
        }
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> GestureConfig {
        self.config
    }

    /// Whether a stream is currently open.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Device of the open stream, if any.
    #[must_use]
    pub fn active_source(&self) -> Option<PointerSource> {
        self.active.map(|a| a.source)
    }

    /// Drop any open stream without emitting `End`.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Process one raw event.
    pub fn process(&mut self, event: &PointerEvent) -> GestureDispatch {
        let phase = GesturePhase::of(event);
        match event {
            PointerEvent::TouchStart { touches } => {
                let Some(primary) = touches.first() else {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::EmptyTouchList,
                        None,
                    );
                };
                self.open(phase, PointerSource::Touch, Some(primary.identifier), primary.y)
            }
            PointerEvent::TouchMove { touches } => {
                let Some(active) = self.active else {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::NoActiveStream,
                        touches.first().map(|t| t.y),
                    );
                };
                if active.source != PointerSource::Touch {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::SourceMismatch,
                        touches.first().map(|t| t.y),
                    );
                }
                let Some(primary) = self.primary_touch(active, touches) else {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::EmptyTouchList,
                        None,
                    );
                };
                self.forward_move(phase, active, primary.y)
            }
            PointerEvent::TouchEnd { remaining } | PointerEvent::TouchCancel { remaining } => {
                let Some(active) = self.active else {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::NoActiveStream,
                        None,
                    );
                };
                if active.source != PointerSource::Touch {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::SourceMismatch,
                        None,
                    );
                }
                if self.config.follow_touch_identifier
                    && let Some(id) = active.touch_id
                    && remaining.iter().any(|t| t.identifier == id)
                {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::PrimaryTouchStillDown,
                        None,
                    );
                }
                self.close(phase, active)
            }
            PointerEvent::MouseDown { button, y, .. } => {
                if *button != self.config.activation_button {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::ButtonNotAllowed,
                        Some(*y),
                    );
                }
                self.open(phase, PointerSource::Mouse, None, *y)
            }
            PointerEvent::MouseMove { y, .. } => {
                // Hover: no document-level listener is subscribed yet.
                let Some(active) = self.active else {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::NoActiveStream,
                        Some(*y),
                    );
                };
                if active.source != PointerSource::Mouse {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::SourceMismatch,
                        Some(*y),
                    );
                }
                self.forward_move(phase, active, *y)
            }
            PointerEvent::MouseUp { .. } => {
                let Some(active) = self.active else {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::NoActiveStream,
                        None,
                    );
                };
                if active.source != PointerSource::Mouse {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::SourceMismatch,
                        None,
                    );
                }
                self.close(phase, active)
            }
            PointerEvent::LostPointerCapture | PointerEvent::Blur => {
                let Some(active) = self.active else {
                    return GestureDispatch::ignored(
                        phase,
                        GestureIgnoredReason::NoActiveStream,
                        None,
                    );
                };
                self.close(phase, active)
            }
        }
    }

    fn primary_touch<'a>(
        &self,
        active: ActiveStream,
        touches: &'a [TouchPoint],
    ) -> Option<&'a TouchPoint> {
        if self.config.follow_touch_identifier
            && let Some(id) = active.touch_id
            && let Some(found) = touches.iter().find(|t| t.identifier == id)
        {
            return Some(found);
        }
        touches.first()
    }

    fn open(
        &mut self,
        phase: GesturePhase,
        source: PointerSource,
        touch_id: Option<u32>,
        pointer_y: f64,
    ) -> GestureDispatch {
        if !pointer_y.is_finite() {
            return GestureDispatch::ignored(
                phase,
                GestureIgnoredReason::NonFiniteCoordinate,
                None,
            );
        }
        let outcome = match self.active {
            Some(previous) => {
                debug!(
                    abandoned = previous.id,
                    ?source,
                    "gesture stream replaced before end"
                );
                GestureOutcome::Replaced
            }
            None => GestureOutcome::Forwarded,
        };
        let id = self.next_stream;
        self.next_stream = self.next_stream.saturating_add(1);
        self.active = Some(ActiveStream {
            id,
            source,
            touch_id,
        });
        trace!(stream = id, ?source, pointer_y, "gesture stream opened");
        GestureDispatch {
            signal: Some(DragSignal::Start { pointer_y, source }),
            log: GestureLogEntry {
                phase,
                stream: Some(id),
                source: Some(source),
                pointer_y: Some(pointer_y),
                outcome,
            },
        }
    }

    fn forward_move(
        &mut self,
        phase: GesturePhase,
        active: ActiveStream,
        pointer_y: f64,
    ) -> GestureDispatch {
        if !pointer_y.is_finite() {
            return GestureDispatch::ignored(
                phase,
                GestureIgnoredReason::NonFiniteCoordinate,
                None,
            );
        }
        GestureDispatch {
            signal: Some(DragSignal::Move { pointer_y }),
            log: GestureLogEntry {
                phase,
                stream: Some(active.id),
                source: Some(active.source),
                pointer_y: Some(pointer_y),
                outcome: GestureOutcome::Forwarded,
            },
        }
    }

    fn close(&mut self, phase: GesturePhase, active: ActiveStream) -> GestureDispatch {
        self.active = None;
        trace!(stream = active.id, ?phase, "gesture stream closed");
        GestureDispatch {
            signal: Some(DragSignal::End),
            log: GestureLogEntry {
                phase,
                stream: Some(active.id),
                source: Some(active.source),
                pointer_y: None,
                outcome: GestureOutcome::Forwarded,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse_down(y: f64) -> PointerEvent {
        PointerEvent::MouseDown {
            button: MouseButton::Primary,
            x: 0.0,
            y,
        }
    }

    fn mouse_move(y: f64) -> PointerEvent {
        PointerEvent::MouseMove { x: 0.0, y }
    }

    fn mouse_up() -> PointerEvent {
        PointerEvent::MouseUp {
            button: MouseButton::Primary,
        }
    }

    fn touches(points: &[(u32, f64)]) -> Vec<TouchPoint> {
        points
            .iter()
            .map(|&(id, y)| TouchPoint::new(id, 0.0, y))
            .collect()
    }

    #[test]
    fn touch_stream_start_move_end() {
        let mut gt = GestureTracker::default();

        let d = gt.process(&PointerEvent::touch_start(1, 500.0));
        assert_eq!(
            d.signal,
            Some(DragSignal::Start {
                pointer_y: 500.0,
                source: PointerSource::Touch
            })
        );
        assert_eq!(d.log.outcome, GestureOutcome::Forwarded);
        assert!(gt.is_active());

        let d = gt.process(&PointerEvent::touch_move(1, 420.0));
        assert_eq!(d.signal, Some(DragSignal::Move { pointer_y: 420.0 }));

        let d = gt.process(&PointerEvent::touch_end());
        assert_eq!(d.signal, Some(DragSignal::End));
        assert!(!gt.is_active());
    }

    #[test]
    fn move_after_end_is_stale() {
        let mut gt = GestureTracker::default();
        gt.process(&PointerEvent::touch_start(1, 500.0));
        gt.process(&PointerEvent::touch_end());

        let d = gt.process(&PointerEvent::touch_move(1, 300.0));
        assert_eq!(d.signal, None);
        assert_eq!(
            d.log.outcome,
            GestureOutcome::Ignored(GestureIgnoredReason::NoActiveStream)
        );
    }

    #[test]
    fn only_primary_touch_drives_the_stream() {
        let mut gt = GestureTracker::default();
        gt.process(&PointerEvent::TouchStart {
            touches: touches(&[(7, 400.0), (8, 100.0)]),
        });

        // Primary reported second: still followed by identifier.
        let d = gt.process(&PointerEvent::TouchMove {
            touches: touches(&[(8, 50.0), (7, 380.0)]),
        });
        assert_eq!(d.signal, Some(DragSignal::Move { pointer_y: 380.0 }));

        // Secondary lifts: primary still down, stream continues.
        let d = gt.process(&PointerEvent::TouchEnd {
            remaining: touches(&[(7, 380.0)]),
        });
        assert_eq!(d.signal, None);
        assert_eq!(
            d.log.outcome,
            GestureOutcome::Ignored(GestureIgnoredReason::PrimaryTouchStillDown)
        );
        assert!(gt.is_active());

        // Primary lifts while the secondary remains: stream ends.
        gt.process(&PointerEvent::TouchStart {
            touches: touches(&[(7, 380.0), (9, 10.0)]),
        });
        let d = gt.process(&PointerEvent::TouchEnd {
            remaining: touches(&[(9, 10.0)]),
        });
        assert_eq!(d.signal, Some(DragSignal::End));
    }

    #[test]
    fn first_touch_used_when_identifiers_not_followed() {
        let mut gt = GestureTracker::new(GestureConfig {
            follow_touch_identifier: false,
            ..GestureConfig::default()
        });
        gt.process(&PointerEvent::touch_start(1, 400.0));
        let d = gt.process(&PointerEvent::TouchMove {
            touches: touches(&[(2, 90.0), (1, 380.0)]),
        });
        assert_eq!(d.signal, Some(DragSignal::Move { pointer_y: 90.0 }));

        let d = gt.process(&PointerEvent::TouchCancel {
            remaining: touches(&[(1, 380.0)]),
        });
        assert_eq!(d.signal, Some(DragSignal::End));
    }

    #[test]
    fn empty_touch_start_is_ignored() {
        let mut gt = GestureTracker::default();
        let d = gt.process(&PointerEvent::TouchStart {
            touches: Vec::new(),
        });
        assert_eq!(
            d.log.outcome,
            GestureOutcome::Ignored(GestureIgnoredReason::EmptyTouchList)
        );
        assert!(!gt.is_active());
    }

    #[test]
    fn mouse_hover_is_not_a_drag() {
        let mut gt = GestureTracker::default();
        let d = gt.process(&mouse_move(200.0));
        assert_eq!(d.signal, None);
        assert_eq!(
            d.log.outcome,
            GestureOutcome::Ignored(GestureIgnoredReason::NoActiveStream)
        );
    }

    #[test]
    fn mouse_stream_start_move_end() {
        let mut gt = GestureTracker::default();
        let d = gt.process(&mouse_down(300.0));
        assert_eq!(
            d.signal,
            Some(DragSignal::Start {
                pointer_y: 300.0,
                source: PointerSource::Mouse
            })
        );
        assert_eq!(gt.active_source(), Some(PointerSource::Mouse));
        assert_eq!(
            gt.process(&mouse_move(250.0)).signal,
            Some(DragSignal::Move { pointer_y: 250.0 })
        );
        assert_eq!(gt.process(&mouse_up()).signal, Some(DragSignal::End));
        assert_eq!(gt.process(&mouse_up()).signal, None);
    }

    #[test]
    fn secondary_button_does_not_start() {
        let mut gt = GestureTracker::default();
        let d = gt.process(&PointerEvent::MouseDown {
            button: MouseButton::Secondary,
            x: 0.0,
            y: 10.0,
        });
        assert_eq!(
            d.log.outcome,
            GestureOutcome::Ignored(GestureIgnoredReason::ButtonNotAllowed)
        );
        assert!(!gt.is_active());
    }

    #[test]
    fn mouse_events_do_not_leak_into_touch_stream() {
        let mut gt = GestureTracker::default();
        gt.process(&PointerEvent::touch_start(1, 500.0));
        let d = gt.process(&mouse_move(100.0));
        assert_eq!(
            d.log.outcome,
            GestureOutcome::Ignored(GestureIgnoredReason::SourceMismatch)
        );
        let d = gt.process(&mouse_up());
        assert_eq!(
            d.log.outcome,
            GestureOutcome::Ignored(GestureIgnoredReason::SourceMismatch)
        );
        assert!(gt.is_active());
    }

    #[test]
    fn second_start_replaces_stream() {
        let mut gt = GestureTracker::default();
        let first = gt.process(&PointerEvent::touch_start(1, 500.0));
        let second = gt.process(&mouse_down(200.0));
        assert_eq!(second.log.outcome, GestureOutcome::Replaced);
        assert_ne!(first.log.stream, second.log.stream);
        assert_eq!(gt.active_source(), Some(PointerSource::Mouse));
    }

    #[test]
    fn capture_loss_and_blur_end_the_stream() {
        let mut gt = GestureTracker::default();
        gt.process(&mouse_down(300.0));
        let d = gt.process(&PointerEvent::LostPointerCapture);
        assert_eq!(d.signal, Some(DragSignal::End));
        assert_eq!(d.log.phase, GesturePhase::LostPointerCapture);

        gt.process(&PointerEvent::touch_start(2, 300.0));
        assert_eq!(
            gt.process(&PointerEvent::Blur).signal,
            Some(DragSignal::End)
        );
        assert_eq!(gt.process(&PointerEvent::Blur).signal, None);
    }

    #[test]
    fn non_finite_coordinates_are_dropped() {
        let mut gt = GestureTracker::default();
        let d = gt.process(&mouse_down(f64::NAN));
        assert_eq!(
            d.log.outcome,
            GestureOutcome::Ignored(GestureIgnoredReason::NonFiniteCoordinate)
        );
        assert!(!gt.is_active());

        gt.process(&mouse_down(10.0));
        let d = gt.process(&mouse_move(f64::INFINITY));
        assert_eq!(d.signal, None);
        assert!(gt.is_active());
    }

    #[test]
    fn reset_drops_stream_silently() {
        let mut gt = GestureTracker::default();
        gt.process(&PointerEvent::touch_start(1, 500.0));
        gt.reset();
        assert!(!gt.is_active());
        assert_eq!(gt.process(&PointerEvent::touch_end()).signal, None);
    }
}
