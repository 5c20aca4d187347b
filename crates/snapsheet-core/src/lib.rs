#![forbid(unsafe_code)]

//! Core: pointer events, viewport geometry, and gesture normalization.
//!
//! # Role in snapsheet
//! `snapsheet-core` is the input layer. Hosts translate their UI runtime's
//! touch and mouse callbacks into [`event::PointerEvent`] values and feed
//! them to a [`gesture::GestureTracker`], which emits one normalized
//! `Start → Move* → End` stream of [`gesture::DragSignal`]s.
//!
//! # How it fits in the system
//! `snapsheet-panel` consumes drag signals and owns all height and snapping
//! logic. Nothing in this crate knows about panel heights or snap points,
//! so it can be reused for any vertical drag surface.

pub mod event;
pub mod geometry;
pub mod gesture;

pub use event::{MouseButton, PointerEvent, PointerSource, TouchPoint};
pub use geometry::{Viewport, ViewportError};
pub use gesture::{
    DragSignal, GestureConfig, GestureDispatch, GestureIgnoredReason, GestureLogEntry,
    GestureOutcome, GesturePhase, GestureTracker,
};
