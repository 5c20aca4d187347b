//! The prelude is enough to embed a panel end to end.

use std::cell::Cell;
use std::rc::Rc;

use snapsheet::prelude::*;

#[test]
fn prelude_drives_a_panel() -> Result<()> {
    let viewport = Viewport::new(390.0, 1000.0)?;
    let mut panel = SnapPanel::new(SheetConfig::default(), viewport)?;
    let closed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&closed);
    panel.set_on_dismiss(move || flag.set(true));
    panel.set_visible(true);

    let list = Rc::new(ScrollViewport::new(2000.0, 600.0, panel::Overflow::Auto));
    let mut tracker = GestureTracker::default();
    for event in [
        PointerEvent::touch_start(0, 300.0),
        PointerEvent::touch_move(0, 800.0),
        PointerEvent::touch_end(),
    ] {
        if let Some(signal) = tracker.process(&event).signal {
            panel.handle_signal(signal, || ScrollOwner::from_region(&list));
        }
    }

    assert!(closed.get());
    assert!(!panel.visual().visible);
    Ok(())
}

#[test]
fn facade_error_labels_config_failures() {
    let err: Error = SheetConfig {
        close_threshold: 5.0,
        ..SheetConfig::default()
    }
    .validated()
    .expect_err("close threshold under drag floor")
    .into();
    assert_eq!(err.error_type(), "config");
    assert!(err.validation_errors().is_some_and(|e| !e.is_empty()));
}
