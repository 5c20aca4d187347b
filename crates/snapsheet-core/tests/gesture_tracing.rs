//! The tracker reports replaced and ignored input through `tracing`.

use std::sync::{Arc, Mutex};

use snapsheet_core::{GestureTracker, PointerEvent};
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

struct GestureLogCapture {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl<S> Layer<S> for GestureLogCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct MessageVisitor {
            message: Option<String>,
        }
        impl tracing::field::Visit for MessageVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_owned());
                }
            }
        }
        let mut visitor = MessageVisitor { message: None };
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            self.events
                .lock()
                .expect("capture lock")
                .push((*event.metadata().level(), message));
        }
    }
}

#[test]
fn replaced_and_ignored_events_are_logged() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(GestureLogCapture {
        events: Arc::clone(&events),
    });

    tracing::subscriber::with_default(subscriber, || {
        tracing::callsite::rebuild_interest_cache();
        let mut tracker = GestureTracker::default();
        tracker.process(&PointerEvent::MouseMove { x: 0.0, y: 10.0 });
        tracker.process(&PointerEvent::touch_start(0, 400.0));
        tracker.process(&PointerEvent::touch_start(1, 300.0));
        tracker.process(&PointerEvent::touch_end());
    });

    let events = events.lock().expect("capture lock");
    let has = |level: Level, message: &str| {
        events.iter().any(|(l, m)| *l == level && m == message)
    };
    assert!(has(Level::DEBUG, "gesture event ignored"), "{events:?}");
    assert!(has(Level::DEBUG, "gesture stream replaced before end"));
    assert!(has(Level::TRACE, "gesture stream opened"));
    assert!(has(Level::TRACE, "gesture stream closed"));
}
