//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use meridian::geometry::Rect;
use meridian::{Display, EventType, HeadlessPlatform, WidgetId, WindowConfig};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A display on a headless platform, plus the platform handle.
pub fn setup() -> (Display, HeadlessPlatform) {
    init_tracing();
    let platform = HeadlessPlatform::new();
    let display = Display::new(platform.clone());
    (display, platform)
}

/// An opened window at screen origin (100, 100).
pub fn open_window(display: &mut Display) -> WidgetId {
    let window = display
        .create_window(WindowConfig::new(Rect::new(100.0, 100.0, 400.0, 300.0)))
        .unwrap();
    display.open(window).unwrap();
    window
}

/// Run loop iterations until one finds nothing to do.
pub fn pump(display: &mut Display) {
    while display.read_and_dispatch().unwrap() {}
}

/// Records `(event type, widget)` pairs in delivery order.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<(EventType, WidgetId)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for each of `types` on `widget`.
    pub fn watch(&self, display: &mut Display, widget: WidgetId, types: &[EventType]) {
        for event_type in types {
            let events = self.events.clone();
            display
                .add_listener(widget, *event_type, move |_, event| {
                    events.borrow_mut().push((event.event_type, event.widget));
                    Ok(())
                })
                .unwrap();
        }
    }

    pub fn take(&self) -> Vec<(EventType, WidgetId)> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn count(&self, event_type: EventType, widget: WidgetId) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|entry| **entry == (event_type, widget))
            .count()
    }
}
