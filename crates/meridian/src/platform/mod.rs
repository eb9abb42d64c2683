//! The seam between the core and a host windowing system.
//!
//! [`Platform`] lists the primitives the dispatch loop and trackers need:
//! a non-blocking event poll, a filtered look-ahead for drag detection,
//! responder and key-window control, and a waker for cross-thread requests.
//! Views are addressed by the [`WidgetId`] of the widget they back.

mod headless;
#[cfg(all(feature = "winit", not(any(target_arch = "wasm32", target_os = "ios"))))]
pub mod winit;

use std::sync::Arc;
use std::time::{Duration, Instant};

use cursor_icon::CursorIcon;
use meridian_core::Wake;
use meridian_geometry::Rect;

use crate::native::NativeEvent;
use crate::widget::WidgetId;

pub use headless::HeadlessPlatform;

/// Predicate selecting the events a look-ahead inspects.
pub type EventFilter<'a> = &'a dyn Fn(&NativeEvent) -> bool;

/// Primitives a windowing system adapter provides to the core.
pub trait Platform {
    /// Dequeue the next native event without blocking.
    fn next_event(&mut self) -> Option<NativeEvent>;

    /// The queued event that is the `skip`-th match of `filter`, counted
    /// from zero. Nothing is dequeued. Waits until `deadline` for it to arrive.
    fn peek_matching(
        &mut self,
        filter: EventFilter<'_>,
        skip: usize,
        deadline: Instant,
    ) -> Option<NativeEvent>;

    /// Block until an event is queued, a wake arrives or `timeout` passes.
    fn wait_for_event(&mut self, timeout: Option<Duration>);

    /// A handle other threads use to interrupt [`wait_for_event`](Self::wait_for_event).
    fn waker(&self) -> Arc<dyn Wake>;

    /// Create the native view backing a widget. Windows have no parent;
    /// their frame is in screen coordinates.
    fn create_view(&mut self, view: WidgetId, parent: Option<WidgetId>, frame: Rect);

    /// Destroy a native view.
    fn destroy_view(&mut self, view: WidgetId);

    /// Move or resize a native view.
    fn set_frame(&mut self, view: WidgetId, frame: Rect);

    /// Show or hide a native view.
    fn set_visible(&mut self, view: WidgetId, visible: bool);

    /// The view receiving key input in the key window, if the application is active.
    fn first_responder(&self) -> Option<WidgetId>;

    /// Route key input in `window` to `view`. Returns `false` if refused.
    fn make_first_responder(&mut self, window: WidgetId, view: WidgetId) -> bool;

    /// The window currently receiving key input.
    fn key_window(&self) -> Option<WidgetId>;

    /// Bring `window` to the front and make it key.
    fn make_key_and_order_front(&mut self, window: WidgetId);

    /// Whether the application is the active one.
    fn is_application_active(&self) -> bool;

    /// Change the pointer cursor.
    fn set_cursor(&mut self, cursor: CursorIcon);

    /// Mark part of a view, or all of it, as needing paint.
    fn set_needs_display(&mut self, view: WidgetId, rect: Option<Rect>);

    /// Flush a drawing context attached to a view.
    fn flush_context(&mut self, view: WidgetId);
}
