//! The event dispatch loop.
//!
//! ```text
//! loop {
//!     if !display.read_and_dispatch()? {
//!         display.sleep()?;
//!     }
//! }
//! ```
//!
//! One iteration runs deferred layouts, due timers and context flushes,
//! dispatches at most one native event, flushes repaints and drains the
//! deferred event queue. Cross-thread work runs only when none of that found
//! anything to do.

use std::time::Instant;

use meridian_core::Result;

use super::{Display, TimerKey};
use crate::event::{Event, EventType};
use crate::native::{
    NativeEventVisitor, NativeFocusEvent, NativeGeometryEvent, NativeKeyEvent, NativeMouseEvent,
};
use crate::widget::WidgetFlags;

impl Display {
    /// Run one iteration of the dispatch loop.
    ///
    /// Returns `false` when there was nothing to do, so the caller can
    /// [`sleep`](Self::sleep) instead of polling.
    #[tracing::instrument(skip(self), target = "meridian::display", level = "trace")]
    pub fn read_and_dispatch(&mut self) -> Result<bool> {
        self.check_device()?;

        let mut busy = self.run_deferred_layouts();
        busy |= self.run_timers();
        self.run_contexts();
        if let Some(native) = self.platform.next_event() {
            busy = true;
            native.accept(self);
            if !self.disposed {
                self.check_focus();
            }
        }
        if self.disposed {
            return Ok(true);
        }
        busy |= self.run_paint();
        busy |= self.run_deferred_events();
        if busy || self.disposed {
            return Ok(true);
        }
        Ok(self.run_async_messages(false))
    }

    /// Block until a native event, a wake or the next timer deadline.
    ///
    /// Returns immediately while deferred or cross-thread work is pending.
    pub fn sleep(&mut self) -> Result<bool> {
        self.check_device()?;
        if self.synchronizer.message_count() > 0
            || !self.pending_events.is_empty()
            || !self.pending_layouts.is_empty()
            || !self.pending_repaints.is_empty()
        {
            return Ok(true);
        }
        let timeout = self.timers.time_until_next(Instant::now());
        self.platform.wait_for_event(timeout);
        Ok(true)
    }

    /// Run queued cross-thread work: everything queued (`all`) or one item.
    pub(crate) fn run_async_messages(&mut self, all: bool) -> bool {
        let synchronizer = self.synchronizer.clone();
        synchronizer.run_async_messages(self, all, |display, message| display.report_error(&message))
    }

    /// Deliver `Layout` to each control that requested one, in request order.
    fn run_deferred_layouts(&mut self) -> bool {
        if self.pending_layouts.is_empty() {
            return false;
        }
        let pending = std::mem::take(&mut self.pending_layouts);
        for control in pending {
            let Some(node) = self.tree.get_mut(control) else {
                continue;
            };
            node.flags.remove(WidgetFlags::LAYOUT_NEEDED);
            let mut event = Event::new(EventType::Layout, control);
            self.send_event(control, &mut event);
            if self.disposed {
                break;
            }
        }
        true
    }

    fn run_timers(&mut self) -> bool {
        let fired = self.timers.process_expired(Instant::now());
        for key in &fired {
            match key {
                TimerKey::Hover => self.hover_timer_fired(),
                TimerKey::User(timer) => {
                    if let Some(callback) = self.timer_callbacks.get(*timer).cloned() {
                        self.run_guarded(|display| callback(display));
                    }
                }
            }
            if self.disposed {
                break;
            }
        }
        !fired.is_empty()
    }

    fn run_contexts(&mut self) {
        for control in std::mem::take(&mut self.pending_contexts) {
            if self.tree.contains(control) {
                self.platform.flush_context(control);
            }
        }
    }

    fn run_paint(&mut self) -> bool {
        if self.pending_repaints.is_empty() {
            return false;
        }
        for (control, rect) in std::mem::take(&mut self.pending_repaints) {
            if self.tree.contains(control) {
                self.platform.set_needs_display(control, rect);
            }
        }
        true
    }

    /// Deliver posted events in FIFO order, skipping disposed targets.
    fn run_deferred_events(&mut self) -> bool {
        let mut ran = false;
        while let Some(mut event) = self.pending_events.pop_front() {
            let widget = event.widget;
            if !self.tree.contains(widget) {
                continue;
            }
            ran = true;
            self.send_event(widget, &mut event);
            if event.event_type == EventType::DragDetect {
                self.drag_detect_delivered(widget, event.doit);
            }
            if self.disposed {
                break;
            }
        }
        ran
    }

    fn handle_focus(&mut self, event: NativeFocusEvent) {
        match event {
            NativeFocusEvent::WindowActivated(window) => self.window_activated(window),
            NativeFocusEvent::WindowDeactivated(window) => self.window_deactivated(window),
            NativeFocusEvent::ApplicationActivated => {
                tracing::debug!(target: "meridian::focus", "application activated");
                if let Some(window) = self.alive(self.platform.key_window()) {
                    self.window_activated(window);
                }
            }
            NativeFocusEvent::ApplicationDeactivated => {
                tracing::debug!(target: "meridian::focus", "application deactivated");
                if let Some(window) = self.alive(self.active_window) {
                    self.window_deactivated(window);
                }
                self.check_focus();
                self.hover.tracking = None;
                self.check_enter_exit(None, None);
            }
            // The responder is re-read at the end of the iteration.
            NativeFocusEvent::ResponderChanged(_) => {}
        }
    }
}

impl NativeEventVisitor for Display {
    fn visit_mouse(&mut self, event: NativeMouseEvent) {
        self.handle_mouse(event);
    }

    fn visit_key(&mut self, event: NativeKeyEvent) {
        self.handle_key(event);
    }

    fn visit_focus(&mut self, event: NativeFocusEvent) {
        self.handle_focus(event);
    }

    fn visit_geometry(&mut self, event: NativeGeometryEvent) {
        self.handle_geometry(event);
    }
}
