//! Enter/exit and hover tracking.

use std::time::Instant;

use cursor_icon::CursorIcon;
use meridian_core::Result;
use meridian_geometry::Point;

use super::{Display, TimerKey};
use crate::event::{Event, EventType};
use crate::widget::WidgetId;

#[derive(Debug, Default)]
pub(crate) struct HoverState {
    /// Control under the pointer.
    pub(crate) current: Option<WidgetId>,
    /// Control holding the pointer grab between press and release.
    pub(crate) tracking: Option<WidgetId>,
    /// Last pointer location in screen coordinates.
    pub(crate) location: Option<Point>,
    /// Cursor last pushed to the platform.
    pub(crate) cursor: Option<CursorIcon>,
}

impl Display {
    /// Make `target` the hovered control, synthesizing exit/enter as needed.
    pub(crate) fn check_enter_exit(&mut self, target: Option<WidgetId>, location: Option<Point>) {
        let target = self.alive(target);
        let previous = self.alive(self.hover.current);
        let changed = target != previous;
        if changed {
            tracing::debug!(target: "meridian::hover", ?previous, ?target, "hover transition");
            if let Some(previous) = previous {
                self.send_pointer_event(EventType::MouseExit, previous, location);
            }
            self.hover.current = target;
            if let Some(target) = self.alive(target) {
                self.send_pointer_event(EventType::MouseEnter, target, location);
            }
            self.update_cursor();
        }

        let moved = location != self.hover.location;
        self.hover.location = location;
        if changed || moved {
            if self.alive(self.hover.current).is_some() {
                self.timers
                    .schedule(TimerKey::Hover, self.config.hover_delay, Instant::now());
            } else {
                self.timers.cancel(TimerKey::Hover);
            }
        }
    }

    fn send_pointer_event(&mut self, event_type: EventType, control: WidgetId, location: Option<Point>) {
        let position = location
            .map(|location| self.screen_to_local(control, location))
            .unwrap_or_default();
        let mut event = Event::new(event_type, control).with_position(position);
        self.send_event(control, &mut event);
    }

    pub(crate) fn hover_timer_fired(&mut self) {
        if let Some(control) = self.alive(self.hover.current) {
            let location = self.hover.location;
            self.send_pointer_event(EventType::MouseHover, control, location);
        }
    }

    /// Push the hovered control's effective cursor to the platform if it changed.
    pub(crate) fn update_cursor(&mut self) {
        let cursor = self.effective_cursor_unchecked(self.alive(self.hover.current));
        if self.hover.cursor != Some(cursor) {
            self.hover.cursor = Some(cursor);
            self.platform.set_cursor(cursor);
        }
    }

    /// The control under the pointer.
    pub fn get_cursor_control(&self) -> Result<Option<WidgetId>> {
        self.check_device()?;
        Ok(self.alive(self.hover.current))
    }

    /// Last known pointer location in screen coordinates.
    pub fn get_cursor_location(&self) -> Result<Option<Point>> {
        self.check_device()?;
        Ok(self.hover.location)
    }
}
