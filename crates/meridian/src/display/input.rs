//! Pointer and keyboard routing.

use meridian_geometry::Point;

use super::Display;
use crate::event::{Event, EventType, MouseButton};
use crate::native::{KeyEventKind, MouseEventKind, NativeKeyEvent, NativeMouseEvent};
use crate::widget::WidgetId;

impl Display {
    /// Whether input addressed to `window` may be delivered.
    fn accepts_input(&self, window: WidgetId) -> bool {
        self.tree.is_window(window) && !self.is_blocked_by_modal(window)
    }

    /// The enabled control under a window point.
    fn input_target(&self, window: WidgetId, location: Point) -> Option<WidgetId> {
        self.hit_test(window, location, false)
            .filter(|control| self.is_enabled_chain(*control))
    }

    pub(crate) fn handle_mouse(&mut self, event: NativeMouseEvent) {
        if !self.accepts_input(event.window) {
            return;
        }
        match event.kind {
            MouseEventKind::Moved | MouseEventKind::Dragged => self.mouse_motion(event),
            MouseEventKind::Down => self.mouse_down(event),
            MouseEventKind::Up => self.mouse_up(event),
            MouseEventKind::Exited => {
                if self.alive(self.hover.tracking).is_none() {
                    self.check_enter_exit(None, None);
                }
            }
        }
    }

    fn mouse_event(&self, event_type: EventType, control: WidgetId, native: &NativeMouseEvent) -> Event {
        let position = self.window_to_local(control, native.location);
        Event::new(event_type, control)
            .with_position(position)
            .with_button(native.button, native.click_count)
            .with_modifiers(native.modifiers)
    }

    fn mouse_motion(&mut self, native: NativeMouseEvent) {
        let window = native.window;
        let screen = self.window_to_screen(window, native.location);
        let hit = self.input_target(window, native.location);
        let grab = self.alive(self.hover.tracking);

        let hovered = match grab {
            Some(grab) => {
                let inside = self.tree.window_of(grab) == Some(window)
                    && self.tree.get(grab).is_some_and(|node| {
                        let local = native.location - self.tree.origin_in_window(grab);
                        node.positioned.bounds().contains(local)
                    });
                inside.then_some(grab)
            }
            None => hit,
        };
        self.check_enter_exit(hovered, Some(screen));

        let Some(target) = self.alive(grab.or(hit)) else {
            return;
        };
        if self.drag.consumed == Some(target) {
            return;
        }
        let mut event = self.mouse_event(EventType::MouseMove, target, &native);
        event.button = None;
        event.count = 0;
        self.send_event(target, &mut event);
    }

    fn mouse_down(&mut self, native: NativeMouseEvent) {
        let window = native.window;
        let Some(control) = self.input_target(window, native.location) else {
            return;
        };
        let screen = self.window_to_screen(window, native.location);
        self.check_enter_exit(Some(control), Some(screen));
        if !self.tree.contains(control) {
            return;
        }

        self.hover.tracking = Some(control);
        self.drag.consumed = None;
        if self.config.click_to_focus
            && native.button == Some(MouseButton::Left)
            && self.can_take_focus(control)
        {
            self.platform.make_first_responder(window, control);
        }

        let dragging = self.wants_drag_detect(control, &native) && self.detect_drag(window, native.location);

        let mut event = self.mouse_event(EventType::MouseDown, control, &native);
        self.send_event(control, &mut event);
        if native.click_count == 2 && self.tree.contains(control) {
            let mut event = self.mouse_event(EventType::MouseDoubleClick, control, &native);
            self.send_event(control, &mut event);
        }
        if dragging && self.tree.contains(control) {
            let event = self.mouse_event(EventType::DragDetect, control, &native);
            self.pending_events.push_back(event);
        }
    }

    fn mouse_up(&mut self, native: NativeMouseEvent) {
        let window = native.window;
        let target = self
            .alive(self.hover.tracking)
            .or_else(|| self.input_target(window, native.location));
        self.hover.tracking = None;
        self.drag.consumed = None;

        if let Some(target) = target {
            let mut event = self.mouse_event(EventType::MouseUp, target, &native);
            self.send_event(target, &mut event);
        }

        if self.tree.contains(window) {
            let hit = self.input_target(window, native.location);
            let screen = self.window_to_screen(window, native.location);
            self.check_enter_exit(hit, Some(screen));
        }
    }

    pub(crate) fn handle_key(&mut self, native: NativeKeyEvent) {
        let window = native.window;
        if !self.accepts_input(window) {
            return;
        }
        let target = self
            .alive(self.focus.control)
            .filter(|focus| self.tree.window_of(*focus) == Some(window))
            .unwrap_or(window);
        if !self.is_enabled_chain(target) {
            return;
        }

        let event_type = match native.kind {
            KeyEventKind::Down => {
                if let Some(action) = super::classify(native.key, native.modifiers)
                    && self.traverse_key(target, action, &native)
                {
                    return;
                }
                EventType::KeyDown
            }
            KeyEventKind::Up => EventType::KeyUp,
        };
        if !self.tree.contains(target) {
            return;
        }
        let mut event = Event::new(event_type, target)
            .with_key(native.key, native.character)
            .with_modifiers(native.modifiers);
        self.send_event(target, &mut event);
    }
}
