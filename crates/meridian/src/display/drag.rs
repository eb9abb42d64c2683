//! Drag-gesture detection.
//!
//! On a qualifying press the detector looks ahead in the native queue for
//! the release or for motion beyond the hysteresis. It inspects events where
//! they are queued, so normal handling still sees all of them in order.

use std::time::Instant;

use meridian_geometry::Point;

use super::Display;
use crate::event::{EventType, MouseButton};
use crate::native::{MouseEventKind, NativeEvent, NativeMouseEvent};
use crate::widget::{WidgetFlags, WidgetId};

#[derive(Debug, Default)]
pub(crate) struct DragState {
    /// Control whose gesture a `DragDetect` listener consumed; it gets no
    /// `MouseMove` until the button is released.
    pub(crate) consumed: Option<WidgetId>,
}

impl Display {
    /// Whether a press on `control` should run drag detection.
    pub(crate) fn wants_drag_detect(&self, control: WidgetId, event: &NativeMouseEvent) -> bool {
        event.button == Some(MouseButton::Left)
            && event.click_count == 1
            && self.tree.flags(control).contains(WidgetFlags::DRAG_DETECT)
            && (self.hooks_unchecked(control, EventType::DragDetect)
                || self.filters.hooks(EventType::DragDetect))
    }

    /// Look ahead from a press at `origin` (window coordinates) in `window`.
    ///
    /// Returns `true` once motion exceeds the hysteresis in either axis, or
    /// when the button stays down without further motion for the configured
    /// timeout; `false` when the button is released first.
    #[tracing::instrument(skip(self), target = "meridian::drag", level = "trace")]
    pub(crate) fn detect_drag(&mut self, window: WidgetId, origin: Point) -> bool {
        let hysteresis = self.config.drag_hysteresis;
        let timeout = self.config.drag_timeout;
        let filter = |event: &NativeEvent| {
            event.as_mouse().is_some_and(|mouse| {
                mouse.window == window
                    && matches!(mouse.kind, MouseEventKind::Up | MouseEventKind::Dragged)
            })
        };

        let mut inspected = 0;
        let mut deadline = Instant::now() + timeout;
        let detected = loop {
            let Some(event) = self.platform.peek_matching(&filter, inspected, deadline) else {
                break true;
            };
            inspected += 1;
            let Some(mouse) = event.as_mouse() else {
                continue;
            };
            match mouse.kind {
                MouseEventKind::Up => break false,
                MouseEventKind::Dragged => {
                    let dx = (mouse.location.x - origin.x).abs();
                    let dy = (mouse.location.y - origin.y).abs();
                    if dx > hysteresis || dy > hysteresis {
                        break true;
                    }
                    deadline = Instant::now() + timeout;
                }
                _ => {}
            }
        };

        tracing::debug!(target: "meridian::drag", ?window, detected, inspected, "drag look-ahead finished");
        detected
    }

    /// A `DragDetect` event was delivered to `control`.
    pub(crate) fn drag_detect_delivered(&mut self, control: WidgetId, doit: bool) {
        if !doit && self.hover.tracking == Some(control) {
            self.drag.consumed = Some(control);
        }
    }
}
