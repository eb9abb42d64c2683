//! An in-memory platform adapter.
//!
//! `HeadlessPlatform` behaves like a well-mannered windowing system without
//! drawing anything. Clones share state, so a test or an embedder can keep a
//! handle to queue native events and inspect what the core asked for while
//! the [`Display`](crate::Display) owns another clone.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cursor_icon::CursorIcon;
use meridian_core::Wake;
use meridian_geometry::Rect;
use parking_lot::{Condvar, Mutex};

use super::{EventFilter, Platform};
use crate::native::{NativeEvent, NativeFocusEvent};
use crate::widget::WidgetId;

#[derive(Debug, Clone, Copy)]
struct ViewRecord {
    parent: Option<WidgetId>,
    frame: Rect,
    visible: bool,
}

#[derive(Debug)]
struct HeadlessState {
    queue: VecDeque<NativeEvent>,
    views: HashMap<WidgetId, ViewRecord>,
    responders: HashMap<WidgetId, WidgetId>,
    cleared_responders: HashSet<WidgetId>,
    key_window: Option<WidgetId>,
    application_active: bool,
    cursor: CursorIcon,
    needs_display: Vec<(WidgetId, Option<Rect>)>,
    flushed_contexts: Vec<WidgetId>,
    woken: bool,
    wake_count: usize,
}

impl HeadlessState {
    fn window_of(&self, mut view: WidgetId) -> Option<WidgetId> {
        loop {
            let record = self.views.get(&view)?;
            match record.parent {
                Some(parent) => view = parent,
                None => return Some(view),
            }
        }
    }

    fn is_within(&self, mut view: WidgetId, ancestor: WidgetId) -> bool {
        loop {
            if view == ancestor {
                return true;
            }
            match self.views.get(&view).and_then(|record| record.parent) {
                Some(parent) => view = parent,
                None => return false,
            }
        }
    }

    /// Hand key input back to the window when its responder goes away.
    fn release_responders_within(&mut self, view: WidgetId) {
        let released: Vec<WidgetId> = self
            .responders
            .iter()
            .filter(|(_, responder)| self.is_within(**responder, view))
            .map(|(window, _)| *window)
            .collect();
        for window in released {
            self.responders.remove(&window);
        }
    }
}

struct Shared {
    state: Mutex<HeadlessState>,
    condvar: Condvar,
}

/// An in-memory [`Platform`].
#[derive(Clone)]
pub struct HeadlessPlatform {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for HeadlessPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("HeadlessPlatform")
            .field("queued", &state.queue.len())
            .field("views", &state.views.len())
            .field("key_window", &state.key_window)
            .finish()
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

struct HeadlessWaker {
    shared: Arc<Shared>,
}

impl Wake for HeadlessWaker {
    fn wake(&self) {
        let mut state = self.shared.state.lock();
        state.woken = true;
        state.wake_count += 1;
        self.shared.condvar.notify_all();
    }
}

impl HeadlessPlatform {
    /// Create an active application with no windows.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(HeadlessState {
                    queue: VecDeque::new(),
                    views: HashMap::new(),
                    responders: HashMap::new(),
                    cleared_responders: HashSet::new(),
                    key_window: None,
                    application_active: true,
                    cursor: CursorIcon::Default,
                    needs_display: Vec::new(),
                    flushed_contexts: Vec::new(),
                    woken: false,
                    wake_count: 0,
                }),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Queue a native event. Callable from any thread.
    pub fn post(&self, event: impl Into<NativeEvent>) {
        self.shared.state.lock().queue.push_back(event.into());
        self.shared.condvar.notify_all();
    }

    /// Snapshot of the queued native events.
    pub fn pending_events(&self) -> Vec<NativeEvent> {
        self.shared.state.lock().queue.iter().copied().collect()
    }

    /// Make `window` key as a user click would, queueing the notifications.
    pub fn activate_window(&self, window: WidgetId) {
        let mut state = self.shared.state.lock();
        if state.key_window == Some(window) {
            return;
        }
        if let Some(previous) = state.key_window.replace(window) {
            state
                .queue
                .push_back(NativeFocusEvent::WindowDeactivated(previous).into());
        }
        state
            .queue
            .push_back(NativeFocusEvent::WindowActivated(window).into());
        self.shared.condvar.notify_all();
    }

    /// Make the application inactive, queueing the notification.
    pub fn deactivate_application(&self) {
        let mut state = self.shared.state.lock();
        state.application_active = false;
        state
            .queue
            .push_back(NativeFocusEvent::ApplicationDeactivated.into());
        self.shared.condvar.notify_all();
    }

    /// Make the application active again, queueing the notification.
    pub fn activate_application(&self) {
        let mut state = self.shared.state.lock();
        state.application_active = true;
        state
            .queue
            .push_back(NativeFocusEvent::ApplicationActivated.into());
        self.shared.condvar.notify_all();
    }

    /// Report no responder for `window` while it stays key, as some window
    /// systems briefly do while a focused view is reconfigured. The next
    /// `make_first_responder` for that window ends the glitch.
    pub fn clear_responder(&self, window: WidgetId) {
        let mut state = self.shared.state.lock();
        state.responders.remove(&window);
        state.cleared_responders.insert(window);
    }

    /// The cursor last requested by the core.
    pub fn cursor(&self) -> CursorIcon {
        self.shared.state.lock().cursor
    }

    /// The frame last given to a view.
    pub fn frame_of(&self, view: WidgetId) -> Option<Rect> {
        self.shared.state.lock().views.get(&view).map(|record| record.frame)
    }

    /// Whether a native view exists for `view`.
    pub fn has_view(&self, view: WidgetId) -> bool {
        self.shared.state.lock().views.contains_key(&view)
    }

    /// Whether the native view is visible.
    pub fn is_view_visible(&self, view: WidgetId) -> bool {
        self.shared
            .state
            .lock()
            .views
            .get(&view)
            .is_some_and(|record| record.visible)
    }

    /// Drain the repaint requests received so far.
    pub fn take_needs_display(&self) -> Vec<(WidgetId, Option<Rect>)> {
        std::mem::take(&mut self.shared.state.lock().needs_display)
    }

    /// Drain the context flushes received so far.
    pub fn take_flushed_contexts(&self) -> Vec<WidgetId> {
        std::mem::take(&mut self.shared.state.lock().flushed_contexts)
    }

    /// How many times the waker fired.
    pub fn wake_count(&self) -> usize {
        self.shared.state.lock().wake_count
    }
}

impl Platform for HeadlessPlatform {
    fn next_event(&mut self) -> Option<NativeEvent> {
        self.shared.state.lock().queue.pop_front()
    }

    fn peek_matching(
        &mut self,
        filter: EventFilter<'_>,
        skip: usize,
        deadline: Instant,
    ) -> Option<NativeEvent> {
        let mut state = self.shared.state.lock();
        loop {
            if let Some(event) = state.queue.iter().filter(|event| filter(*event)).nth(skip) {
                return Some(*event);
            }
            if Instant::now() >= deadline {
                return None;
            }
            self.shared.condvar.wait_until(&mut state, deadline);
        }
    }

    fn wait_for_event(&mut self, timeout: Option<Duration>) {
        let mut state = self.shared.state.lock();
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        while state.queue.is_empty() && !state.woken {
            match deadline {
                Some(deadline) => {
                    if self
                        .shared
                        .condvar
                        .wait_until(&mut state, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
                None => self.shared.condvar.wait(&mut state),
            }
        }
        state.woken = false;
    }

    fn waker(&self) -> Arc<dyn Wake> {
        Arc::new(HeadlessWaker {
            shared: self.shared.clone(),
        })
    }

    fn create_view(&mut self, view: WidgetId, parent: Option<WidgetId>, frame: Rect) {
        self.shared.state.lock().views.insert(
            view,
            ViewRecord {
                parent,
                frame,
                visible: true,
            },
        );
    }

    fn destroy_view(&mut self, view: WidgetId) {
        let mut state = self.shared.state.lock();
        state.release_responders_within(view);
        state.views.remove(&view);
        state.responders.remove(&view);
        state.cleared_responders.remove(&view);
        if state.key_window == Some(view) {
            state.key_window = None;
        }
    }

    fn set_frame(&mut self, view: WidgetId, frame: Rect) {
        if let Some(record) = self.shared.state.lock().views.get_mut(&view) {
            record.frame = frame;
        }
    }

    fn set_visible(&mut self, view: WidgetId, visible: bool) {
        let mut state = self.shared.state.lock();
        if let Some(record) = state.views.get_mut(&view) {
            record.visible = visible;
        }
        if !visible {
            state.release_responders_within(view);
        }
    }

    fn first_responder(&self) -> Option<WidgetId> {
        let state = self.shared.state.lock();
        if !state.application_active {
            return None;
        }
        let window = state.key_window?;
        if state.cleared_responders.contains(&window) {
            return None;
        }
        Some(state.responders.get(&window).copied().unwrap_or(window))
    }

    fn make_first_responder(&mut self, window: WidgetId, view: WidgetId) -> bool {
        let mut state = self.shared.state.lock();
        if state.window_of(view) != Some(window) {
            return false;
        }
        state.cleared_responders.remove(&window);
        if view == window {
            state.responders.remove(&window);
        } else {
            state.responders.insert(window, view);
        }
        true
    }

    fn key_window(&self) -> Option<WidgetId> {
        self.shared.state.lock().key_window
    }

    fn make_key_and_order_front(&mut self, window: WidgetId) {
        let mut state = self.shared.state.lock();
        if state.views.contains_key(&window) {
            state.key_window = Some(window);
        }
    }

    fn is_application_active(&self) -> bool {
        self.shared.state.lock().application_active
    }

    fn set_cursor(&mut self, cursor: CursorIcon) {
        self.shared.state.lock().cursor = cursor;
    }

    fn set_needs_display(&mut self, view: WidgetId, rect: Option<Rect>) {
        self.shared.state.lock().needs_display.push((view, rect));
    }

    fn flush_context(&mut self, view: WidgetId) {
        self.shared.state.lock().flushed_contexts.push(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeMouseEvent;
    use meridian_geometry::Point;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<WidgetId> {
        let mut map: SlotMap<WidgetId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_peek_matching_leaves_queue_alone() {
        let window = ids(1)[0];
        let mut platform = HeadlessPlatform::new();
        let first: NativeEvent = NativeMouseEvent::moved(window, Point::new(1.0, 1.0)).into();
        let focus: NativeEvent = NativeFocusEvent::ApplicationActivated.into();
        let second: NativeEvent = NativeMouseEvent::moved(window, Point::new(2.0, 2.0)).into();
        platform.post(first);
        platform.post(focus);
        platform.post(second);

        let is_mouse = |event: &NativeEvent| matches!(event, NativeEvent::Mouse(_));
        assert_eq!(platform.peek_matching(&is_mouse, 0, Instant::now()), Some(first));
        assert_eq!(platform.peek_matching(&is_mouse, 1, Instant::now()), Some(second));
        assert_eq!(platform.peek_matching(&is_mouse, 2, Instant::now()), None);
        assert_eq!(platform.pending_events(), vec![first, focus, second]);
    }

    #[test]
    fn test_responder_falls_back_to_window() {
        let views = ids(2);
        let (window, button) = (views[0], views[1]);
        let mut platform = HeadlessPlatform::new();
        platform.create_view(window, None, Rect::new(0.0, 0.0, 100.0, 100.0));
        platform.create_view(button, Some(window), Rect::new(0.0, 0.0, 10.0, 10.0));
        platform.make_key_and_order_front(window);

        assert_eq!(platform.first_responder(), Some(window));
        assert!(platform.make_first_responder(window, button));
        assert_eq!(platform.first_responder(), Some(button));

        platform.set_visible(button, false);
        assert_eq!(platform.first_responder(), Some(window));
    }

    #[test]
    fn test_waker_interrupts_wait() {
        let mut platform = HeadlessPlatform::new();
        let waker = platform.waker();
        let thread = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            waker.wake();
        });
        platform.wait_for_event(None);
        thread.join().unwrap();
        assert_eq!(platform.wake_count(), 1);
    }
}
