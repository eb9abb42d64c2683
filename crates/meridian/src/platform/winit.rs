//! A [`Platform`] backed by winit.
//!
//! The adapter owns the winit event loop and pumps it from the display's
//! thread, so the dispatch loop, drag look-ahead and `sleep` all wait on the
//! real window system. Top-level windows are winit windows; controls have no
//! native view of their own and live only in the adapter's bookkeeping.
//!
//! Pumping is not available on the web or iOS backends.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ::winit::application::ApplicationHandler;
use ::winit::dpi::{LogicalPosition, LogicalSize};
use ::winit::error::EventLoopError;
use ::winit::event::{
    ElementState, KeyEvent, Modifiers, MouseButton as WinitMouseButton, WindowEvent,
};
use ::winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use ::winit::keyboard::{Key as WinitKey, KeyLocation, NamedKey};
use ::winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use ::winit::window::{Window, WindowId};
use cursor_icon::CursorIcon;
use meridian_core::Wake;
use meridian_geometry::{Point, Rect, Size};
use parking_lot::Mutex;

use super::{EventFilter, Platform};
use crate::event::{Key, KeyboardModifiers, MouseButton};
use crate::native::{
    NativeEvent, NativeFocusEvent, NativeGeometryEvent, NativeKeyEvent, NativeMouseEvent,
};
use crate::widget::WidgetId;

/// Two presses within this time form a multi-click.
pub const DEFAULT_DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);

/// Two presses within this distance, in logical pixels, form a multi-click.
pub const DEFAULT_DOUBLE_CLICK_DISTANCE: f32 = 5.0;

/// User event used to interrupt a blocked pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeUp;

/// Converts a winit mouse button.
pub fn from_winit_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(index) => MouseButton::Other(index),
    }
}

/// Converts a winit logical key. `location` distinguishes keypad Enter.
pub fn from_winit_key(key: &WinitKey, location: KeyLocation) -> Key {
    match key {
        WinitKey::Named(NamedKey::Enter) if location == KeyLocation::Numpad => Key::NumpadEnter,
        WinitKey::Named(named) => from_winit_named_key(named),
        WinitKey::Character(text) => match text.chars().next() {
            Some(' ') => Key::Space,
            Some(c) => Key::Character(c),
            None => Key::Unknown(0),
        },
        WinitKey::Unidentified(_) | WinitKey::Dead(_) => Key::Unknown(0),
    }
}

fn from_winit_named_key(key: &NamedKey) -> Key {
    match key {
        NamedKey::Escape => Key::Escape,
        NamedKey::Enter => Key::Enter,
        NamedKey::Tab => Key::Tab,
        NamedKey::ArrowUp => Key::ArrowUp,
        NamedKey::ArrowDown => Key::ArrowDown,
        NamedKey::ArrowLeft => Key::ArrowLeft,
        NamedKey::ArrowRight => Key::ArrowRight,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown => Key::PageDown,
        NamedKey::Home => Key::Home,
        NamedKey::End => Key::End,
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Delete => Key::Delete,
        NamedKey::Space => Key::Space,
        _ => Key::Unknown(0),
    }
}

/// Converts winit modifiers.
pub fn from_winit_modifiers(modifiers: &Modifiers) -> KeyboardModifiers {
    let state = modifiers.state();
    KeyboardModifiers {
        shift: state.shift_key(),
        control: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

/// Per-window input state needed to turn winit's stateless reports into
/// native events.
#[derive(Debug, Default)]
struct InputState {
    location: Point,
    modifiers: KeyboardModifiers,
    pressed: Option<MouseButton>,
    last_press: Option<(MouseButton, Point, Instant, u32)>,
}

impl InputState {
    fn click_count(&mut self, button: MouseButton, now: Instant) -> u32 {
        let location = self.location;
        let count = match self.last_press {
            Some((last_button, last_location, time, count))
                if last_button == button
                    && now.duration_since(time) <= DEFAULT_DOUBLE_CLICK_TIME
                    && (location.x - last_location.x).abs() <= DEFAULT_DOUBLE_CLICK_DISTANCE
                    && (location.y - last_location.y).abs() <= DEFAULT_DOUBLE_CLICK_DISTANCE =>
            {
                count + 1
            }
            _ => 1,
        };
        self.last_press = Some((button, location, now, count));
        count
    }
}

/// Everything except the event loop, so the loop can pump into it.
#[derive(Default)]
struct WinitState {
    queue: VecDeque<NativeEvent>,
    windows: HashMap<WidgetId, Arc<Window>>,
    ids: HashMap<WindowId, WidgetId>,
    /// Parent of every view; `None` for windows.
    parents: HashMap<WidgetId, Option<WidgetId>>,
    responders: HashMap<WidgetId, WidgetId>,
    key_window: Option<WidgetId>,
    pointer_window: Option<WidgetId>,
    inputs: HashMap<WidgetId, InputState>,
}

impl WinitState {
    fn window_of(&self, mut view: WidgetId) -> Option<WidgetId> {
        loop {
            match self.parents.get(&view)? {
                Some(parent) => view = *parent,
                None => return Some(view),
            }
        }
    }

    fn release_responders_within(&mut self, view: WidgetId) {
        let released: Vec<WidgetId> = self
            .responders
            .iter()
            .filter(|(_, responder)| {
                let mut current = Some(**responder);
                while let Some(node) = current {
                    if node == view {
                        return true;
                    }
                    current = self.parents.get(&node).copied().flatten();
                }
                false
            })
            .map(|(window, _)| *window)
            .collect();
        for window in released {
            self.responders.remove(&window);
        }
    }

    fn translate(&mut self, window: WidgetId, event: WindowEvent) -> Option<NativeEvent> {
        let scale = self
            .windows
            .get(&window)
            .map_or(1.0, |window| window.scale_factor());
        let input = self.inputs.entry(window).or_default();
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let position = position.to_logical::<f32>(scale);
                input.location = Point::new(position.x, position.y);
                self.pointer_window = Some(window);
                let mut event = match input.pressed {
                    Some(button) => NativeMouseEvent::dragged(window, input.location, button),
                    None => NativeMouseEvent::moved(window, input.location),
                };
                event.modifiers = input.modifiers;
                Some(event.into())
            }
            WindowEvent::CursorLeft { .. } => {
                if self.pointer_window == Some(window) {
                    self.pointer_window = None;
                }
                Some(NativeMouseEvent::exited(window).into())
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = from_winit_mouse_button(button);
                let mut event = match state {
                    ElementState::Pressed => {
                        input.pressed = Some(button);
                        let count = input.click_count(button, Instant::now());
                        NativeMouseEvent::down(window, input.location, button, count)
                    }
                    ElementState::Released => {
                        input.pressed = None;
                        NativeMouseEvent::up(window, input.location, button)
                    }
                };
                event.modifiers = input.modifiers;
                Some(event.into())
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                input.modifiers = from_winit_modifiers(&modifiers);
                None
            }
            WindowEvent::KeyboardInput { event, .. } => {
                Some(translate_key(window, &event, input.modifiers).into())
            }
            WindowEvent::Focused(true) => {
                self.key_window = Some(window);
                Some(NativeFocusEvent::WindowActivated(window).into())
            }
            WindowEvent::Focused(false) => {
                if self.key_window == Some(window) {
                    self.key_window = None;
                }
                Some(NativeFocusEvent::WindowDeactivated(window).into())
            }
            WindowEvent::Moved(position) => {
                let origin = position.to_logical::<f32>(scale);
                Some(
                    NativeGeometryEvent::WindowMoved {
                        window,
                        origin: Point::new(origin.x, origin.y),
                    }
                    .into(),
                )
            }
            WindowEvent::Resized(size) => {
                let size = size.to_logical::<f32>(scale);
                Some(
                    NativeGeometryEvent::WindowResized {
                        window,
                        size: Size::new(size.width, size.height),
                    }
                    .into(),
                )
            }
            WindowEvent::CloseRequested => {
                Some(NativeGeometryEvent::CloseRequested { window }.into())
            }
            _ => None,
        }
    }
}

fn translate_key(window: WidgetId, event: &KeyEvent, modifiers: KeyboardModifiers) -> NativeKeyEvent {
    let key = from_winit_key(&event.logical_key, event.location);
    let mut native = match event.state {
        ElementState::Pressed => NativeKeyEvent::down(window, key, modifiers),
        ElementState::Released => NativeKeyEvent::up(window, key, modifiers),
    };
    native.character = event.text.as_ref().and_then(|text| text.chars().next());
    native
}

impl ApplicationHandler<WakeUp> for WinitState {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.ids.get(&window_id).copied() else {
            return;
        };
        if let Some(native) = self.translate(window, event) {
            self.queue.push_back(native);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: WakeUp) {
        tracing::trace!(target: "meridian::display", "woken");
    }
}

struct ProxyWaker {
    proxy: Mutex<EventLoopProxy<WakeUp>>,
}

impl Wake for ProxyWaker {
    fn wake(&self) {
        // A closed loop has nobody left to wake.
        let _ = self.proxy.lock().send_event(WakeUp);
    }
}

/// Platform adapter pumping a winit event loop.
pub struct WinitPlatform {
    event_loop: EventLoop<WakeUp>,
    state: WinitState,
}

impl std::fmt::Debug for WinitPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WinitPlatform")
            .field("queued", &self.state.queue.len())
            .field("windows", &self.state.windows.len())
            .field("key_window", &self.state.key_window)
            .finish()
    }
}

impl WinitPlatform {
    /// Create the event loop. Must run on the main thread on most platforms.
    pub fn new() -> Result<Self, EventLoopError> {
        let event_loop = EventLoop::with_user_event().build()?;
        Ok(Self {
            event_loop,
            state: WinitState::default(),
        })
    }

    /// The winit window backing `window`.
    pub fn window(&self, window: WidgetId) -> Option<Arc<Window>> {
        self.state.windows.get(&window).cloned()
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(timeout, &mut self.state) {
            tracing::debug!(target: "meridian::display", code, "event loop exited");
        }
    }
}

impl Platform for WinitPlatform {
    fn next_event(&mut self) -> Option<NativeEvent> {
        if self.state.queue.is_empty() {
            self.pump(Some(Duration::ZERO));
        }
        self.state.queue.pop_front()
    }

    fn peek_matching(
        &mut self,
        filter: EventFilter<'_>,
        skip: usize,
        deadline: Instant,
    ) -> Option<NativeEvent> {
        loop {
            if let Some(event) = self.state.queue.iter().filter(|event| filter(*event)).nth(skip) {
                return Some(*event);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            self.pump(Some(deadline - now));
        }
    }

    fn wait_for_event(&mut self, timeout: Option<Duration>) {
        if self.state.queue.is_empty() {
            self.pump(timeout);
        }
    }

    fn waker(&self) -> Arc<dyn Wake> {
        Arc::new(ProxyWaker {
            proxy: Mutex::new(self.event_loop.create_proxy()),
        })
    }

    fn create_view(&mut self, view: WidgetId, parent: Option<WidgetId>, frame: Rect) {
        self.state.parents.insert(view, parent);
        if parent.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_inner_size(LogicalSize::new(frame.width(), frame.height()))
            .with_position(LogicalPosition::new(frame.left(), frame.top()));
        #[allow(deprecated)]
        let created = self.event_loop.create_window(attributes);
        match created {
            Ok(window) => {
                self.state.ids.insert(window.id(), view);
                self.state.windows.insert(view, Arc::new(window));
            }
            Err(error) => {
                tracing::error!(target: "meridian::display", %error, "failed to create window");
            }
        }
    }

    fn destroy_view(&mut self, view: WidgetId) {
        self.state.release_responders_within(view);
        self.state.parents.remove(&view);
        self.state.responders.remove(&view);
        self.state.inputs.remove(&view);
        if let Some(window) = self.state.windows.remove(&view) {
            self.state.ids.remove(&window.id());
        }
        if self.state.key_window == Some(view) {
            self.state.key_window = None;
        }
    }

    fn set_frame(&mut self, view: WidgetId, frame: Rect) {
        if let Some(window) = self.state.windows.get(&view) {
            let _ = window.request_inner_size(LogicalSize::new(frame.width(), frame.height()));
            window.set_outer_position(LogicalPosition::new(frame.left(), frame.top()));
        }
    }

    fn set_visible(&mut self, view: WidgetId, visible: bool) {
        if let Some(window) = self.state.windows.get(&view) {
            window.set_visible(visible);
        }
        if !visible {
            self.state.release_responders_within(view);
        }
    }

    fn first_responder(&self) -> Option<WidgetId> {
        let window = self.state.key_window?;
        Some(self.state.responders.get(&window).copied().unwrap_or(window))
    }

    fn make_first_responder(&mut self, window: WidgetId, view: WidgetId) -> bool {
        if self.state.window_of(view) != Some(window) {
            return false;
        }
        if view == window {
            self.state.responders.remove(&window);
        } else {
            self.state.responders.insert(window, view);
        }
        true
    }

    fn key_window(&self) -> Option<WidgetId> {
        self.state.key_window
    }

    fn make_key_and_order_front(&mut self, window: WidgetId) {
        if let Some(native) = self.state.windows.get(&window) {
            native.focus_window();
            self.state.key_window = Some(window);
        }
    }

    fn is_application_active(&self) -> bool {
        self.state.key_window.is_some()
    }

    fn set_cursor(&mut self, cursor: CursorIcon) {
        let target = self.state.pointer_window.or(self.state.key_window);
        if let Some(window) = target.and_then(|target| self.state.windows.get(&target)) {
            window.set_cursor(cursor);
        }
    }

    fn set_needs_display(&mut self, view: WidgetId, _rect: Option<Rect>) {
        if let Some(window) = self
            .state
            .window_of(view)
            .and_then(|window| self.state.windows.get(&window))
        {
            window.request_redraw();
        }
    }

    fn flush_context(&mut self, view: WidgetId) {
        tracing::trace!(target: "meridian::display", ?view, "context flush");
    }
}
