//! The native event model produced by platform adapters.
//!
//! A platform adapter turns whatever its windowing system reports into
//! [`NativeEvent`]s. The dispatch loop consumes them through
//! [`NativeEventVisitor`], so no platform callback naming leaks into the core.
//!
//! Locations are window-relative, top-down, in logical pixels.

use meridian_geometry::{Point, Size};

use crate::event::{Key, KeyboardModifiers, MouseButton};
use crate::widget::WidgetId;

/// What a mouse event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Down,
    Up,
    /// Pointer motion with no button held.
    Moved,
    /// Pointer motion with a button held.
    Dragged,
    /// The pointer left the window.
    Exited,
}

/// A native pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeMouseEvent {
    pub kind: MouseEventKind,
    /// The window the event was delivered to.
    pub window: WidgetId,
    /// Location in the window's top-down content coordinates.
    pub location: Point,
    pub button: Option<MouseButton>,
    pub click_count: u32,
    pub modifiers: KeyboardModifiers,
}

impl NativeMouseEvent {
    /// A motion event without buttons.
    pub fn moved(window: WidgetId, location: Point) -> Self {
        Self {
            kind: MouseEventKind::Moved,
            window,
            location,
            button: None,
            click_count: 0,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// A press of `button`.
    pub fn down(window: WidgetId, location: Point, button: MouseButton, click_count: u32) -> Self {
        Self {
            kind: MouseEventKind::Down,
            button: Some(button),
            click_count,
            ..Self::moved(window, location)
        }
    }

    /// A release of `button`.
    pub fn up(window: WidgetId, location: Point, button: MouseButton) -> Self {
        Self {
            kind: MouseEventKind::Up,
            button: Some(button),
            click_count: 1,
            ..Self::moved(window, location)
        }
    }

    /// Motion while `button` is held.
    pub fn dragged(window: WidgetId, location: Point, button: MouseButton) -> Self {
        Self {
            kind: MouseEventKind::Dragged,
            button: Some(button),
            ..Self::moved(window, location)
        }
    }

    /// The pointer left `window`.
    pub fn exited(window: WidgetId) -> Self {
        Self {
            kind: MouseEventKind::Exited,
            ..Self::moved(window, Point::ZERO)
        }
    }
}

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// A native keyboard event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeKeyEvent {
    pub kind: KeyEventKind,
    pub window: WidgetId,
    pub key: Key,
    pub character: Option<char>,
    pub modifiers: KeyboardModifiers,
}

impl NativeKeyEvent {
    /// A key press.
    pub fn down(window: WidgetId, key: Key, modifiers: KeyboardModifiers) -> Self {
        Self {
            kind: KeyEventKind::Down,
            window,
            key,
            character: match key {
                Key::Character(c) => Some(c),
                _ => None,
            },
            modifiers,
        }
    }

    /// A key release.
    pub fn up(window: WidgetId, key: Key, modifiers: KeyboardModifiers) -> Self {
        Self {
            kind: KeyEventKind::Up,
            ..Self::down(window, key, modifiers)
        }
    }
}

/// Activation and responder notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFocusEvent {
    /// A window became the key window.
    WindowActivated(WidgetId),
    /// A window stopped being the key window.
    WindowDeactivated(WidgetId),
    /// The application became active.
    ApplicationActivated,
    /// The application resigned active status.
    ApplicationDeactivated,
    /// The responder inside a window changed.
    ResponderChanged(WidgetId),
}

/// Window geometry changes made by the user or the window manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeGeometryEvent {
    /// New screen origin of the window.
    WindowMoved { window: WidgetId, origin: Point },
    /// New content size of the window.
    WindowResized { window: WidgetId, size: Size },
    /// The user asked to close the window.
    CloseRequested { window: WidgetId },
}

/// Everything a platform adapter can report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeEvent {
    Mouse(NativeMouseEvent),
    Key(NativeKeyEvent),
    Focus(NativeFocusEvent),
    Geometry(NativeGeometryEvent),
}

impl NativeEvent {
    /// Hand the event to the matching visitor method.
    pub fn accept<V: NativeEventVisitor + ?Sized>(self, visitor: &mut V) {
        match self {
            Self::Mouse(event) => visitor.visit_mouse(event),
            Self::Key(event) => visitor.visit_key(event),
            Self::Focus(event) => visitor.visit_focus(event),
            Self::Geometry(event) => visitor.visit_geometry(event),
        }
    }

    /// The window this event was delivered to, if any.
    pub fn window(&self) -> Option<WidgetId> {
        match self {
            Self::Mouse(event) => Some(event.window),
            Self::Key(event) => Some(event.window),
            Self::Focus(
                NativeFocusEvent::WindowActivated(window)
                | NativeFocusEvent::WindowDeactivated(window)
                | NativeFocusEvent::ResponderChanged(window),
            ) => Some(*window),
            Self::Focus(_) => None,
            Self::Geometry(
                NativeGeometryEvent::WindowMoved { window, .. }
                | NativeGeometryEvent::WindowResized { window, .. }
                | NativeGeometryEvent::CloseRequested { window },
            ) => Some(*window),
        }
    }

    /// The mouse payload, if this is a mouse event.
    pub fn as_mouse(&self) -> Option<&NativeMouseEvent> {
        match self {
            Self::Mouse(event) => Some(event),
            _ => None,
        }
    }
}

impl From<NativeMouseEvent> for NativeEvent {
    fn from(event: NativeMouseEvent) -> Self {
        Self::Mouse(event)
    }
}

impl From<NativeKeyEvent> for NativeEvent {
    fn from(event: NativeKeyEvent) -> Self {
        Self::Key(event)
    }
}

impl From<NativeFocusEvent> for NativeEvent {
    fn from(event: NativeFocusEvent) -> Self {
        Self::Focus(event)
    }
}

impl From<NativeGeometryEvent> for NativeEvent {
    fn from(event: NativeGeometryEvent) -> Self {
        Self::Geometry(event)
    }
}

/// Consumer of native events.
pub trait NativeEventVisitor {
    fn visit_mouse(&mut self, event: NativeMouseEvent);
    fn visit_key(&mut self, event: NativeKeyEvent);
    fn visit_focus(&mut self, event: NativeFocusEvent);
    fn visit_geometry(&mut self, event: NativeGeometryEvent);
}
