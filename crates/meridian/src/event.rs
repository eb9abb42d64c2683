//! Abstract, platform-independent widget events.
//!
//! Native input is translated into [`Event`]s and delivered to listeners
//! registered per [`EventType`]. A single `Event` struct carries every
//! payload; fields that do not apply to a given type keep their defaults.

use meridian_geometry::Point;

use crate::widget::WidgetId;

/// The kind of an [`Event`], used as the listener registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    KeyDown,
    KeyUp,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseDoubleClick,
    MouseEnter,
    MouseExit,
    MouseHover,
    DragDetect,
    FocusIn,
    FocusOut,
    Traverse,
    Move,
    Resize,
    Layout,
    Activate,
    Deactivate,
    Close,
    Dispose,
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    Right,
    Middle,
    /// Any other button, by platform index.
    Other(u16),
}

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held (Cmd on macOS).
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Control + Shift modifiers.
    pub const CTRL_SHIFT: Self = Self {
        shift: true,
        control: true,
        alt: false,
        meta: false,
    };

    /// Check if no modifiers are pressed.
    pub fn is_empty(&self) -> bool {
        !self.shift && !self.control && !self.alt && !self.meta
    }
}

/// Physical keys the toolkit distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    /// Enter on the numeric keypad.
    NumpadEnter,
    Tab,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
    Backspace,
    Delete,
    Space,
    /// A key producing a character.
    Character(char),
    /// A key without a dedicated variant, by platform code.
    Unknown(u32),
}

/// A logical keyboard traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalAction {
    Escape,
    Return,
    TabNext,
    TabPrevious,
    ArrowNext,
    ArrowPrevious,
    PageNext,
    PagePrevious,
}

impl TraversalAction {
    /// Radiating actions are offered to every ancestor up to the window;
    /// the others apply only where they originate.
    pub fn is_radiating(self) -> bool {
        matches!(
            self,
            Self::Escape | Self::Return | Self::PageNext | Self::PagePrevious
        )
    }

    /// Whether the action moves forward.
    pub fn is_next(self) -> bool {
        matches!(self, Self::TabNext | Self::ArrowNext | Self::PageNext)
    }
}

/// A widget event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// What happened.
    pub event_type: EventType,
    /// The widget the event is about.
    pub widget: WidgetId,
    /// Pointer position in the widget's local coordinates.
    pub position: Point,
    /// The button involved in a mouse event.
    pub button: Option<MouseButton>,
    /// Click count for mouse presses.
    pub count: u32,
    /// Modifiers held when the event occurred.
    pub modifiers: KeyboardModifiers,
    /// The key involved in a key or traverse event.
    pub key: Option<Key>,
    /// The character produced by a key event.
    pub character: Option<char>,
    /// The traversal being offered by a traverse event.
    pub detail: Option<TraversalAction>,
    /// Cleared by listeners to veto the default action.
    pub doit: bool,
}

impl Event {
    /// Create an event with default payload and `doit` set.
    pub fn new(event_type: EventType, widget: WidgetId) -> Self {
        Self {
            event_type,
            widget,
            position: Point::ZERO,
            button: None,
            count: 0,
            modifiers: KeyboardModifiers::NONE,
            key: None,
            character: None,
            detail: None,
            doit: true,
        }
    }

    /// Set the local position.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Set button and click count.
    pub fn with_button(mut self, button: Option<MouseButton>, count: u32) -> Self {
        self.button = button;
        self.count = count;
        self
    }

    /// Set the modifiers.
    pub fn with_modifiers(mut self, modifiers: KeyboardModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the key and its character.
    pub fn with_key(mut self, key: Key, character: Option<char>) -> Self {
        self.key = Some(key);
        self.character = character;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radiating_actions() {
        assert!(TraversalAction::Escape.is_radiating());
        assert!(TraversalAction::Return.is_radiating());
        assert!(TraversalAction::PagePrevious.is_radiating());
        assert!(!TraversalAction::TabNext.is_radiating());
        assert!(!TraversalAction::ArrowPrevious.is_radiating());
    }

    #[test]
    fn test_modifiers_is_empty() {
        assert!(KeyboardModifiers::NONE.is_empty());
        assert!(!KeyboardModifiers::CTRL_SHIFT.is_empty());
    }
}
