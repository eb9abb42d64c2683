//! Descriptions of new windows and controls.

use cursor_icon::CursorIcon;
use meridian_geometry::{Insets, Rect};

use super::WidgetId;

/// Configuration for a top-level window.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Content frame in screen coordinates.
    pub frame: Rect,
    /// Whether the content view's origin is top-left.
    pub flipped: bool,
    /// Window owning this one; owned windows are dialogs.
    pub owner: Option<WidgetId>,
    /// Whether the window blocks input to every other window.
    pub modal: bool,
    pub visible: bool,
    /// Title bar and border around the content, excluded from hit-tests
    /// that skip trim.
    pub trim: Insets,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            frame: Rect::new(0.0, 0.0, 800.0, 600.0),
            flipped: true,
            owner: None,
            modal: false,
            visible: true,
            trim: Insets::ZERO,
        }
    }
}

impl WindowConfig {
    /// A window with the given screen frame.
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            ..Default::default()
        }
    }

    /// Set whether the content view is flipped.
    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }

    /// Make this window a dialog of `owner`.
    pub fn owner(mut self, owner: WidgetId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Make the window modal.
    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    /// Set initial visibility.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the trim insets.
    pub fn trim(mut self, trim: Insets) -> Self {
        self.trim = trim;
        self
    }
}

/// Configuration for a control.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Frame in the parent's top-down coordinates.
    pub frame: Rect,
    /// Whether the control's origin is top-left.
    pub flipped: bool,
    pub visible: bool,
    pub enabled: bool,
    /// Whether the control can take keyboard focus.
    pub focusable: bool,
    /// Whether the control is its own stop in tab order. Controls that are
    /// not tab groups are tab items, reached with the arrow keys.
    pub tab_group: bool,
    /// Whether a primary press may start a drag gesture.
    pub drag_detect: bool,
    /// Border or scrollbar area excluded from hit-tests that skip trim.
    pub trim: Insets,
    /// Clip applied to children, in the control's top-down coordinates.
    pub viewport: Option<Rect>,
    pub cursor: Option<CursorIcon>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            frame: Rect::ZERO,
            flipped: true,
            visible: true,
            enabled: true,
            focusable: true,
            tab_group: true,
            drag_detect: false,
            trim: Insets::ZERO,
            viewport: None,
            cursor: None,
        }
    }
}

impl ControlConfig {
    /// A control with the given frame.
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            ..Default::default()
        }
    }

    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    pub fn tab_group(mut self, tab_group: bool) -> Self {
        self.tab_group = tab_group;
        self
    }

    pub fn drag_detect(mut self, drag_detect: bool) -> Self {
        self.drag_detect = drag_detect;
        self
    }

    pub fn trim(mut self, trim: Insets) -> Self {
        self.trim = trim;
        self
    }

    pub fn viewport(mut self, viewport: Rect) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn cursor(mut self, cursor: CursorIcon) -> Self {
        self.cursor = Some(cursor);
        self
    }
}
