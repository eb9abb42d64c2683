//! Widget lifecycle and tree mutation.

use cursor_icon::CursorIcon;
use meridian_core::{MeridianError, Result};
use meridian_geometry::{Point, Rect, Size};

use super::Display;
use crate::event::{Event, EventType};
use crate::native::NativeGeometryEvent;
use crate::widget::{ControlConfig, WidgetFlags, WidgetId, WidgetNode, WindowConfig};

impl Display {
    // -------------------------------------------------------------------------
    // Creation and disposal
    // -------------------------------------------------------------------------

    /// Create a top-level window.
    pub fn create_window(&mut self, config: WindowConfig) -> Result<WidgetId> {
        self.check_device()?;
        if let Some(owner) = config.owner {
            if !self.tree.contains(owner) {
                return Err(MeridianError::InvalidArgument("owner is disposed"));
            }
            if !self.tree.is_window(owner) {
                return Err(MeridianError::InvalidArgument("owner is not a window"));
            }
        }
        let window = self.tree.insert_window(WidgetNode::for_window(&config));
        self.platform.create_view(window, None, config.frame);
        if !config.visible {
            self.platform.set_visible(window, false);
        }
        tracing::debug!(target: "meridian::display", ?window, frame = ?config.frame, "window created");
        Ok(window)
    }

    /// Create a control as the topmost child of `parent`.
    pub fn create_control(&mut self, parent: WidgetId, config: ControlConfig) -> Result<WidgetId> {
        self.check_widget(parent)?;
        let control = self
            .tree
            .insert_child(WidgetNode::for_control(parent, &config))
            .ok_or(MeridianError::WidgetDisposed)?;
        self.platform.create_view(control, Some(parent), config.frame);
        if !config.visible {
            self.platform.set_visible(control, false);
        }
        self.invalidate_visible_region(control);
        Ok(control)
    }

    /// Show `window` and make it the active window.
    pub fn open(&mut self, window: WidgetId) -> Result<()> {
        self.check_widget(window)?;
        if !self.tree.is_window(window) {
            return Err(MeridianError::InvalidArgument("not a window"));
        }
        self.set_visible(window, true)?;
        self.bring_to_top(window);
        Ok(())
    }

    /// Dispose `widget` and its descendants.
    ///
    /// `Dispose` is delivered to the widget and then to each descendant
    /// before anything is removed. Tracker references are cleared eagerly.
    pub fn dispose_widget(&mut self, widget: WidgetId) -> Result<()> {
        self.check_widget(widget)?;
        self.release_widget(widget);
        Ok(())
    }

    pub(crate) fn release_widget(&mut self, widget: WidgetId) {
        if !self.tree.contains(widget) || self.tree.flags(widget).contains(WidgetFlags::RELEASING) {
            return;
        }
        let nodes = self.tree.subtree(widget);
        for id in &nodes {
            if let Some(node) = self.tree.get_mut(*id) {
                node.flags.insert(WidgetFlags::RELEASING);
            }
        }
        for id in &nodes {
            if self.tree.contains(*id) {
                let mut event = Event::new(EventType::Dispose, *id);
                self.send_event(*id, &mut event);
            }
        }
        if !self.tree.contains(widget) {
            return;
        }

        self.invalidate_visible_region(widget);
        let removed = self.tree.remove_subtree(widget);
        tracing::debug!(target: "meridian::display", ?widget, count = removed.len(), "widget disposed");
        for id in &removed {
            self.forget_widget(*id);
            self.platform.destroy_view(*id);
        }
        self.update_cursor();
    }

    /// Drop every tracker reference to a removed widget.
    fn forget_widget(&mut self, id: WidgetId) {
        let forget = |slot: &mut Option<WidgetId>| {
            if *slot == Some(id) {
                *slot = None;
            }
        };
        forget(&mut self.focus.control);
        forget(&mut self.hover.tracking);
        forget(&mut self.drag.consumed);
        forget(&mut self.active_window);
        if self.hover.current == Some(id) {
            self.hover.current = None;
            self.timers.cancel(super::TimerKey::Hover);
        }
        for window in self.tree.windows().to_vec() {
            if let Some(data) = self.tree.window_data_mut(window) {
                forget(&mut data.saved_focus);
                forget(&mut data.active_control);
            }
        }
        self.pending_layouts.retain(|widget| *widget != id);
        self.pending_repaints.retain(|(widget, _)| *widget != id);
        self.pending_contexts.retain(|widget| *widget != id);
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    /// Set the frame of `widget`. A window's frame is in screen coordinates,
    /// a control's in its parent's top-down coordinates.
    pub fn set_bounds(&mut self, widget: WidgetId, frame: Rect) -> Result<()> {
        self.check_widget(widget)?;
        let Some(node) = self.tree.get_mut(widget) else {
            return Err(MeridianError::WidgetDisposed);
        };
        let old = node.positioned.frame;
        if old == frame {
            return Ok(());
        }
        node.positioned.frame = frame;
        self.invalidate_visible_region(widget);

        // Some window systems drop the responder while a focused view is
        // reframed; the frame change must not read as a focus transition.
        let ignore = std::mem::replace(&mut self.focus.ignore_focus, true);
        self.platform.set_frame(widget, frame);
        if old.origin != frame.origin {
            let mut event = Event::new(EventType::Move, widget);
            self.send_event(widget, &mut event);
        }
        if old.size != frame.size && self.tree.contains(widget) {
            let mut event = Event::new(EventType::Resize, widget);
            self.send_event(widget, &mut event);
        }
        self.focus.ignore_focus = ignore;
        Ok(())
    }

    /// Move `widget`, keeping its size.
    pub fn set_location(&mut self, widget: WidgetId, location: Point) -> Result<()> {
        let size = self.bounds(widget)?.size;
        self.set_bounds(widget, Rect { origin: location, size })
    }

    /// Resize `widget`, keeping its location.
    pub fn set_size(&mut self, widget: WidgetId, size: Size) -> Result<()> {
        let origin = self.bounds(widget)?.origin;
        self.set_bounds(widget, Rect { origin, size })
    }

    /// The frame of `widget`.
    pub fn bounds(&self, widget: WidgetId) -> Result<Rect> {
        self.check_widget(widget)?;
        self.tree
            .get(widget)
            .map(|node| node.positioned.frame)
            .ok_or(MeridianError::WidgetDisposed)
    }

    /// Set the clip applied to `control` and its children, in its top-down
    /// local coordinates.
    pub fn set_viewport(&mut self, control: WidgetId, viewport: Option<Rect>) -> Result<()> {
        self.check_widget(control)?;
        if let Some(node) = self.tree.get_mut(control) {
            node.positioned.viewport = viewport;
        }
        self.invalidate_visible_region(control);
        Ok(())
    }

    pub(crate) fn handle_geometry(&mut self, event: NativeGeometryEvent) {
        match event {
            NativeGeometryEvent::WindowMoved { window, origin } => {
                let Some(node) = self.tree.get_mut(window) else {
                    return;
                };
                if node.positioned.frame.origin == origin {
                    return;
                }
                node.positioned.frame.origin = origin;
                let mut event = Event::new(EventType::Move, window);
                self.send_event(window, &mut event);
            }
            NativeGeometryEvent::WindowResized { window, size } => {
                let Some(node) = self.tree.get_mut(window) else {
                    return;
                };
                if node.positioned.frame.size == size {
                    return;
                }
                node.positioned.frame.size = size;
                self.invalidate_visible_region(window);
                let mut event = Event::new(EventType::Resize, window);
                self.send_event(window, &mut event);
            }
            NativeGeometryEvent::CloseRequested { window } => self.close_window(window),
        }
    }

    /// Offer `Close` to `window` and dispose it unless a listener vetoes.
    pub(crate) fn close_window(&mut self, window: WidgetId) {
        if !self.tree.contains(window) {
            return;
        }
        let mut event = Event::new(EventType::Close, window);
        self.send_event(window, &mut event);
        if event.doit {
            self.release_widget(window);
        }
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    /// Show or hide `widget`.
    pub fn set_visible(&mut self, widget: WidgetId, visible: bool) -> Result<()> {
        self.check_widget(widget)?;
        let Some(node) = self.tree.get_mut(widget) else {
            return Err(MeridianError::WidgetDisposed);
        };
        if node.flags.contains(WidgetFlags::HIDDEN) != visible {
            return Ok(());
        }
        node.flags.set(WidgetFlags::HIDDEN, !visible);
        self.invalidate_visible_region(widget);
        self.platform.set_visible(widget, visible);
        if !visible && self.focus_within(widget) {
            self.check_focus();
        }
        Ok(())
    }

    /// Enable or disable input to `widget` and its descendants.
    pub fn set_enabled(&mut self, widget: WidgetId, enabled: bool) -> Result<()> {
        self.check_widget(widget)?;
        if let Some(node) = self.tree.get_mut(widget) {
            node.flags.set(WidgetFlags::DISABLED, !enabled);
        }
        if !enabled
            && self.focus_within(widget)
            && let Some(window) = self.tree.window_of(widget)
        {
            self.platform.make_first_responder(window, window);
            self.check_focus();
        }
        Ok(())
    }

    fn focus_within(&self, widget: WidgetId) -> bool {
        self.alive(self.focus.control)
            .is_some_and(|focus| self.tree.is_ancestor_or_self(widget, focus))
    }

    /// Suspend (`false`) or resume (`true`) drawing of `control`. Calls nest;
    /// drawing resumes when every suspension has been matched.
    pub fn set_redraw(&mut self, control: WidgetId, redraw: bool) -> Result<()> {
        self.check_widget(control)?;
        let Some(node) = self.tree.get_mut(control) else {
            return Err(MeridianError::WidgetDisposed);
        };
        let counter = &mut node.positioned.redraw_suppressed;
        if redraw {
            if *counter == 0 {
                return Ok(());
            }
            *counter -= 1;
            if *counter == 0 {
                self.invalidate_visible_region(control);
                self.pending_repaints.push((control, None));
            }
        } else {
            *counter += 1;
            if *counter == 1 {
                self.invalidate_visible_region(control);
            }
        }
        Ok(())
    }

    /// Enable or disable drag detection on `control`.
    pub fn set_drag_detect(&mut self, control: WidgetId, enabled: bool) -> Result<()> {
        self.check_widget(control)?;
        if let Some(node) = self.tree.get_mut(control) {
            node.flags.set(WidgetFlags::DRAG_DETECT, enabled);
        }
        Ok(())
    }

    /// Set the cursor shown over `control` and its descendants.
    pub fn set_cursor(&mut self, control: WidgetId, cursor: Option<CursorIcon>) -> Result<()> {
        self.check_widget(control)?;
        if let Some(node) = self.tree.get_mut(control) {
            node.positioned.cursor = cursor;
        }
        if self
            .alive(self.hover.current)
            .is_some_and(|hovered| self.tree.is_ancestor_or_self(control, hovered))
        {
            self.update_cursor();
        }
        Ok(())
    }

    /// Override the tab order of `container`'s children. `None` restores the
    /// child order.
    pub fn set_tab_list(&mut self, container: WidgetId, tab_list: Option<Vec<WidgetId>>) -> Result<()> {
        self.check_widget(container)?;
        if let Some(tab_list) = &tab_list {
            for entry in tab_list {
                if !self.tree.contains(*entry) {
                    return Err(MeridianError::InvalidArgument("tab list entry is disposed"));
                }
                if self.tree.parent(*entry) != Some(container) {
                    return Err(MeridianError::InvalidArgument("tab list entry is not a child"));
                }
            }
        }
        if let Some(node) = self.tree.get_mut(container) {
            node.tab_list = tab_list;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Z-order
    // -------------------------------------------------------------------------

    /// Restack `control` directly above `other`, or on top of its siblings.
    pub fn move_above(&mut self, control: WidgetId, other: Option<WidgetId>) -> Result<()> {
        let siblings = self.restack_siblings(control, other)?;
        let index = match other {
            Some(other) => siblings.iter().position(|s| *s == other).map_or(siblings.len(), |i| i + 1),
            None => siblings.len(),
        };
        self.restack(control, index);
        Ok(())
    }

    /// Restack `control` directly below `other`, or under all its siblings.
    pub fn move_below(&mut self, control: WidgetId, other: Option<WidgetId>) -> Result<()> {
        let siblings = self.restack_siblings(control, other)?;
        let index = match other {
            Some(other) => siblings.iter().position(|s| *s == other).unwrap_or(0),
            None => 0,
        };
        self.restack(control, index);
        Ok(())
    }

    /// Validate a restack and return the siblings of `control` without it.
    fn restack_siblings(&self, control: WidgetId, other: Option<WidgetId>) -> Result<Vec<WidgetId>> {
        self.check_widget(control)?;
        let parent = self
            .tree
            .parent(control)
            .ok_or(MeridianError::InvalidArgument("windows have no siblings"))?;
        if let Some(other) = other {
            self.check_widget(other)?;
            if other == control || self.tree.parent(other) != Some(parent) {
                return Err(MeridianError::InvalidArgument("not a sibling"));
            }
        }
        Ok(self
            .tree
            .children(parent)
            .iter()
            .copied()
            .filter(|sibling| *sibling != control)
            .collect())
    }

    fn restack(&mut self, control: WidgetId, index: usize) {
        let Some(parent) = self.tree.parent(control) else {
            return;
        };
        if self.tree.children(parent).iter().position(|c| *c == control) == Some(index) {
            return;
        }
        // Old neighbors, then new ones.
        self.invalidate_visible_region(control);
        self.tree.reorder(control, index);
        self.invalidate_visible_region(control);
    }

    // -------------------------------------------------------------------------
    // Deferred work
    // -------------------------------------------------------------------------

    /// Ask for a `Layout` event on `control` at the start of the next loop iteration.
    pub fn request_layout(&mut self, control: WidgetId) -> Result<()> {
        self.check_widget(control)?;
        if let Some(node) = self.tree.get_mut(control)
            && !node.flags.contains(WidgetFlags::LAYOUT_NEEDED)
        {
            node.flags.insert(WidgetFlags::LAYOUT_NEEDED);
            self.pending_layouts.push(control);
        }
        Ok(())
    }

    /// Queue a repaint of `rect` (or all) of `control`.
    pub fn redraw(&mut self, control: WidgetId, rect: Option<Rect>) -> Result<()> {
        self.check_widget(control)?;
        self.pending_repaints.push((control, rect));
        Ok(())
    }

    /// Queue a flush of the drawing context attached to `control`.
    pub fn flush_context(&mut self, control: WidgetId) -> Result<()> {
        self.check_widget(control)?;
        if !self.pending_contexts.contains(&control) {
            self.pending_contexts.push(control);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The parent of `widget`; `None` for windows.
    pub fn parent(&self, widget: WidgetId) -> Result<Option<WidgetId>> {
        self.check_widget(widget)?;
        Ok(self.tree.parent(widget))
    }

    /// Children of `widget`, bottom to top.
    pub fn children(&self, widget: WidgetId) -> Result<Vec<WidgetId>> {
        self.check_widget(widget)?;
        Ok(self.tree.children(widget).to_vec())
    }

    /// The window containing `widget`.
    pub fn window_of(&self, widget: WidgetId) -> Result<WidgetId> {
        self.check_widget(widget)?;
        self.tree.window_of(widget).ok_or(MeridianError::WidgetDisposed)
    }

    /// Every live top-level window, in creation order.
    pub fn windows(&self) -> Result<Vec<WidgetId>> {
        self.check_device()?;
        Ok(self.tree.windows().to_vec())
    }

    /// Whether `widget` is a top-level window.
    pub fn is_window(&self, widget: WidgetId) -> Result<bool> {
        self.check_widget(widget)?;
        Ok(self.tree.is_window(widget))
    }

    /// The widget's own visibility flag.
    pub fn is_visible(&self, widget: WidgetId) -> Result<bool> {
        self.check_widget(widget)?;
        Ok(!self.tree.flags(widget).contains(WidgetFlags::HIDDEN))
    }

    /// Whether `widget` and all its ancestors are visible.
    pub fn is_showing(&self, widget: WidgetId) -> Result<bool> {
        self.check_widget(widget)?;
        Ok(self.is_showing_unchecked(widget))
    }

    /// The widget's own enabled flag.
    pub fn is_enabled(&self, widget: WidgetId) -> Result<bool> {
        self.check_widget(widget)?;
        Ok(!self.tree.flags(widget).contains(WidgetFlags::DISABLED))
    }

    pub(crate) fn is_showing_unchecked(&self, widget: WidgetId) -> bool {
        self.tree
            .self_and_ancestors(widget)
            .iter()
            .all(|id| !self.tree.flags(*id).contains(WidgetFlags::HIDDEN))
    }

    /// Whether `widget` and all its ancestors are enabled.
    pub(crate) fn is_enabled_chain(&self, widget: WidgetId) -> bool {
        let chain = self.tree.self_and_ancestors(widget);
        !chain.is_empty()
            && chain
                .iter()
                .all(|id| !self.tree.flags(*id).contains(WidgetFlags::DISABLED))
    }

    /// Whether a visible modal window other than `window` (or one of its
    /// owners) refuses input to `window`.
    pub(crate) fn is_blocked_by_modal(&self, window: WidgetId) -> bool {
        self.tree.windows().iter().any(|modal| {
            *modal != window
                && self.tree.window_data(*modal).is_some_and(|data| data.modal)
                && !self.tree.flags(*modal).contains(WidgetFlags::HIDDEN)
                && !self.is_owned_by(window, *modal)
        })
    }

    fn is_owned_by(&self, window: WidgetId, owner: WidgetId) -> bool {
        let mut current = self.tree.window_data(window).and_then(|data| data.owner);
        while let Some(candidate) = current {
            if candidate == owner {
                return true;
            }
            current = self.tree.window_data(candidate).and_then(|data| data.owner);
        }
        false
    }
}
