//! Keyboard focus and window activation.
//!
//! The platform's first responder is the authority; the tracker compares it
//! with the last known focus control once per loop iteration and synthesizes
//! the `FocusOut`/`FocusIn` pair. A momentarily missing responder while the
//! same window stays key is a platform glitch and keeps the prior state.

use meridian_core::Result;

use super::Display;
use crate::event::{Event, EventType};
use crate::widget::{WidgetFlags, WidgetId};

#[derive(Debug, Default)]
pub(crate) struct FocusState {
    /// The control that last received `FocusIn`.
    pub(crate) control: Option<WidgetId>,
    /// A focus transition is being delivered.
    pub(crate) in_flight: bool,
    /// Set while a frame change is pushed to the platform.
    pub(crate) ignore_focus: bool,
}

impl Display {
    /// Reconcile the tracked focus control with the platform responder.
    pub(crate) fn check_focus(&mut self) {
        if self.focus.in_flight || self.focus.ignore_focus {
            return;
        }
        self.focus.in_flight = true;
        for _ in 0..self.config.max_focus_passes {
            if !self.focus_pass() {
                break;
            }
        }
        self.focus.in_flight = false;
    }

    /// Returns whether a transition was delivered.
    fn focus_pass(&mut self) -> bool {
        let old = self.alive(self.focus.control);
        let new = self.alive(self.platform.first_responder());
        if old == new {
            self.focus.control = old;
            return false;
        }

        let old_window = old.and_then(|old| self.tree.window_of(old));
        if new.is_none()
            && old_window.is_some()
            && self.platform.is_application_active()
            && self.platform.key_window() == old_window
        {
            tracing::trace!(target: "meridian::focus", ?old, "ignoring transient empty responder");
            return false;
        }

        tracing::debug!(target: "meridian::focus", ?old, ?new, "focus transition");
        if let Some(old) = old {
            let mut event = Event::new(EventType::FocusOut, old);
            self.send_event(old, &mut event);
        }
        self.focus.control = new;

        let mut new_window = None;
        if let Some(new) = self.alive(new) {
            let mut event = Event::new(EventType::FocusIn, new);
            self.send_event(new, &mut event);
            new_window = self.alive(self.tree.window_of(new));
            if let (Some(window), Some(new)) = (new_window, self.alive(Some(new))) {
                self.set_active_control(window, Some(new));
            }
        }
        if let Some(old_window) = self.alive(old_window)
            && Some(old_window) != new_window
            && self.active_window != Some(old_window)
        {
            self.set_active_control(old_window, None);
        }
        true
    }

    /// The control that currently has keyboard focus.
    pub fn get_focus_control(&self) -> Result<Option<WidgetId>> {
        self.check_device()?;
        Ok(self.alive(self.focus.control))
    }

    /// Whether `control` has keyboard focus.
    pub fn is_focus_control(&self, control: WidgetId) -> Result<bool> {
        self.check_widget(control)?;
        Ok(self.focus.control == Some(control))
    }

    /// Whether `control` may receive focus right now.
    pub(crate) fn can_take_focus(&self, control: WidgetId) -> bool {
        let Some(window) = self.tree.window_of(control) else {
            return false;
        };
        self.tree.flags(control).contains(WidgetFlags::FOCUSABLE)
            && self.is_enabled_chain(control)
            && self.is_showing_unchecked(control)
            && !self.is_blocked_by_modal(window)
    }

    /// Ask the platform to give `control` keyboard focus, activating its window.
    ///
    /// Returns `false` without side effects if the control, an ancestor or
    /// its window is disabled, hidden or blocked by a modal window.
    pub fn force_focus(&mut self, control: WidgetId) -> Result<bool> {
        self.check_widget(control)?;
        Ok(self.focus_control(control))
    }

    pub(crate) fn focus_control(&mut self, control: WidgetId) -> bool {
        if !self.can_take_focus(control) {
            return false;
        }
        let Some(window) = self.tree.window_of(control) else {
            return false;
        };
        if self.focus.control == Some(control) && self.platform.first_responder() == Some(control)
        {
            return true;
        }

        // Bringing the window forward may activate it synchronously, and
        // activation restores the saved focus.
        if let Some(data) = self.tree.window_data_mut(window) {
            data.saved_focus = Some(control);
        }
        self.bring_to_top(window);
        if !self.tree.contains(control) || !self.platform.make_first_responder(window, control) {
            return false;
        }
        self.check_focus();
        true
    }

    /// Make `window` the active window.
    pub(crate) fn bring_to_top(&mut self, window: WidgetId) {
        if self.active_window == Some(window) && self.platform.key_window() == Some(window) {
            return;
        }
        let previous = self.alive(self.active_window);
        self.platform.make_key_and_order_front(window);
        if let Some(previous) = previous
            && previous != window
        {
            self.window_deactivated(previous);
        }
        self.window_activated(window);
    }

    /// A window became key.
    pub(crate) fn window_activated(&mut self, window: WidgetId) {
        if !self.tree.contains(window) || self.active_window == Some(window) {
            return;
        }
        tracing::debug!(target: "meridian::focus", ?window, "window activated");
        self.active_window = Some(window);
        let mut event = Event::new(EventType::Activate, window);
        self.send_event(window, &mut event);
        self.restore_focus(window);
    }

    /// A window stopped being key.
    pub(crate) fn window_deactivated(&mut self, window: WidgetId) {
        if !self.tree.contains(window) {
            return;
        }
        tracing::debug!(target: "meridian::focus", ?window, "window deactivated");
        if self.active_window == Some(window) {
            self.active_window = None;
        }
        if let Some(focus) = self.alive(self.focus.control)
            && self.tree.window_of(focus) == Some(window)
            && focus != window
            && let Some(data) = self.tree.window_data_mut(window)
        {
            data.saved_focus = Some(focus);
        }
        let mut event = Event::new(EventType::Deactivate, window);
        self.send_event(window, &mut event);
        if self.tree.contains(window) {
            self.set_active_control(window, None);
        }
    }

    fn restore_focus(&mut self, window: WidgetId) {
        let saved = self
            .tree
            .window_data(window)
            .and_then(|data| data.saved_focus)
            .filter(|saved| self.tree.contains(*saved));
        if let Some(data) = self.tree.window_data_mut(window) {
            data.saved_focus = saved;
        }
        if let Some(saved) = saved
            && self.can_take_focus(saved)
        {
            self.platform.make_first_responder(window, saved);
        }
    }

    /// Move `window`'s activation path to end at `control`.
    ///
    /// Controls leaving the path get `Deactivate` and controls joining it
    /// get `Activate`, leaf first. The window itself is not part of the path.
    pub(crate) fn set_active_control(&mut self, window: WidgetId, control: Option<WidgetId>) {
        let control = self.alive(control).filter(|control| *control != window);
        let Some(data) = self.tree.window_data(window) else {
            return;
        };
        let previous = self.alive(data.active_control);
        if previous == control {
            return;
        }
        if let Some(data) = self.tree.window_data_mut(window) {
            data.active_control = control;
        }

        let path = |display: &Display, leaf: Option<WidgetId>| -> Vec<WidgetId> {
            let mut path = leaf
                .map(|leaf| display.tree.self_and_ancestors(leaf))
                .unwrap_or_default();
            path.retain(|node| *node != window);
            path.reverse();
            path
        };
        let deactivate = path(self, previous);
        let activate = path(self, control);
        let common = deactivate
            .iter()
            .zip(&activate)
            .take_while(|(a, b)| a == b)
            .count();

        for node in deactivate[common..].iter().rev() {
            self.send_activation(*node, EventType::Deactivate);
        }
        for node in activate[common..].iter().rev() {
            self.send_activation(*node, EventType::Activate);
        }
    }

    fn send_activation(&mut self, control: WidgetId, event_type: EventType) {
        if self.tree.contains(control)
            && (self.hooks_unchecked(control, event_type) || self.filters.hooks(event_type))
        {
            let mut event = Event::new(event_type, control);
            self.send_event(control, &mut event);
        }
    }

    /// The window receiving key input, as far as this display knows.
    pub fn get_active_window(&self) -> Result<Option<WidgetId>> {
        self.check_device()?;
        Ok(self.alive(self.active_window))
    }
}
