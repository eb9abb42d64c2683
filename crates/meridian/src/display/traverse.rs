//! Keyboard traversal.
//!
//! A key press is classified into a [`TraversalAction`]. The resulting
//! `Traverse` event is offered to the originating control and then to each
//! ancestor up to the window; any listener clearing `doit` vetoes the whole
//! traversal. Otherwise the default action runs at the originating level,
//! and for radiating actions at each ancestor level until one succeeds.

use meridian_core::Result;

use super::Display;
use crate::event::{Event, EventType, Key, KeyboardModifiers, TraversalAction};
use crate::native::NativeKeyEvent;
use crate::widget::{WidgetFlags, WidgetId};

/// The traversal a key press requests, if any.
///
/// ```
/// use meridian::event::{Key, KeyboardModifiers, TraversalAction};
///
/// assert_eq!(
///     meridian::classify(Key::Tab, KeyboardModifiers::SHIFT),
///     Some(TraversalAction::TabPrevious)
/// );
/// assert_eq!(meridian::classify(Key::PageDown, KeyboardModifiers::NONE), None);
/// ```
pub fn classify(key: Key, modifiers: KeyboardModifiers) -> Option<TraversalAction> {
    match key {
        Key::Escape => Some(TraversalAction::Escape),
        Key::Enter | Key::NumpadEnter => Some(TraversalAction::Return),
        Key::Tab if modifiers.shift => Some(TraversalAction::TabPrevious),
        Key::Tab => Some(TraversalAction::TabNext),
        Key::ArrowDown | Key::ArrowRight => Some(TraversalAction::ArrowNext),
        Key::ArrowUp | Key::ArrowLeft => Some(TraversalAction::ArrowPrevious),
        Key::PageDown if modifiers.control => Some(TraversalAction::PageNext),
        Key::PageUp if modifiers.control => Some(TraversalAction::PagePrevious),
        _ => None,
    }
}

impl Display {
    /// Run `action` from `control` as if its key had been pressed.
    ///
    /// Returns whether a traversal took place.
    pub fn traverse(&mut self, control: WidgetId, action: TraversalAction) -> Result<bool> {
        self.check_widget(control)?;
        let mut event = Event::new(EventType::Traverse, control);
        event.detail = Some(action);
        event.doit = self.initial_doit(control, action);
        Ok(self.run_traversal(control, event))
    }

    /// Traversal for a key press; `true` means the key was consumed.
    pub(crate) fn traverse_key(
        &mut self,
        origin: WidgetId,
        action: TraversalAction,
        native: &NativeKeyEvent,
    ) -> bool {
        let mut event = Event::new(EventType::Traverse, origin)
            .with_key(native.key, native.character)
            .with_modifiers(native.modifiers);
        event.detail = Some(action);
        event.doit = self.initial_doit(origin, action);
        self.run_traversal(origin, event)
    }

    fn initial_doit(&self, origin: WidgetId, action: TraversalAction) -> bool {
        match action {
            TraversalAction::ArrowNext | TraversalAction::ArrowPrevious => self.is_tab_item(origin),
            _ => true,
        }
    }

    fn run_traversal(&mut self, origin: WidgetId, mut event: Event) -> bool {
        let Some(action) = event.detail else {
            return false;
        };
        // A level that clears `doit` vetoes the traversal; higher levels are
        // not offered the event.
        let doit = event.doit;
        self.run_filters(&mut event);
        if doit && !event.doit {
            tracing::debug!(target: "meridian::traverse", ?origin, ?action, "traversal vetoed by filter");
            return false;
        }
        for level in self.tree.self_and_ancestors(origin) {
            let doit = event.doit;
            self.invoke_listeners(level, &mut event);
            if !self.tree.contains(origin) {
                return true;
            }
            if doit && !event.doit {
                tracing::debug!(target: "meridian::traverse", ?origin, ?level, ?action, "traversal vetoed");
                return false;
            }
        }
        if !event.doit {
            return false;
        }

        let levels = if action.is_radiating() {
            self.tree.self_and_ancestors(origin)
        } else {
            vec![origin]
        };
        for level in levels {
            if !self.tree.contains(level) {
                break;
            }
            if self.traverse_default(level, action) {
                tracing::debug!(target: "meridian::traverse", ?origin, ?level, ?action, "traversed");
                return true;
            }
        }
        false
    }

    fn traverse_default(&mut self, level: WidgetId, action: TraversalAction) -> bool {
        match action {
            TraversalAction::TabNext | TraversalAction::TabPrevious => {
                self.traverse_group(level, action.is_next())
            }
            TraversalAction::ArrowNext | TraversalAction::ArrowPrevious => {
                self.traverse_item(level, action.is_next())
            }
            TraversalAction::Escape => self.traverse_escape(level),
            TraversalAction::Return | TraversalAction::PageNext | TraversalAction::PagePrevious => {
                false
            }
        }
    }

    /// Dialogs close on escape.
    fn traverse_escape(&mut self, level: WidgetId) -> bool {
        let is_dialog = self
            .tree
            .window_data(level)
            .is_some_and(|data| data.owner.is_some());
        if !is_dialog || !self.is_showing_unchecked(level) || !self.is_enabled_chain(level) {
            return false;
        }
        self.close_window(level);
        true
    }

    pub(crate) fn is_tab_item(&self, control: WidgetId) -> bool {
        let flags = self.tree.flags(control);
        flags.contains(WidgetFlags::FOCUSABLE) && !flags.contains(WidgetFlags::TAB_GROUP)
    }

    /// Children of `container` in tab order.
    fn tab_order(&self, container: WidgetId) -> Vec<WidgetId> {
        let Some(node) = self.tree.get(container) else {
            return Vec::new();
        };
        node.tab_list
            .clone()
            .unwrap_or_else(|| node.children.clone())
            .into_iter()
            .filter(|child| self.tree.contains(*child))
            .collect()
    }

    /// The tab order of `container`: its override, or its children.
    pub fn get_tab_list(&self, container: WidgetId) -> Result<Vec<WidgetId>> {
        self.check_widget(container)?;
        Ok(self.tab_order(container))
    }

    /// Tab groups under `root` in traversal order. A group that is hidden or
    /// disabled is skipped together with its subtree.
    fn collect_tab_groups(&self, root: WidgetId, groups: &mut Vec<WidgetId>) {
        let flags = self.tree.flags(root);
        if !flags.contains(WidgetFlags::TAB_GROUP)
            || flags.intersects(WidgetFlags::HIDDEN | WidgetFlags::DISABLED)
        {
            return;
        }
        groups.push(root);
        for child in self.tab_order(root) {
            self.collect_tab_groups(child, groups);
        }
    }

    fn traverse_group(&mut self, origin: WidgetId, next: bool) -> bool {
        let Some(window) = self.tree.window_of(origin) else {
            return false;
        };
        let mut groups = Vec::new();
        self.collect_tab_groups(window, &mut groups);
        if groups.is_empty() {
            return false;
        }
        let length = groups.len();

        let own_group = self
            .tree
            .self_and_ancestors(origin)
            .into_iter()
            .find(|node| groups.contains(node));
        let start = own_group
            .and_then(|group| groups.iter().position(|candidate| *candidate == group))
            .unwrap_or(0);

        let mut index = start;
        loop {
            index = if next {
                (index + 1) % length
            } else {
                (index + length - 1) % length
            };
            if index == start {
                break;
            }
            if self.set_tab_group_focus(groups[index]) {
                return true;
            }
            if !self.tree.contains(window) {
                return true;
            }
        }
        own_group.is_some_and(|group| self.tree.contains(group) && self.set_tab_group_focus(group))
    }

    /// Focus the first focusable tab item of `group`, or the group itself.
    fn set_tab_group_focus(&mut self, group: WidgetId) -> bool {
        if self.tree.is_window(group) && self.tree.children(group).is_empty() {
            return false;
        }
        for child in self.tab_order(group) {
            if self.is_tab_item(child) && self.can_take_focus(child) && self.focus_control(child) {
                return true;
            }
        }
        !self.tree.is_window(group) && self.can_take_focus(group) && self.focus_control(group)
    }

    fn traverse_item(&mut self, origin: WidgetId, next: bool) -> bool {
        let Some(parent) = self.tree.parent(origin) else {
            return false;
        };
        let items: Vec<WidgetId> = self
            .tab_order(parent)
            .into_iter()
            .filter(|child| self.is_tab_item(*child))
            .collect();
        let Some(start) = items.iter().position(|item| *item == origin) else {
            return false;
        };
        let length = items.len();
        let mut index = start;
        loop {
            index = if next {
                (index + 1) % length
            } else {
                (index + length - 1) % length
            };
            if index == start {
                return false;
            }
            let candidate = items[index];
            if self.tree.contains(candidate)
                && self.can_take_focus(candidate)
                && self.focus_control(candidate)
            {
                return true;
            }
        }
    }
}
