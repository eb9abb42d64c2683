//! The widget tree.
//!
//! Widgets live in an arena owned by the [`Display`](crate::Display) and are
//! addressed by generation-checked [`WidgetId`]s. A disposed widget is simply
//! one whose id no longer resolves, so a stale id held by application code or
//! a tracker can be detected without touching freed state.
//!
//! Each node is composed of capabilities rather than a class hierarchy:
//!
//! - the widget capability (listener table, state flags)
//! - [`Positioned`] (frame, flip flag, viewport, trim, cursor, redraw counter)
//! - the focus capability, expressed through [`WidgetFlags::FOCUSABLE`] and
//!   [`WidgetFlags::TAB_GROUP`]
//! - [`WindowData`] for top-level windows
//!
//! Children are stored back-to-front: a later child is drawn above an
//! earlier one. Frames are in the parent's top-down coordinates; a window's
//! frame is its content rectangle in screen coordinates.

mod config;
mod listener;

use cursor_icon::CursorIcon;
use meridian_geometry::{Insets, Point, Rect, Region};
use slotmap::{SlotMap, new_key_type};

pub use config::{ControlConfig, WindowConfig};
pub use listener::{Listener, ListenerError, ListenerId, ListenerResult};
pub(crate) use listener::ListenerTable;

new_key_type! {
    /// A unique, generation-checked identifier for a widget.
    pub struct WidgetId;
}

bitflags::bitflags! {
    /// Boolean widget state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WidgetFlags: u32 {
        /// Input is refused by this widget and its descendants.
        const DISABLED = 1 << 0;
        /// Hidden independently of ancestor visibility.
        const HIDDEN = 1 << 1;
        /// A primary press may start a drag gesture.
        const DRAG_DETECT = 1 << 2;
        /// Can take keyboard focus.
        const FOCUSABLE = 1 << 3;
        /// A stop of its own in tab order.
        const TAB_GROUP = 1 << 4;
        /// Origin is top-left rather than bottom-left.
        const FLIPPED = 1 << 5;
        /// A deferred layout is pending.
        const LAYOUT_NEEDED = 1 << 6;
        /// Dispose is in progress.
        const RELEASING = 1 << 7;
    }
}

/// Geometry capability shared by windows and controls.
#[derive(Debug, Clone)]
pub(crate) struct Positioned {
    pub(crate) frame: Rect,
    pub(crate) viewport: Option<Rect>,
    pub(crate) trim: Insets,
    pub(crate) cursor: Option<CursorIcon>,
    pub(crate) redraw_suppressed: u32,
}

impl Positioned {
    /// The client rectangle in top-down local coordinates.
    pub(crate) fn bounds(&self) -> Rect {
        Rect::from_size(self.frame.size)
    }

    /// Bounds clipped by the viewport.
    pub(crate) fn visible_rect(&self) -> Rect {
        let bounds = self.bounds();
        match self.viewport {
            Some(viewport) => bounds.intersect(&viewport).unwrap_or(Rect::ZERO),
            None => bounds,
        }
    }
}

/// Top-level window capability.
#[derive(Debug, Clone, Default)]
pub(crate) struct WindowData {
    pub(crate) owner: Option<WidgetId>,
    pub(crate) modal: bool,
    /// Control to give focus back to when the window is activated.
    pub(crate) saved_focus: Option<WidgetId>,
    /// Leaf of the current activation path.
    pub(crate) active_control: Option<WidgetId>,
}

/// One widget in the arena.
pub(crate) struct WidgetNode {
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    pub(crate) flags: WidgetFlags,
    pub(crate) listeners: ListenerTable,
    pub(crate) positioned: Positioned,
    pub(crate) visible_region: Option<Region>,
    pub(crate) tab_list: Option<Vec<WidgetId>>,
    pub(crate) window: Option<WindowData>,
}

impl WidgetNode {
    pub(crate) fn for_window(config: &WindowConfig) -> Self {
        let mut flags = WidgetFlags::FOCUSABLE | WidgetFlags::TAB_GROUP;
        flags.set(WidgetFlags::FLIPPED, config.flipped);
        flags.set(WidgetFlags::HIDDEN, !config.visible);
        Self {
            parent: None,
            children: Vec::new(),
            flags,
            listeners: ListenerTable::default(),
            positioned: Positioned {
                frame: config.frame,
                viewport: None,
                trim: config.trim,
                cursor: None,
                redraw_suppressed: 0,
            },
            visible_region: None,
            tab_list: None,
            window: Some(WindowData {
                owner: config.owner,
                modal: config.modal,
                ..Default::default()
            }),
        }
    }

    pub(crate) fn for_control(parent: WidgetId, config: &ControlConfig) -> Self {
        let mut flags = WidgetFlags::empty();
        flags.set(WidgetFlags::FLIPPED, config.flipped);
        flags.set(WidgetFlags::HIDDEN, !config.visible);
        flags.set(WidgetFlags::DISABLED, !config.enabled);
        flags.set(WidgetFlags::FOCUSABLE, config.focusable);
        flags.set(WidgetFlags::TAB_GROUP, config.tab_group);
        flags.set(WidgetFlags::DRAG_DETECT, config.drag_detect);
        Self {
            parent: Some(parent),
            children: Vec::new(),
            flags,
            listeners: ListenerTable::default(),
            positioned: Positioned {
                frame: config.frame,
                viewport: config.viewport,
                trim: config.trim,
                cursor: config.cursor,
                redraw_suppressed: 0,
            },
            visible_region: None,
            tab_list: None,
            window: None,
        }
    }

    pub(crate) fn is_flipped(&self) -> bool {
        self.flags.contains(WidgetFlags::FLIPPED)
    }
}

/// Arena of widgets plus the list of top-level windows in creation order.
#[derive(Default)]
pub(crate) struct WidgetTree {
    nodes: SlotMap<WidgetId, WidgetNode>,
    windows: Vec<WidgetId>,
}

impl WidgetTree {
    pub(crate) fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn get(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetNode> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn windows(&self) -> &[WidgetId] {
        &self.windows
    }

    pub(crate) fn insert_window(&mut self, node: WidgetNode) -> WidgetId {
        let id = self.nodes.insert(node);
        self.windows.push(id);
        id
    }

    /// Insert `node` as the topmost child of its parent.
    pub(crate) fn insert_child(&mut self, node: WidgetNode) -> Option<WidgetId> {
        let parent = node.parent?;
        if !self.contains(parent) {
            return None;
        }
        let id = self.nodes.insert(node);
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.push(id);
        }
        Some(id)
    }

    pub(crate) fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub(crate) fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn flags(&self, id: WidgetId) -> WidgetFlags {
        self.nodes
            .get(id)
            .map(|node| node.flags)
            .unwrap_or_default()
    }

    pub(crate) fn is_window(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.window.is_some())
    }

    pub(crate) fn window_data(&self, id: WidgetId) -> Option<&WindowData> {
        self.nodes.get(id).and_then(|node| node.window.as_ref())
    }

    pub(crate) fn window_data_mut(&mut self, id: WidgetId) -> Option<&mut WindowData> {
        self.nodes.get_mut(id).and_then(|node| node.window.as_mut())
    }

    /// `id` followed by each ancestor up to and including its window.
    pub(crate) fn self_and_ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut chain = Vec::new();
        let mut current = Some(id).filter(|id| self.contains(*id));
        while let Some(node) = current {
            chain.push(node);
            current = self.parent(node);
        }
        chain
    }

    /// The top-level window containing `id` (a window is its own).
    pub(crate) fn window_of(&self, id: WidgetId) -> Option<WidgetId> {
        self.self_and_ancestors(id).last().copied()
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Origin of `id` in its window's top-down content coordinates.
    pub(crate) fn origin_in_window(&self, id: WidgetId) -> Point {
        let mut origin = Point::ZERO;
        let mut current = id;
        while let Some(node) = self.nodes.get(current) {
            let Some(parent) = node.parent else {
                break;
            };
            origin = origin + node.positioned.frame.origin;
            current = parent;
        }
        origin
    }

    /// `id` and every descendant, parents before children.
    pub(crate) fn subtree(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if !self.contains(node) {
                continue;
            }
            result.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        result
    }

    /// Remove `id` and its descendants; returns them children first.
    pub(crate) fn remove_subtree(&mut self, id: WidgetId) -> Vec<WidgetId> {
        let mut removed = self.subtree(id);
        removed.reverse();
        if let Some(parent) = self.parent(id)
            && let Some(parent) = self.nodes.get_mut(parent)
        {
            parent.children.retain(|child| *child != id);
        }
        self.windows.retain(|window| *window != id);
        for node in &removed {
            self.nodes.remove(*node);
        }
        // Drop stale tab-list entries that pointed at removed children.
        for node in self.nodes.values_mut() {
            if let Some(tab_list) = &mut node.tab_list {
                tab_list.retain(|entry| !removed.contains(entry));
            }
        }
        removed
    }

    /// Move `child` to `index` among its siblings. Returns `false` if `child`
    /// has no parent.
    pub(crate) fn reorder(&mut self, child: WidgetId, index: usize) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        let Some(parent) = self.nodes.get_mut(parent) else {
            return false;
        };
        parent.children.retain(|sibling| *sibling != child);
        let index = index.min(parent.children.len());
        parent.children.insert(index, child);
        true
    }
}
