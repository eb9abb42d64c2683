//! Visible-region cache.
//!
//! A control's visible region is its viewport-clipped bounds, clipped again
//! by every ancestor, minus whatever its siblings and its ancestors' siblings
//! draw above it. Regions are computed lazily in window space, converted to
//! the control's local space and cached on the node until invalidated.
//!
//! Invalidation is asymmetric. Changing a control can only affect regions
//! that are occluded by it, so only the control's subtree and the siblings
//! drawn below it (at every ancestor level) are reset. Siblings drawn above
//! keep their cache.

use meridian_core::Result;
use meridian_geometry::{Rect, Region};

use super::Display;
use crate::widget::{WidgetFlags, WidgetId};

impl Display {
    /// Cached visible region of `control`, computed on demand.
    #[tracing::instrument(skip(self), target = "meridian::region", level = "trace")]
    pub(crate) fn visible_region(&mut self, control: WidgetId) -> Region {
        if let Some(region) = self
            .tree
            .get(control)
            .and_then(|node| node.visible_region.clone())
        {
            return region;
        }
        let region = self.compute_visible_region(control);
        if let Some(node) = self.tree.get_mut(control) {
            node.visible_region = Some(region.clone());
        }
        region
    }

    /// Whether `control` and all its ancestors are drawing.
    fn is_drawing(&self, control: WidgetId) -> bool {
        self.tree.self_and_ancestors(control).iter().all(|id| {
            self.tree.get(*id).is_some_and(|node| {
                !node.flags.contains(WidgetFlags::HIDDEN) && node.positioned.redraw_suppressed == 0
            })
        })
    }

    fn compute_visible_region(&self, control: WidgetId) -> Region {
        let Some(node) = self.tree.get(control) else {
            return Region::new();
        };
        if !self.is_drawing(control) {
            return Region::new();
        }

        let origin = self.tree.origin_in_window(control);
        let mut region = Region::from_rect(node.positioned.visible_rect().offset(origin.x, origin.y));
        let mut occluders = Region::new();

        let mut child = control;
        while let Some(parent) = self.tree.parent(child) {
            let Some(parent_node) = self.tree.get(parent) else {
                break;
            };
            let parent_origin = self.tree.origin_in_window(parent);
            region.intersect_rect(
                parent_node
                    .positioned
                    .visible_rect()
                    .offset(parent_origin.x, parent_origin.y),
            );

            let siblings = &parent_node.children;
            if let Some(index) = siblings.iter().position(|sibling| *sibling == child) {
                for sibling in &siblings[index + 1..] {
                    let Some(sibling) = self.tree.get(*sibling) else {
                        continue;
                    };
                    if sibling.flags.contains(WidgetFlags::HIDDEN) {
                        continue;
                    }
                    let at = parent_origin + sibling.positioned.frame.origin;
                    occluders.union_rect(sibling.positioned.visible_rect().offset(at.x, at.y));
                }
            }
            child = parent;
        }

        let mut region = region.subtract(&occluders);
        region.translate(-origin.x, -origin.y);
        if !node.is_flipped() {
            region.flip_vertical(node.positioned.frame.height());
        }
        region
    }

    /// Reset the cache of `control`'s subtree and of everything drawn below it.
    pub(crate) fn invalidate_visible_region(&mut self, control: WidgetId) {
        let mut reset = self.tree.subtree(control);
        let mut child = control;
        while let Some(parent) = self.tree.parent(child) {
            let siblings = self.tree.children(parent).to_vec();
            if let Some(index) = siblings.iter().position(|sibling| *sibling == child) {
                for sibling in &siblings[..index] {
                    reset.extend(self.tree.subtree(*sibling));
                }
            }
            child = parent;
        }
        tracing::trace!(target: "meridian::region", ?control, count = reset.len(), "visible regions invalidated");
        for id in reset {
            if let Some(node) = self.tree.get_mut(id) {
                node.visible_region = None;
            }
        }
    }

    /// The part of `control` that is actually visible, in its local space.
    pub fn get_visible_region(&mut self, control: WidgetId) -> Result<Region> {
        self.check_widget(control)?;
        Ok(self.visible_region(control))
    }

    /// Whether `control` has a valid cached visible region.
    pub fn is_visible_region_cached(&self, control: WidgetId) -> Result<bool> {
        self.check_widget(control)?;
        Ok(self
            .tree
            .get(control)
            .is_some_and(|node| node.visible_region.is_some()))
    }

    /// Whether any part of `control`'s client area is hidden or covered.
    pub fn is_obscured(&mut self, control: WidgetId) -> Result<bool> {
        self.check_widget(control)?;
        let Some(node) = self.tree.get(control) else {
            return Ok(true);
        };
        let mut rect = node.positioned.visible_rect();
        if !node.is_flipped() {
            rect = Rect::new(
                rect.left(),
                node.positioned.frame.height() - rect.bottom(),
                rect.width(),
                rect.height(),
            );
        }
        if rect.is_empty() {
            return Ok(false);
        }
        Ok(!self.visible_region(control).covers(&rect))
    }
}
