//! Coordinate mapping and hit-testing.
//!
//! Three spaces are involved: a widget's local space (bottom-up when the
//! widget is not flipped), its window's top-down content space, and the
//! screen. Windows sharing a screen are mapped through it; widgets sharing a
//! window skip the screen round-trip.

use cursor_icon::CursorIcon;
use meridian_core::{MeridianError, Result};
use meridian_geometry::{Point, Rect};

use super::Display;
use crate::widget::{WidgetFlags, WidgetId};

impl Display {
    /// Map a local point of `widget` into its window's top-down space.
    pub(crate) fn local_to_window(&self, widget: WidgetId, point: Point) -> Point {
        let Some(node) = self.tree.get(widget) else {
            return point;
        };
        let point = if node.is_flipped() {
            point
        } else {
            Point::new(point.x, node.positioned.frame.height() - point.y)
        };
        self.tree.origin_in_window(widget) + point
    }

    /// Map a point in the window's top-down space into `widget`'s local space.
    pub(crate) fn window_to_local(&self, widget: WidgetId, point: Point) -> Point {
        let Some(node) = self.tree.get(widget) else {
            return point;
        };
        let point = point - self.tree.origin_in_window(widget);
        if node.is_flipped() {
            point
        } else {
            Point::new(point.x, node.positioned.frame.height() - point.y)
        }
    }

    pub(crate) fn window_to_screen(&self, window: WidgetId, point: Point) -> Point {
        self.tree
            .get(window)
            .map_or(point, |node| node.positioned.frame.origin + point)
    }

    pub(crate) fn screen_to_window(&self, window: WidgetId, point: Point) -> Point {
        self.tree
            .get(window)
            .map_or(point, |node| point - node.positioned.frame.origin)
    }

    pub(crate) fn screen_to_local(&self, widget: WidgetId, point: Point) -> Point {
        match self.tree.window_of(widget) {
            Some(window) => self.window_to_local(widget, self.screen_to_window(window, point)),
            None => point,
        }
    }

    pub(crate) fn local_to_screen(&self, widget: WidgetId, point: Point) -> Point {
        match self.tree.window_of(widget) {
            Some(window) => self.window_to_screen(window, self.local_to_window(widget, point)),
            None => point,
        }
    }

    fn map_unchecked(&self, from: Option<WidgetId>, to: Option<WidgetId>, point: Point) -> Point {
        if from == to {
            return point;
        }
        let from_window = from.and_then(|from| self.tree.window_of(from));
        let to_window = to.and_then(|to| self.tree.window_of(to));
        match (from, to) {
            (Some(from), Some(to)) if from_window == to_window => {
                self.window_to_local(to, self.local_to_window(from, point))
            }
            _ => {
                let screen = match from {
                    Some(from) => self.local_to_screen(from, point),
                    None => point,
                };
                match to {
                    Some(to) => self.screen_to_local(to, screen),
                    None => screen,
                }
            }
        }
    }

    fn check_mapping(&self, from: Option<WidgetId>, to: Option<WidgetId>) -> Result<()> {
        self.check_device()?;
        for widget in [from, to].into_iter().flatten() {
            if !self.tree.contains(widget) {
                return Err(MeridianError::InvalidArgument("widget is disposed"));
            }
        }
        Ok(())
    }

    /// Convert `point` from `from`'s local space to `to`'s. `None` is the screen.
    pub fn map_point(
        &self,
        from: Option<WidgetId>,
        to: Option<WidgetId>,
        point: Point,
    ) -> Result<Point> {
        self.check_mapping(from, to)?;
        Ok(self.map_unchecked(from, to, point))
    }

    /// Convert `rect` between local spaces.
    ///
    /// Both corners go through the full transform, so a flip mismatch yields
    /// a normalized rectangle rather than one with negative height.
    pub fn map_rect(&self, from: Option<WidgetId>, to: Option<WidgetId>, rect: Rect) -> Result<Rect> {
        self.check_mapping(from, to)?;
        let origin = self.map_unchecked(from, to, rect.origin);
        let corner = self.map_unchecked(from, to, rect.bottom_right());
        Ok(Rect::from_corners(origin, corner))
    }

    /// The deepest visible control under `point`, given in `window`'s local
    /// space. With `check_trim`, a point on a control's trim hits nothing.
    pub fn find_control(
        &self,
        window: WidgetId,
        point: Point,
        check_trim: bool,
    ) -> Result<Option<WidgetId>> {
        self.check_widget(window)?;
        if !self.tree.is_window(window) {
            return Err(MeridianError::InvalidArgument("not a window"));
        }
        let point = self.local_to_window(window, point);
        Ok(self.hit_test(window, point, check_trim))
    }

    /// Hit-test a point in `window`'s top-down space.
    pub(crate) fn hit_test(&self, window: WidgetId, point: Point, check_trim: bool) -> Option<WidgetId> {
        let node = self.tree.get(window)?;
        if node.flags.contains(WidgetFlags::HIDDEN) || !node.positioned.bounds().contains(point) {
            return None;
        }
        self.hit_test_within(window, point, check_trim)
    }

    fn hit_test_within(&self, widget: WidgetId, point: Point, check_trim: bool) -> Option<WidgetId> {
        let node = self.tree.get(widget)?;
        let clipped = node
            .positioned
            .viewport
            .is_some_and(|viewport| !viewport.contains(point));
        if !clipped {
            for child in node.children.iter().rev() {
                let Some(child_node) = self.tree.get(*child) else {
                    continue;
                };
                if child_node.flags.contains(WidgetFlags::HIDDEN) {
                    continue;
                }
                let frame = child_node.positioned.frame;
                if frame.contains(point) {
                    return self.hit_test_within(*child, point - frame.origin, check_trim);
                }
            }
        }
        if check_trim {
            let client = node.positioned.bounds().inset(node.positioned.trim);
            if !client.contains(point) {
                return None;
            }
        }
        Some(widget)
    }

    /// The cursor shown over `control`: its own, else the nearest ancestor's.
    pub fn effective_cursor(&self, control: WidgetId) -> Result<CursorIcon> {
        self.check_widget(control)?;
        Ok(self.effective_cursor_unchecked(Some(control)))
    }

    pub(crate) fn effective_cursor_unchecked(&self, control: Option<WidgetId>) -> CursorIcon {
        control
            .map(|control| self.tree.self_and_ancestors(control))
            .unwrap_or_default()
            .into_iter()
            .find_map(|node| self.tree.get(node).and_then(|node| node.positioned.cursor))
            .unwrap_or(CursorIcon::Default)
    }
}
