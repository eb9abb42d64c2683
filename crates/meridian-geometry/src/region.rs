//! Region algebra over sets of rectangles.
//!
//! A [`Region`] is stored as a list of pairwise-disjoint, non-empty
//! rectangles. Every operation keeps that invariant, so area and coverage
//! queries never double count. Regions are built incrementally: start from
//! one rectangle and fold further rectangles in with
//! [`union_rect`](Region::union_rect), [`intersect_rect`](Region::intersect_rect)
//! and [`subtract_rect`](Region::subtract_rect).
//!
//! # Example
//!
//! ```
//! use meridian_geometry::{Rect, Region};
//!
//! let mut visible = Region::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
//! let mut occluders = Region::new();
//! occluders.union_rect(Rect::new(50.0, 0.0, 50.0, 100.0));
//!
//! visible = visible.subtract(&occluders);
//! assert_eq!(visible.area(), 5000.0);
//! assert!(!visible.contains((75.0, 10.0).into()));
//! ```

use crate::types::{Point, Rect};

/// An owned set of points described by disjoint rectangles.
#[derive(Debug, Clone, Default)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// The empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// A region covering one rectangle. Degenerate rectangles give the empty region.
    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.union_rect(rect);
        region
    }

    /// The disjoint rectangles making up this region.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Whether the region covers no points.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Total covered area.
    pub fn area(&self) -> f32 {
        self.rects.iter().map(Rect::area).sum()
    }

    /// Whether `point` is inside the region.
    pub fn contains(&self, point: Point) -> bool {
        self.rects.iter().any(|rect| rect.contains(point))
    }

    /// Whether every point of `rect` is inside the region.
    pub fn covers(&self, rect: &Rect) -> bool {
        if rect.is_empty() {
            return true;
        }
        let mut remaining = vec![*rect];
        for covered in &self.rects {
            remaining = remaining
                .into_iter()
                .flat_map(|piece| piece.subtract(covered))
                .collect();
            if remaining.is_empty() {
                return true;
            }
        }
        remaining.is_empty()
    }

    /// The bounding box, or `None` for the empty region.
    pub fn bounds(&self) -> Option<Rect> {
        let mut rects = self.rects.iter();
        let first = *rects.next()?;
        Some(rects.fold(first, |acc, rect| acc.union(rect)))
    }

    /// Add `rect` to the region.
    pub fn union_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut fresh = vec![rect];
        for existing in &self.rects {
            fresh = fresh
                .into_iter()
                .flat_map(|piece| piece.subtract(existing))
                .collect();
            if fresh.is_empty() {
                return;
            }
        }
        self.rects.extend(fresh);
    }

    /// Clip the region to `rect`.
    pub fn intersect_rect(&mut self, rect: Rect) {
        self.rects = self
            .rects
            .iter()
            .filter_map(|existing| existing.intersect(&rect))
            .collect();
    }

    /// Remove `rect` from the region.
    pub fn subtract_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.rects = self
            .rects
            .iter()
            .flat_map(|existing| existing.subtract(&rect))
            .collect();
    }

    /// Points in either region.
    pub fn union(&self, other: &Region) -> Region {
        let mut result = self.clone();
        for rect in &other.rects {
            result.union_rect(*rect);
        }
        result
    }

    /// Points in both regions.
    pub fn intersect(&self, other: &Region) -> Region {
        let rects = self
            .rects
            .iter()
            .flat_map(|a| other.rects.iter().filter_map(move |b| a.intersect(b)))
            .collect();
        // Pieces of disjoint rects clipped by disjoint rects stay disjoint.
        Region { rects }
    }

    /// Points in this region but not in `other`.
    pub fn subtract(&self, other: &Region) -> Region {
        let mut result = self.clone();
        for rect in &other.rects {
            if result.is_empty() {
                break;
            }
            result.subtract_rect(*rect);
        }
        result
    }

    /// Shift every rectangle by `(dx, dy)`.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for rect in &mut self.rects {
            *rect = rect.offset(dx, dy);
        }
    }

    /// Mirror the region vertically inside a space of the given height,
    /// converting between top-down and bottom-up coordinates.
    pub fn flip_vertical(&mut self, height: f32) {
        for rect in &mut self.rects {
            rect.origin.y = height - rect.bottom();
        }
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

/// Regions compare by the set of points they cover, not by decomposition.
impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.subtract(other).is_empty() && other.subtract(self).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_disjoint(region: &Region) {
        let rects = region.rects();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(a.intersect(b).is_none(), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_degenerate_rect_contributes_nothing() {
        let mut region = Region::from_rect(Rect::new(0.0, 0.0, 0.0, 10.0));
        assert!(region.is_empty());
        region.union_rect(Rect::new(5.0, 5.0, 10.0, -3.0));
        assert!(region.is_empty());
    }

    #[test]
    fn test_union_of_overlapping_rects_stays_disjoint() {
        let mut region = Region::from_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        region.union_rect(Rect::new(10.0, 10.0, 20.0, 20.0));
        region.union_rect(Rect::new(5.0, 5.0, 5.0, 5.0));

        assert_disjoint(&region);
        assert_eq!(region.area(), 400.0 + 400.0 - 100.0);
        assert_eq!(region.bounds(), Some(Rect::new(0.0, 0.0, 30.0, 30.0)));
    }

    #[test]
    fn test_intersect_regions() {
        let mut a = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        a.union_rect(Rect::new(20.0, 0.0, 10.0, 10.0));
        let b = Region::from_rect(Rect::new(5.0, 0.0, 20.0, 5.0));

        let both = a.intersect(&b);
        assert_eq!(both.area(), 25.0 + 25.0);
        assert!(both.contains(Point::new(6.0, 1.0)));
        assert!(!both.contains(Point::new(15.0, 1.0)));
    }

    #[test]
    fn test_subtract_leaves_frame() {
        let outer = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let inner = Region::from_rect(Rect::new(1.0, 1.0, 8.0, 8.0));
        let frame = outer.subtract(&inner);

        assert_disjoint(&frame);
        assert_eq!(frame.area(), 36.0);
        assert!(frame.contains(Point::new(0.5, 5.0)));
        assert!(!frame.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_covers() {
        let mut region = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        region.union_rect(Rect::new(10.0, 0.0, 10.0, 10.0));
        assert!(region.covers(&Rect::new(5.0, 2.0, 10.0, 5.0)));
        assert!(!region.covers(&Rect::new(5.0, 2.0, 20.0, 5.0)));
    }

    #[test]
    fn test_equality_ignores_decomposition() {
        let mut split = Region::from_rect(Rect::new(0.0, 0.0, 5.0, 10.0));
        split.union_rect(Rect::new(5.0, 0.0, 5.0, 10.0));
        assert_eq!(split, Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_ne!(split, Region::new());
    }

    #[test]
    fn test_flip_vertical() {
        let mut region = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 20.0));
        region.flip_vertical(100.0);
        assert_eq!(region, Region::from_rect(Rect::new(0.0, 80.0, 10.0, 20.0)));
    }
}
