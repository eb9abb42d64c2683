//! Geometry for Meridian.
//!
//! [`Point`], [`Size`], [`Rect`] and [`Insets`] are plain `f32` value types.
//! [`Region`] is an owned set of disjoint rectangles supporting union,
//! intersection and subtraction, used for visible-region clipping.

mod region;
mod types;

pub use region::Region;
pub use types::{Insets, Point, Rect, Size};
