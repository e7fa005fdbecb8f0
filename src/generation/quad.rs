//! Axis-aligned rectangles in tile units.
//!
//! A [`Quad`] stores its two opposite corners: `position` (south-west) and
//! `bounds` (north-east). It does not validate itself; every producer in this
//! crate keeps `bounds >= position` on both axes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Integer 2D coordinate or extent. +y points north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component on the given axis
    pub fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Component-wise `>=`
    pub fn covers(&self, other: Point) -> bool {
        self.x >= other.x && self.y >= other.y
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Corridor axis: `X` runs east-west, `Y` runs north-south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Closed interval `[lo, hi]` on one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub lo: i32,
    pub hi: i32,
}

impl Span {
    pub fn new(lo: i32, hi: i32) -> Self {
        Self { lo, hi }
    }

    pub fn len(&self) -> i32 {
        self.hi - self.lo
    }

    pub fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }

    /// Shared part of two spans (may be inverted when they are apart)
    pub fn overlap(&self, other: Span) -> Span {
        Span::new(self.lo.max(other.lo), self.hi.min(other.hi))
    }

    /// True when the open interiors do not intersect
    pub fn is_disjoint(&self, other: Span) -> bool {
        self.hi <= other.lo || other.hi <= self.lo
    }
}

/// Axis-aligned rectangle spanning `[position, bounds]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quad {
    pub position: Point,
    pub bounds: Point,
}

impl Quad {
    pub const fn new(position: Point, bounds: Point) -> Self {
        Self { position, bounds }
    }

    /// Rectangle from origin and extent
    pub fn from_size(position: Point, size: Point) -> Self {
        Self::new(position, position + size)
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn bounds(&self) -> Point {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Point) {
        self.bounds = bounds;
    }

    pub fn size(&self) -> Point {
        self.bounds - self.position
    }

    pub fn width(&self) -> i32 {
        self.bounds.x - self.position.x
    }

    pub fn height(&self) -> i32 {
        self.bounds.y - self.position.y
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width()) * i64::from(self.height())
    }

    pub fn is_well_formed(&self) -> bool {
        self.bounds.covers(self.position)
    }

    pub fn span(&self, axis: Axis) -> Span {
        Span::new(self.position.along(axis), self.bounds.along(axis))
    }

    /// Integer centre, rounded towards the south-west
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.width() / 2,
            self.position.y + self.height() / 2,
        )
    }

    /// `other` lies fully inside `self` (edges may touch)
    pub fn contains(&self, other: &Quad) -> bool {
        other.position.covers(self.position) && self.bounds.covers(other.bounds)
    }

    /// Interiors intersect; quads that only share an edge do not overlap
    pub fn overlaps(&self, other: &Quad) -> bool {
        !self.span(Axis::X).is_disjoint(other.span(Axis::X))
            && !self.span(Axis::Y).is_disjoint(other.span(Axis::Y))
    }

    /// The four sides as `(start, end)` segments: south, east, north, west
    pub fn sides(&self) -> [(Point, Point); 4] {
        let sw = self.position;
        let ne = self.bounds;
        let se = Point::new(ne.x, sw.y);
        let nw = Point::new(sw.x, ne.y);
        [(sw, se), (se, ne), (nw, ne), (sw, nw)]
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.position, self.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(px: i32, py: i32, bx: i32, by: i32) -> Quad {
        Quad::new(Point::new(px, py), Point::new(bx, by))
    }

    #[test]
    fn test_bounds_are_opposite_corner() {
        let q = quad(2, 3, 10, 7);
        assert_eq!(q.width(), 8);
        assert_eq!(q.height(), 4);
        assert_eq!(q.size(), Point::new(8, 4));
        assert_eq!(q.area(), 32);
        assert_eq!(Quad::from_size(Point::new(2, 3), Point::new(8, 4)), q);
    }

    #[test]
    fn test_equality_needs_both_corners() {
        assert_eq!(quad(0, 0, 4, 4), quad(0, 0, 4, 4));
        assert_ne!(quad(0, 0, 4, 4), quad(0, 0, 4, 5));
        assert_ne!(quad(0, 0, 4, 4), quad(1, 0, 4, 4));
    }

    #[test]
    fn test_setters() {
        let mut q = quad(0, 0, 1, 1);
        q.set_position(Point::new(-2, -2));
        q.set_bounds(Point::new(3, 5));
        assert_eq!(q.position(), Point::new(-2, -2));
        assert_eq!(q.bounds(), Point::new(3, 5));
        assert!(q.is_well_formed());
        assert!(!quad(4, 0, 2, 2).is_well_formed());
    }

    #[test]
    fn test_containment_allows_touching_edges() {
        let outer = quad(0, 0, 10, 10);
        assert!(outer.contains(&quad(0, 0, 10, 10)));
        assert!(outer.contains(&quad(2, 2, 5, 5)));
        assert!(!outer.contains(&quad(2, 2, 11, 5)));
    }

    #[test]
    fn test_shared_edge_is_not_overlap() {
        let a = quad(0, 0, 4, 4);
        assert!(!a.overlaps(&quad(4, 0, 8, 4)));
        assert!(!a.overlaps(&quad(0, 4, 4, 8)));
        assert!(a.overlaps(&quad(3, 3, 8, 8)));
    }

    #[test]
    fn test_span_overlap() {
        let a = Span::new(0, 6);
        let b = Span::new(4, 10);
        assert_eq!(a.overlap(b), Span::new(4, 6));
        assert_eq!(a.overlap(b).len(), 2);
        assert!(Span::new(0, 2).overlap(Span::new(5, 8)).is_empty());
        assert!(Span::new(0, 2).is_disjoint(Span::new(2, 8)));
    }

    #[test]
    fn test_sides_in_order() {
        let [south, east, north, west] = quad(0, 0, 4, 2).sides();
        assert_eq!(south, (Point::new(0, 0), Point::new(4, 0)));
        assert_eq!(east, (Point::new(4, 0), Point::new(4, 2)));
        assert_eq!(north, (Point::new(0, 2), Point::new(4, 2)));
        assert_eq!(west, (Point::new(0, 0), Point::new(0, 2)));
    }
}
