//! Planar geometry primitives shared by the hull builder and the tour heuristics.

use serde::{Deserialize, Serialize};

/// A point in the plane. Identity is the index in its point set, not the
/// coordinates, so duplicates are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Turn direction of the path a -> b -> c
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Counter-clockwise
    Left,
    /// Clockwise
    Right,
    Collinear,
}

/// Euclidean distance
#[inline]
pub fn distance(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Cross product `(b - a) x (c - a)`
#[inline]
pub fn cross(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Sign of the cross product. Collinearity is an exact comparison with zero.
#[inline]
pub fn orientation(a: &Point, b: &Point, c: &Point) -> Orientation {
    let area = cross(a, b, c);
    if area > 0.0 {
        Orientation::Left
    } else if area < 0.0 {
        Orientation::Right
    } else {
        Orientation::Collinear
    }
}
