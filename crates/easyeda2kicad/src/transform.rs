use std::ops::{Add, Sub};

use crate::list;
use crate::sexpr::Node;
use crate::units::mm;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
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

/// Fixed offset of the EasyEDA canvas relative to the output origin.
pub const DOCUMENT_ORIGIN: Point = Point::new(4000.0, 3000.0);

/// Rotate a point about the origin.
pub fn rotate(p: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// A child coordinate frame.
///
/// `origin` is expressed in the parent frame (canvas units) and `angle` in
/// degrees. Points enter the frame by subtracting the origin first and then
/// rotating the relative offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub origin: Point,
    pub angle: f64,
}

impl Frame {
    pub const ROOT: Frame = Frame {
        origin: Point::new(0.0, 0.0),
        angle: 0.0,
    };

    pub fn new(origin: Point, angle: f64) -> Self {
        Self { origin, angle }
    }

    /// Frame of a group placed at canvas position `(x, y)` on the document.
    pub fn placed_at(x: f64, y: f64, angle: f64) -> Self {
        Self::new(to_local_coords(x, y, &Frame::ROOT), angle)
    }

    /// Express a point of the parent frame in this frame.
    pub fn apply(&self, p: Point) -> Point {
        rotate(p - self.origin, self.angle)
    }

    /// Single frame equivalent to entering `self` and then `inner`, where
    /// `inner` is defined in this frame's coordinates.
    pub fn then(&self, inner: &Frame) -> Frame {
        Frame {
            origin: self.origin + rotate(inner.origin, -self.angle),
            angle: self.angle + inner.angle,
        }
    }
}

/// Canvas coordinates to coordinates local to `frame` (still canvas units).
pub fn to_local_coords(x: f64, y: f64, frame: &Frame) -> Point {
    frame.apply(Point::new(x, y) - DOCUMENT_ORIGIN)
}

/// `(at x y [angle])` in millimetres; the angle is left out when absent.
pub fn at(x: f64, y: f64, angle: Option<f64>, frame: &Frame) -> Node {
    let p = to_local_coords(x, y, frame);
    list!["at", mm(p.x), mm(p.y), angle.map(Node::from)]
}
