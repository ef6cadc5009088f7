//! Shared connector routing
//!
//! Connectors are straight anchor-to-anchor lines. The anchor sides follow
//! the dominant axis of the displacement between the two shape centers.

use super::{AnchorSide, Point};

/// Absolute bounding box of a placed shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Absolute point of an anchor on this rectangle's perimeter
    pub fn anchor(&self, side: AnchorSide) -> Point {
        let c = self.center();
        match side {
            AnchorSide::Left => Point::new(self.x, c.y),
            AnchorSide::Right => Point::new(self.x + self.width, c.y),
            AnchorSide::Top => Point::new(c.x, self.y),
            AnchorSide::Bottom => Point::new(c.x, self.y + self.height),
        }
    }
}

/// Anchor choice for one connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub exit: AnchorSide,
    pub entry: AnchorSide,
    pub source_point: Point,
    pub target_point: Point,
}

/// Pick exit and entry sides from the dominant displacement axis
///
/// Ties between the axes route horizontally; a zero displacement routes
/// left to right.
pub fn anchor_sides(from: Point, to: Point) -> (AnchorSide, AnchorSide) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dx.abs() >= dy.abs() {
        if dx >= 0 {
            (AnchorSide::Right, AnchorSide::Left)
        } else {
            (AnchorSide::Left, AnchorSide::Right)
        }
    } else if dy > 0 {
        (AnchorSide::Bottom, AnchorSide::Top)
    } else {
        (AnchorSide::Top, AnchorSide::Bottom)
    }
}

/// Route a connector between two placed shapes
pub fn route(source: Rect, target: Rect) -> Route {
    let (exit, entry) = anchor_sides(source.center(), target.center());
    Route {
        exit,
        entry,
        source_point: source.anchor(exit),
        target_point: target.anchor(entry),
    }
}
