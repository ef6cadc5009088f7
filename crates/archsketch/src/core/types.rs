//! Core type definitions shared by every conversion strategy
//!
//! Parsed graph entities (services, clusters, connections) and the laid-out
//! model (positioned shapes, routed connectors) the emitter consumes.

use serde::Serialize;
use std::fmt;

/// A service bound to an identifier in diagram source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInstance {
    /// Source-level identifier (for the flat strategy, the kind itself)
    pub id: String,
    /// Constructor name from the catalog
    pub kind: String,
    /// First string argument of the constructor call, if any
    pub label: Option<String>,
    /// Owning cluster name
    pub cluster: Option<String>,
}

impl ServiceInstance {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            label: None,
            cluster: None,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn in_cluster(mut self, cluster: Option<String>) -> Self {
        self.cluster = cluster;
        self
    }
}

/// A named grouping of services
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub name: String,
    /// Member identifiers in first-seen order
    pub members: Vec<String>,
}

impl Cluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }
}

/// A directed connection between two service identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Conversion strategy chosen for an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Cluster-aware pipeline
    Clustered,
    /// Constructor scan without identifier tracking
    Flat,
    /// Guess from the target file name
    Filename,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Clustered => write!(f, "clustered"),
            Strategy::Flat => write!(f, "flat"),
            Strategy::Filename => write!(f, "filename"),
        }
    }
}

/// Side of a shape a connector attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl AnchorSide {
    /// Relative (x, y) anchor coordinates in draw.io perimeter units
    pub fn relative(&self) -> (&'static str, &'static str) {
        match self {
            AnchorSide::Left => ("0", "0.5"),
            AnchorSide::Right => ("1", "0.5"),
            AnchorSide::Top => ("0.5", "0"),
            AnchorSide::Bottom => ("0.5", "1"),
        }
    }
}

impl fmt::Display for AnchorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorSide::Left => write!(f, "left"),
            AnchorSide::Right => write!(f, "right"),
            AnchorSide::Top => write!(f, "top"),
            AnchorSide::Bottom => write!(f, "bottom"),
        }
    }
}

/// Absolute pixel point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// What a positioned shape draws
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeElement {
    /// Container drawn behind its members
    Group { label: String },
    /// One service icon
    Service { kind: String, label: String },
}

/// A shape with resolved geometry
///
/// `x`/`y` are relative to the parent group when `parent` is set, absolute
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionedShape {
    pub id: u32,
    /// Identifier or cluster name this shape was laid out from
    pub key: String,
    pub element: ShapeElement,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub parent: Option<u32>,
}

impl PositionedShape {
    pub fn is_group(&self) -> bool {
        matches!(self.element, ShapeElement::Group { .. })
    }
}

/// A connection with resolved anchors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutedConnector {
    pub id: u32,
    pub source: u32,
    pub target: u32,
    pub exit: AnchorSide,
    pub entry: AnchorSide,
    pub source_point: Point,
    pub target_point: Point,
}

/// The laid-out diagram every strategy produces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagramLayout {
    pub shapes: Vec<PositionedShape>,
    pub connectors: Vec<RoutedConnector>,
    pub width: i64,
    pub height: i64,
}

impl DiagramLayout {
    pub fn shape(&self, id: u32) -> Option<&PositionedShape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Absolute top-left of a shape, following its parent chain
    pub fn absolute_origin(&self, id: u32) -> Option<Point> {
        let shape = self.shape(id)?;
        match shape.parent {
            Some(parent) => {
                let base = self.absolute_origin(parent)?;
                Some(Point::new(base.x + shape.x, base.y + shape.y))
            }
            None => Some(Point::new(shape.x, shape.y)),
        }
    }

    pub fn group_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.is_group()).count()
    }

    pub fn service_count(&self) -> usize {
        self.shapes.len() - self.group_count()
    }
}

/// Hands out increasing cell ids; `0` and `1` are the fixed root cells
#[derive(Debug)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub const FIRST: u32 = 2;

    pub fn new() -> Self {
        Self { next: Self::FIRST }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_allocator_starts_after_root_cells() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
        assert_eq!(ids.next_id(), 4);
    }

    #[test]
    fn test_anchor_relative_coordinates() {
        assert_eq!(AnchorSide::Right.relative(), ("1", "0.5"));
        assert_eq!(AnchorSide::Top.relative(), ("0.5", "0"));
        assert_eq!(format!("{}", AnchorSide::Bottom), "bottom");
    }

    #[test]
    fn test_absolute_origin_follows_parent() {
        let layout = DiagramLayout {
            shapes: vec![
                PositionedShape {
                    id: 2,
                    key: "Edge".into(),
                    element: ShapeElement::Group {
                        label: "Edge".into(),
                    },
                    x: 40,
                    y: 40,
                    width: 200,
                    height: 160,
                    parent: None,
                },
                PositionedShape {
                    id: 3,
                    key: "api".into(),
                    element: ShapeElement::Service {
                        kind: "APIGateway".into(),
                        label: "API Gateway".into(),
                    },
                    x: 61,
                    y: 30,
                    width: 78,
                    height: 78,
                    parent: Some(2),
                },
            ],
            ..Default::default()
        };
        assert_eq!(layout.absolute_origin(3), Some(Point::new(101, 70)));
        assert_eq!(layout.group_count(), 1);
        assert_eq!(layout.service_count(), 1);
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Clustered.to_string(), "clustered");
        assert_eq!(Strategy::Filename.to_string(), "filename");
    }
}
