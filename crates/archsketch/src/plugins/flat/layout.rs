//! Fixed-column grid layout
//!
//! Used by the flat strategy and the filename fallback. Services are placed
//! in topological order, left to right then top to bottom.

use anyhow::Result;
use std::collections::HashMap;
use tracing::{info, span, trace, Level};

use crate::core::catalog;
use crate::core::edge_routing::{route, Rect};
use crate::core::policy::{Condition, Response};
use crate::core::{
    ConvertError, Database, DiagramLayout, IdAllocator, LayoutAlgorithm, PositionedShape,
    RoutedConnector, ShapeElement,
};
use crate::plugins::architecture::ArchitectureDatabase;

/// Grid configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatLayoutConfig {
    pub origin_x: i64,
    pub origin_y: i64,
    pub columns: usize,
    pub column_spacing: i64,
    pub row_spacing: i64,
    pub icon_size: i64,
}

impl Default for FlatLayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: 200,
            origin_y: 200,
            columns: 4,
            column_spacing: 200,
            row_spacing: 200,
            icon_size: 78,
        }
    }
}

/// Grid layout algorithm
#[derive(Debug, Default)]
pub struct FlatLayoutAlgorithm {
    config: FlatLayoutConfig,
}

impl FlatLayoutAlgorithm {
    pub fn new() -> Self {
        Self {
            config: FlatLayoutConfig::default(),
        }
    }

    pub fn with_config(config: FlatLayoutConfig) -> Self {
        Self { config }
    }

    /// Top-left of the `index`-th grid slot
    pub fn slot(&self, index: usize) -> (i64, i64) {
        let columns = self.config.columns.max(1);
        (
            self.config.origin_x + (index % columns) as i64 * self.config.column_spacing,
            self.config.origin_y + (index / columns) as i64 * self.config.row_spacing,
        )
    }
}

impl LayoutAlgorithm<ArchitectureDatabase> for FlatLayoutAlgorithm {
    type Output = DiagramLayout;

    fn layout(&self, database: &ArchitectureDatabase) -> Result<Self::Output> {
        let layout_span = span!(Level::INFO, "layout_grid", services = database.node_count());
        let _enter = layout_span.enter();

        let mut ids = IdAllocator::new();
        let mut output = DiagramLayout::default();
        let mut placed: HashMap<&str, (u32, Rect)> = HashMap::new();
        let size = self.config.icon_size;

        for (index, key) in database.topological_sort().into_iter().enumerate() {
            let Some(service) = database.get_node(key) else {
                continue;
            };
            let (x, y) = self.slot(index);
            let id = ids.next_id();
            trace!(service = key, id, x, y, "Placed grid slot");
            output.shapes.push(PositionedShape {
                id,
                key: service.id.clone(),
                element: ShapeElement::Service {
                    kind: service.kind.clone(),
                    label: service
                        .label
                        .clone()
                        .unwrap_or_else(|| catalog::resolve(&service.kind).label.to_string()),
                },
                x,
                y,
                width: size,
                height: size,
                parent: None,
            });
            placed.insert(key, (id, Rect::new(x, y, size, size)));
            output.width = output.width.max(x + size + self.config.origin_x);
            output.height = output.height.max(y + size + self.config.origin_y);
        }

        for connection in database.edges() {
            let (Some(&(source, from)), Some(&(target, to))) = (
                placed.get(connection.from.as_str()),
                placed.get(connection.to.as_str()),
            ) else {
                let detail = format!("{} >> {}", connection.from, connection.to);
                match database.policy().apply(Condition::UnpositionedEndpoint, &detail) {
                    Response::Skip | Response::FallBack => continue,
                    Response::Fail => {
                        return Err(ConvertError::rejected(Condition::UnpositionedEndpoint, detail).into())
                    }
                }
            };
            let r = route(from, to);
            output.connectors.push(RoutedConnector {
                id: ids.next_id(),
                source,
                target,
                exit: r.exit,
                entry: r.entry,
                source_point: r.source_point,
                target_point: r.target_point,
            });
        }

        info!(
            shapes = output.shapes.len(),
            connectors = output.connectors.len(),
            "Grid layout completed"
        );
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "grid"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn direction(&self) -> &'static str {
        "LR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnchorSide, Connection, Point, ServiceInstance};

    fn db(kinds: &[&str], edges: &[(&str, &str)]) -> ArchitectureDatabase {
        let mut db = ArchitectureDatabase::new();
        for kind in kinds {
            db.add_node(ServiceInstance::new(*kind, *kind)).unwrap();
        }
        for (from, to) in edges {
            db.add_edge(Connection::new(*from, *to)).unwrap();
        }
        db
    }

    #[test]
    fn test_two_shape_layout_matches_default_positions() {
        let out = FlatLayoutAlgorithm::new()
            .layout(&db(&["Lambda", "S3"], &[("Lambda", "S3")]))
            .unwrap();
        assert_eq!((out.shapes[0].x, out.shapes[0].y), (200, 200));
        assert_eq!((out.shapes[1].x, out.shapes[1].y), (400, 200));
        let c = &out.connectors[0];
        assert_eq!((c.source, c.target, c.id), (2, 3, 4));
        assert_eq!((c.exit, c.entry), (AnchorSide::Right, AnchorSide::Left));
        assert_eq!(c.source_point, Point::new(278, 239));
    }

    #[test]
    fn test_topological_order_drives_slots() {
        let out = FlatLayoutAlgorithm::new()
            .layout(&db(&["S3", "Lambda", "APIGateway"], &[("APIGateway", "Lambda"), ("Lambda", "S3")]))
            .unwrap();
        let keys: Vec<&str> = out.shapes.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["APIGateway", "Lambda", "S3"]);
    }

    #[test]
    fn test_wraps_after_four_columns() {
        let algo = FlatLayoutAlgorithm::new();
        assert_eq!(algo.slot(3), (800, 200));
        assert_eq!(algo.slot(4), (200, 400));
        assert_eq!(algo.name(), "grid");

        let narrow = FlatLayoutAlgorithm::with_config(FlatLayoutConfig {
            columns: 2,
            ..FlatLayoutConfig::default()
        });
        assert_eq!(narrow.slot(2), (200, 400));
    }
}
