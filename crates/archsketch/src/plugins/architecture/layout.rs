//! Flow-level layout for clustered architectures
//!
//! Rows follow flow levels top to bottom. Each row holds that level's
//! clusters left to right, followed by its standalone services. Members sit
//! in a grid of at most `max_columns` per row inside their cluster.

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, span, trace, Level};
use unicode_width::UnicodeWidthStr;

use super::flow::{assign_flow_levels, FlowLevels};
use super::ArchitectureDatabase;
use crate::core::catalog;
use crate::core::edge_routing::{route, Rect};
use crate::core::policy::{Condition, Response};
use crate::core::{
    Cluster, ConvertError, Database, DiagramLayout, IdAllocator, LayoutAlgorithm, PositionedShape,
    RoutedConnector, ServiceInstance, ShapeElement,
};

/// Layout configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    pub icon_size: i64,
    pub cell_width: i64,
    pub cell_height: i64,
    pub cluster_padding: i64,
    /// Title band at the top of a cluster
    pub cluster_header: i64,
    pub cluster_margin: i64,
    pub max_columns: usize,
    pub base_x: i64,
    pub base_y: i64,
    pub level_spacing: i64,
    pub standalone_spacing: i64,
    /// Pixels per display column of a cluster title
    pub title_char_width: i64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            icon_size: 78,
            cell_width: 140,
            cell_height: 130,
            cluster_padding: 30,
            cluster_header: 30,
            cluster_margin: 60,
            max_columns: 3,
            base_x: 40,
            base_y: 40,
            level_spacing: 320,
            standalone_spacing: 160,
            title_char_width: 8,
        }
    }
}

impl LayoutConfig {
    /// Pixel size of a cluster holding `members` services
    pub fn cluster_size(&self, title: &str, members: usize) -> (i64, i64) {
        let columns = members.clamp(1, self.max_columns.max(1)) as i64;
        let rows = members.div_ceil(self.max_columns.max(1)).max(1) as i64;
        let grid_width = 2 * self.cluster_padding + columns * self.cell_width;
        let title_width =
            UnicodeWidthStr::width(title) as i64 * self.title_char_width + 2 * self.cluster_padding;
        let height = self.cluster_header + rows * self.cell_height + self.cluster_padding;
        (grid_width.max(title_width), height)
    }

    /// Position of member `index` relative to its cluster
    pub fn member_offset(&self, index: usize) -> (i64, i64) {
        let columns = self.max_columns.max(1);
        let col = (index % columns) as i64;
        let row = (index / columns) as i64;
        (
            self.cluster_padding + col * self.cell_width + (self.cell_width - self.icon_size) / 2,
            self.cluster_header + row * self.cell_height,
        )
    }
}

enum RowItem<'a> {
    Cluster(&'a Cluster),
    Standalone(&'a ServiceInstance),
}

/// Flow-level layout algorithm implementation
#[derive(Debug, Default)]
pub struct ArchitectureLayoutAlgorithm {
    config: LayoutConfig,
}

impl ArchitectureLayoutAlgorithm {
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
        }
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Group clusters and standalone services into rows keyed by flow level
    ///
    /// A memberless cluster has no level of its own; a fallback places it on
    /// the first row as an empty group.
    fn build_rows<'a>(
        &self,
        database: &'a ArchitectureDatabase,
        levels: &FlowLevels,
    ) -> Result<BTreeMap<usize, Vec<RowItem<'a>>>> {
        let mut rows: BTreeMap<usize, Vec<RowItem<'a>>> = BTreeMap::new();

        for cluster in database.clusters() {
            let level = match cluster.members.iter().filter_map(|m| levels.level(m)).min() {
                Some(level) => level,
                None => match database.policy().apply(Condition::EmptyCluster, &cluster.name) {
                    Response::Skip => continue,
                    Response::FallBack => 0,
                    Response::Fail => {
                        return Err(
                            ConvertError::rejected(Condition::EmptyCluster, cluster.name.clone()).into(),
                        )
                    }
                },
            };
            rows.entry(level).or_default().push(RowItem::Cluster(cluster));
        }

        for service in database.standalone_services() {
            let level = levels.level(&service.id).unwrap_or(0);
            rows.entry(level).or_default().push(RowItem::Standalone(service));
        }

        Ok(rows)
    }

    fn service_shape(
        &self,
        id: u32,
        service: &ServiceInstance,
        x: i64,
        y: i64,
        parent: Option<u32>,
    ) -> PositionedShape {
        let entry = catalog::resolve(&service.kind);
        PositionedShape {
            id,
            key: service.id.clone(),
            element: ShapeElement::Service {
                kind: service.kind.clone(),
                label: service
                    .label
                    .clone()
                    .unwrap_or_else(|| entry.label.to_string()),
            },
            x,
            y,
            width: self.config.icon_size,
            height: self.config.icon_size,
            parent,
        }
    }
}

impl LayoutAlgorithm<ArchitectureDatabase> for ArchitectureLayoutAlgorithm {
    type Output = DiagramLayout;

    fn layout(&self, database: &ArchitectureDatabase) -> Result<Self::Output> {
        let layout_span = span!(
            Level::INFO,
            "layout_architecture",
            services = database.node_count(),
            clusters = database.clusters().len()
        );
        let _enter = layout_span.enter();

        let levels = assign_flow_levels(database);
        let config = &self.config;
        let mut ids = IdAllocator::new();
        let mut output = DiagramLayout::default();
        // service id -> (shape id, absolute rect)
        let mut placed: HashMap<&str, (u32, Rect)> = HashMap::new();

        let place_span = span!(Level::DEBUG, "place_rows");
        let _place_enter = place_span.enter();

        let mut previous_bottom: Option<i64> = None;
        for (level, items) in self.build_rows(database, &levels)? {
            let nominal_y = config.base_y + level as i64 * config.level_spacing;
            let y = match previous_bottom {
                Some(bottom) => nominal_y.max(bottom + config.cluster_margin),
                None => nominal_y,
            };
            let mut x = config.base_x;
            let mut row_bottom = y;

            for item in items {
                match item {
                    RowItem::Cluster(cluster) => {
                        let (width, height) = config.cluster_size(&cluster.name, cluster.members.len());
                        let group_id = ids.next_id();
                        trace!(cluster = %cluster.name, group_id, x, y, width, height, "Placed cluster");
                        output.shapes.push(PositionedShape {
                            id: group_id,
                            key: cluster.name.clone(),
                            element: ShapeElement::Group {
                                label: cluster.name.clone(),
                            },
                            x,
                            y,
                            width,
                            height,
                            parent: None,
                        });

                        for (index, member) in cluster.members.iter().enumerate() {
                            let Some(service) = database.get_node(member) else {
                                continue;
                            };
                            let (dx, dy) = config.member_offset(index);
                            let shape_id = ids.next_id();
                            output
                                .shapes
                                .push(self.service_shape(shape_id, service, dx, dy, Some(group_id)));
                            placed.insert(
                                service.id.as_str(),
                                (shape_id, Rect::new(x + dx, y + dy, config.icon_size, config.icon_size)),
                            );
                        }

                        x += width + config.cluster_margin;
                        row_bottom = row_bottom.max(y + height);
                    }
                    RowItem::Standalone(service) => {
                        let shape_id = ids.next_id();
                        trace!(service = %service.id, shape_id, x, y, "Placed standalone service");
                        output.shapes.push(self.service_shape(shape_id, service, x, y, None));
                        placed.insert(
                            service.id.as_str(),
                            (shape_id, Rect::new(x, y, config.icon_size, config.icon_size)),
                        );
                        x += config.standalone_spacing;
                        row_bottom = row_bottom.max(y + config.icon_size);
                    }
                }
                output.width = output.width.max(x);
            }

            debug!(level, y, "Placed row");
            previous_bottom = Some(row_bottom);
            output.height = output.height.max(row_bottom + config.base_y);
        }
        drop(_place_enter);

        let route_span = span!(Level::DEBUG, "route_connectors");
        let _route_enter = route_span.enter();
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
        drop(_route_enter);

        if placed.len() != database.node_count() {
            return Err(ConvertError::layout_error(format!(
                "placed {} of {} services",
                placed.len(),
                database.node_count()
            ))
            .into());
        }

        info!(
            shapes = output.shapes.len(),
            connectors = output.connectors.len(),
            width = output.width,
            height = output.height,
            "Layout completed"
        );
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "flow-levels"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn direction(&self) -> &'static str {
        "TB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnchorSide, Parser, Policy};
    use crate::plugins::architecture::ArchitectureParser;

    fn layout(input: &str) -> DiagramLayout {
        let mut db = ArchitectureDatabase::new();
        ArchitectureParser::new().parse(input, &mut db).unwrap();
        ArchitectureLayoutAlgorithm::new().layout(&db).unwrap()
    }

    #[test]
    fn test_layout_metadata() {
        let algo = ArchitectureLayoutAlgorithm::new();
        assert_eq!(algo.name(), "flow-levels");
        assert_eq!(algo.direction(), "TB");
        assert_eq!(algo.config().max_columns, 3);
    }

    #[test]
    fn test_cluster_size() {
        let config = LayoutConfig::default();
        assert_eq!(config.cluster_size("A", 1), (200, 190));
        assert_eq!(config.cluster_size("A", 3), (480, 190));
        assert_eq!(config.cluster_size("A", 4), (480, 320));
        // long titles widen the box
        let title = "Very Long Ingestion Cluster Title Here";
        assert_eq!(config.cluster_size(title, 1).0, title.len() as i64 * 8 + 60);
    }

    #[test]
    fn test_member_offsets() {
        let config = LayoutConfig::default();
        assert_eq!(config.member_offset(0), (61, 30));
        assert_eq!(config.member_offset(2), (341, 30));
        assert_eq!(config.member_offset(3), (61, 160));
    }

    #[test]
    fn test_ids_follow_placement_order() {
        let out = layout(
            r#"
with Cluster("Edge"):
    api = APIGateway()
    fn = Lambda()
api >> fn
"#,
        );
        let ids: Vec<u32> = out.shapes.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert!(out.shapes[0].is_group());
        assert_eq!(out.shapes[1].parent, Some(2));
        assert_eq!(out.connectors.len(), 1);
        assert_eq!(out.connectors[0].id, 5);
    }

    #[test]
    fn test_levels_stack_vertically() {
        let out = layout(
            r#"
with Cluster("Ingest"):
    stream = Kinesis()
with Cluster("Store"):
    lake = S3()
stream >> lake
"#,
        );
        let ingest = out.shapes.iter().find(|s| s.key == "Ingest").unwrap();
        let store = out.shapes.iter().find(|s| s.key == "Store").unwrap();
        assert_eq!((ingest.x, ingest.y), (40, 40));
        assert_eq!((store.x, store.y), (40, 360));

        let conn = &out.connectors[0];
        assert_eq!((conn.exit, conn.entry), (AnchorSide::Bottom, AnchorSide::Top));
    }

    #[test]
    fn test_same_level_clusters_do_not_overlap() {
        let out = layout(
            r#"
with Cluster("A"):
    a1 = Lambda()
    a2 = Lambda()
with Cluster("B"):
    b1 = S3()
"#,
        );
        let groups: Vec<&PositionedShape> = out.shapes.iter().filter(|s| s.is_group()).collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].y, groups[1].y);
        assert!(groups[0].x + groups[0].width < groups[1].x);
    }

    #[test]
    fn test_standalone_follows_clusters_on_its_level() {
        let out = layout(
            r#"
users = Users()
with Cluster("App"):
    web = EC2()
"#,
        );
        // users precedes the cluster in source but is placed after it
        let users = out.shapes.iter().find(|s| s.key == "users").unwrap();
        assert_eq!(users.parent, None);
        assert_eq!((users.x, users.y), (40 + 200 + 60, 40));
    }

    #[test]
    fn test_tall_row_pushes_next_level_down() {
        let out = layout(
            r#"
sink = S3()
with Cluster("Fleet"):
    n1 = EC2()
    n2 = EC2()
    n3 = EC2()
    n4 = EC2()
    n5 = EC2()
    n6 = EC2()
    n7 = EC2()
n1 >> sink
"#,
        );
        // seven members: three rows, 450 px tall
        let fleet = out.shapes.iter().find(|s| s.key == "Fleet").unwrap();
        assert_eq!(fleet.height, 450);
        let sink = out.shapes.iter().find(|s| s.key == "sink").unwrap();
        assert!(sink.y >= fleet.y + fleet.height);
    }

    #[test]
    fn test_custom_column_count() {
        let algo = ArchitectureLayoutAlgorithm::with_config(LayoutConfig {
            max_columns: 2,
            ..LayoutConfig::default()
        });
        let mut db = ArchitectureDatabase::new();
        ArchitectureParser::new()
            .parse("with Cluster(\"C\"):\n    a = SQS()\n    b = SQS()\n    c = SQS()\n", &mut db)
            .unwrap();
        let out = algo.layout(&db).unwrap();
        let third = out.shapes.iter().find(|s| s.key == "c").unwrap();
        assert_eq!((third.x, third.y), (61, 160));
        assert_eq!(out.shapes[0].height, 30 + 2 * 130 + 30);
    }

    #[test]
    fn test_empty_cluster_skipped() {
        let out = layout("x = S3()\nwith Cluster(\"Nothing\"):\n    pass\n");
        assert_eq!(out.group_count(), 0);
        assert_eq!(out.service_count(), 1);
    }

    #[test]
    fn test_empty_cluster_placed_on_fallback() {
        let policy = Policy::new().with(Condition::EmptyCluster, Response::FallBack);
        let mut db = ArchitectureDatabase::with_policy(policy);
        ArchitectureParser::new()
            .parse("x = S3()\nwith Cluster(\"Nothing\"):\n    pass\n", &mut db)
            .unwrap();
        let out = ArchitectureLayoutAlgorithm::new().layout(&db).unwrap();
        assert_eq!(out.group_count(), 1);
        let group = out.shapes.iter().find(|s| s.is_group()).unwrap();
        assert_eq!((group.key.as_str(), group.x, group.y), ("Nothing", 40, 40));
        assert_eq!(out.service_count(), 1);
    }

    #[test]
    fn test_empty_cluster_rejected_on_fail() {
        let policy = Policy::new().with(Condition::EmptyCluster, Response::Fail);
        let mut db = ArchitectureDatabase::with_policy(policy);
        ArchitectureParser::new()
            .parse("with Cluster(\"Nothing\"):\n    pass\n", &mut db)
            .unwrap();
        let err = ArchitectureLayoutAlgorithm::new().layout(&db).unwrap_err();
        assert!(err.to_string().contains("Nothing"));
    }

    #[test]
    fn test_nested_clusters_keep_only_the_inner_group() {
        let out = layout(
            r#"
with Cluster("VPC"):
    with Cluster("Private"):
        app = EC2("app")
    with Cluster("Data"):
        db = RDS("db")
app >> db
"#,
        );
        let groups: Vec<&str> = out
            .shapes
            .iter()
            .filter(|s| s.is_group())
            .map(|s| s.key.as_str())
            .collect();
        assert_eq!(groups, vec!["Private", "Data"]);
        assert_eq!(out.service_count(), 2);
    }
}
