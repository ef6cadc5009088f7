//! Cluster-aware conversion strategy
//!
//! Parses identifiers, clusters and connection chains, assigns flow levels
//! and lays clusters out row by row.

use crate::core::{Detector, Diagram, Policy};
use std::sync::Arc;

mod database;
mod detector;
pub mod flow;
mod layout;
mod parser;

pub use database::*;
pub use detector::*;
pub use flow::{assign_flow_levels, FlowLevels};
pub use layout::*;
pub use parser::*;

/// Cluster-aware strategy
pub struct ArchitectureDiagram;

impl Diagram for ArchitectureDiagram {
    type Database = ArchitectureDatabase;
    type Parser = ArchitectureParser;
    type Layout = ArchitectureLayoutAlgorithm;

    fn detector() -> Arc<dyn Detector> {
        Arc::new(ArchitectureDetector::new())
    }

    fn create_parser() -> Self::Parser {
        ArchitectureParser::new()
    }

    fn create_database(policy: Policy) -> Self::Database {
        ArchitectureDatabase::with_policy(policy)
    }

    fn create_layout() -> Self::Layout {
        ArchitectureLayoutAlgorithm::new()
    }

    fn name() -> &'static str {
        "clustered"
    }

    fn version() -> &'static str {
        "0.1.0"
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::core::{Database, LayoutAlgorithm, Parser};

    #[test]
    fn test_diagram_components() {
        assert_eq!(ArchitectureDiagram::name(), "clustered");
        assert_eq!(ArchitectureDiagram::version(), "0.1.0");
        assert_eq!(ArchitectureDiagram::detector().diagram_type(), "clustered");
    }

    #[test]
    fn test_full_pipeline() {
        let input = r#"
from diagrams import Diagram, Cluster
from diagrams.aws.compute import Lambda
from diagrams.aws.storage import S3

with Diagram("Pipeline", show=False):
    api = APIGateway("api")
    with Cluster("Processing"):
        f1 = Lambda("validate")
        f2 = Lambda("enrich")
        f3 = Lambda("store")
    api >> f1 >> f2 >> f3
"#;
        let parser = ArchitectureDiagram::create_parser();
        let mut database = ArchitectureDiagram::create_database(Policy::default());
        parser.parse(input, &mut database).unwrap();
        assert_eq!(database.node_count(), 4);
        assert_eq!(database.edge_count(), 3);

        let layout = ArchitectureDiagram::create_layout().layout(&database).unwrap();
        assert_eq!(layout.group_count(), 1);
        assert_eq!(layout.service_count(), 4);
        assert_eq!(layout.connectors.len(), 3);
        let children: Vec<_> = layout.shapes.iter().filter(|s| s.parent.is_some()).collect();
        assert_eq!(children.len(), 3);
        assert!(children.iter().all(|c| c.y == children[0].y));
    }
}
