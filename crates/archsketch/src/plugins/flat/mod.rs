//! Flat conversion strategy
//!
//! For source without clusters: one shape per recognized service kind, laid
//! out on a fixed-column grid.

use crate::core::{Detector, Diagram, Policy};
use crate::plugins::architecture::ArchitectureDatabase;
use std::sync::Arc;

mod detector;
mod layout;
mod parser;

pub use detector::*;
pub use layout::*;
pub use parser::*;

/// Flat strategy
pub struct FlatDiagram;

impl Diagram for FlatDiagram {
    type Database = ArchitectureDatabase;
    type Parser = FlatParser;
    type Layout = FlatLayoutAlgorithm;

    fn detector() -> Arc<dyn Detector> {
        Arc::new(FlatDetector::new())
    }

    fn create_parser() -> Self::Parser {
        FlatParser::new()
    }

    fn create_database(policy: Policy) -> Self::Database {
        ArchitectureDatabase::with_policy(policy)
    }

    fn create_layout() -> Self::Layout {
        FlatLayoutAlgorithm::new()
    }

    fn name() -> &'static str {
        "flat"
    }

    fn version() -> &'static str {
        "0.1.0"
    }
}
