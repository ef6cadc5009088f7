//! Core diagram trait tying one conversion pipeline together

use super::{Database, Detector, DiagramLayout, LayoutAlgorithm, Parser, Policy};
use std::sync::Arc;

/// One complete conversion strategy
///
/// Implementors bundle the detector, parser, database and layout stages.
/// Every strategy lays out into [`DiagramLayout`] so a single renderer
/// serves them all.
pub trait Diagram: Send + Sync {
    /// The specific database type for this strategy
    type Database: Database + Send + Sync;

    /// The parser type for this strategy
    type Parser: Parser<Self::Database> + Send + Sync;

    /// The layout algorithm for this strategy
    type Layout: LayoutAlgorithm<Self::Database, Output = DiagramLayout> + Send + Sync;

    /// Get the detector for this strategy
    fn detector() -> Arc<dyn Detector>;

    /// Create a new parser instance
    fn create_parser() -> Self::Parser;

    /// Create a database that carries `policy` through parse and layout
    fn create_database(policy: Policy) -> Self::Database;

    /// Create a new layout instance
    fn create_layout() -> Self::Layout;

    /// Get the name of this strategy
    fn name() -> &'static str;

    /// Get the version of this strategy
    fn version() -> &'static str;
}
