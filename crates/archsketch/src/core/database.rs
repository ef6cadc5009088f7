//! Core database trait for parsed diagram data
//!
//! Each strategy stores its parse result behind this trait so the flow
//! analyzer and layout engines can read it uniformly.

use anyhow::Result;

/// Core trait for diagram databases
///
/// The associated types let each strategy choose its own node and edge
/// records. Both current strategies use services and connections.
pub trait Database: Send + Sync {
    /// The node data type for this database
    type Node: Clone + Send + Sync;

    /// The edge data type for this database
    type Edge: Clone + Send + Sync;

    /// Add a node to the database
    fn add_node(&mut self, node: Self::Node) -> Result<()>;

    /// Add an edge to the database
    fn add_edge(&mut self, edge: Self::Edge) -> Result<()>;

    /// Look up a node by identifier
    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Iterate over all nodes in insertion order
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Iterate over all edges in insertion order
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    fn clear(&mut self);

    /// Get the number of nodes
    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    /// True when nothing recognizable was stored
    fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}
