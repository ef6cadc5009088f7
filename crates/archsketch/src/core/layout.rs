//! Core layout trait for diagram positioning
//!
//! Layout algorithms turn a populated database into pixel geometry.

use anyhow::Result;

use super::Database;

/// Core trait for layout algorithms
pub trait LayoutAlgorithm<D: Database>: Send + Sync {
    /// The output type of this layout algorithm
    type Output;

    /// Compute geometry for every stored element
    fn layout(&self, database: &D) -> Result<Self::Output>;

    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    /// Primary flow direction, `LR` or `TB`
    fn direction(&self) -> &'static str;
}
