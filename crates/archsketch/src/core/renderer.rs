//! Core renderer trait for document output
//!
//! Renderers serialize a laid-out model into a document format. Unlike the
//! other stages they are shared by every strategy.

use anyhow::Result;

/// Core trait for document renderers
pub trait Renderer<L>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the laid-out model into the output format
    fn render(&self, layout: &L) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the output format identifier
    fn format(&self) -> &'static str;
}
