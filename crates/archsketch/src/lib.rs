//! Archsketch - Convert `diagrams` architecture code to draw.io documents
//!
//! Reads Python source written against the `diagrams` library, recovers its
//! clusters, services and connections, lays them out and emits an editable
//! `mxfile` document.
//!
//! # Quick Start
//!
//! ```rust
//! use archsketch::convert;
//!
//! let source = r#"
//! with Cluster("Ingest"):
//!     stream = Kinesis("events")
//!     fn = Lambda("process")
//! stream >> fn
//! "#;
//! let document = convert(source, "Pipeline").unwrap();
//! assert!(document.starts_with("<mxfile"));
//! assert!(document.contains("Ingest"));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use archsketch::prelude::*;
//!
//! let parser = ArchitectureParser::new();
//! let mut database = ArchitectureDatabase::new();
//! parser.parse("with Cluster(\"A\"):\n    x = S3()", &mut database).unwrap();
//! assert_eq!(database.node_count(), 1);
//!
//! let layout = ArchitectureLayoutAlgorithm::new().layout(&database).unwrap();
//! let document = DrawioRenderer::new("A").render(&layout).unwrap();
//! assert!(document.contains("S3"));
//! ```

pub mod core;
pub mod plugins;

pub use core::*;
pub use plugins::{ConversionOutcome, Orchestrator};

use std::path::Path;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Condition, Database, Detector, Diagram, DiagramLayout, LayoutAlgorithm, Parser, Policy,
        Renderer, Response, ServiceInstance, Strategy,
    };
    pub use crate::plugins::architecture::{
        ArchitectureDatabase, ArchitectureDetector, ArchitectureLayoutAlgorithm,
        ArchitectureParser,
    };
    pub use crate::plugins::drawio::DrawioRenderer;
    pub use crate::plugins::flat::{FlatDetector, FlatLayoutAlgorithm, FlatParser};
    pub use crate::plugins::Orchestrator;
}

/// Convert `diagrams` source to a draw.io document
///
/// Unrecognizable source degrades to the default two-shape layout instead of
/// failing.
///
/// # Example
/// ```rust
/// let document = archsketch::convert("just some prose", "Empty").unwrap();
/// assert!(document.contains("Lambda Function"));
/// assert!(document.contains("S3 Bucket"));
/// ```
pub fn convert(source: &str, name: &str) -> anyhow::Result<String> {
    Ok(Orchestrator::new().convert(Some(source), name, None)?.document)
}

/// Write the document for `image` next to it as `<stem>.drawio`
///
/// Without `source` the service kinds are guessed from the image file name.
pub fn convert_to_file(image: &Path, name: &str, source: Option<&str>) -> ConversionOutcome {
    Orchestrator::new().convert_to_file(image, name, source)
}

/// Parse source into the cluster-aware model without laying it out
pub fn parse(source: &str) -> anyhow::Result<plugins::architecture::ArchitectureDatabase> {
    use crate::core::Parser;

    let mut database = plugins::architecture::ArchitectureDatabase::new();
    plugins::architecture::ArchitectureParser::new().parse(source, &mut database)?;
    Ok(database)
}
