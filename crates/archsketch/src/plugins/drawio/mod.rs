//! draw.io document emitter
//!
//! Serializes a [`DiagramLayout`](crate::core::DiagramLayout) into an
//! `mxfile` document.

mod renderer;

pub use renderer::*;
