//! Core abstractions for the conversion pipeline
//!
//! Pipeline traits, the shared data model, the service catalog and the
//! degrade policy every strategy builds on.

pub mod catalog;
pub mod chumsky_utils;
mod database;
mod detector;
mod diagram;
pub mod edge_routing;
mod error;
mod layout;
pub mod logging;
mod parser;
pub mod policy;
mod renderer;
pub mod sanitize;
pub mod syntax;
mod types;

pub use catalog::{CatalogEntry, Category, CATALOG};
pub use database::*;
pub use detector::*;
pub use diagram::*;
pub use error::*;
pub use layout::*;
pub use logging::{init_default_logging, init_logging, LogFormat};
pub use parser::*;
pub use policy::{Condition, Policy, Response};
pub use renderer::*;
pub use sanitize::extract_code;
pub use syntax::{ChainToken, LineParser, Statement};
pub use types::*;
