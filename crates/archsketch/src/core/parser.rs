//! Core parser trait for diagram source

use anyhow::Result;

use super::Database;

/// Core trait for diagram parsers
///
/// Parsers never fail on unrecognized content; they store what they
/// recognize and skip the rest.
pub trait Parser<D: Database>: Send + Sync {
    /// Parse diagram source into the provided database
    fn parse(&self, input: &str, database: &mut D) -> Result<()>;

    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    /// Cheap check for whether the input carries this parser's constructs
    fn can_parse(&self, input: &str) -> bool;
}
