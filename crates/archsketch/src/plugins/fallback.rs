//! Filename fallback strategy
//!
//! When no usable source is available, service kinds are guessed from
//! keywords in the image file stem, or in the diagram name when there is no
//! image. Under the default policy fewer than two guesses are padded with the
//! default compute and storage pair, so the result always has at least two
//! shapes and one connector.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, span, Level};

use crate::core::catalog::FALLBACK_PAIR;
use crate::core::policy::{Condition, Response};
use crate::core::{
    Connection, ConvertError, Database, Detector, Diagram, Parser, Policy, ServiceInstance,
};
use crate::plugins::architecture::ArchitectureDatabase;
use crate::plugins::flat::FlatLayoutAlgorithm;

/// Keyword groups checked against the lowercased hint, in order
pub static KEYWORDS: &[(&[&str], &str)] = &[
    (&["serverless", "function", "lambda"], "Lambda"),
    (&["storage", "bucket", "s3"], "S3"),
    (&["stream", "kinesis"], "Kinesis"),
    (&["container", "ecs"], "ECS"),
    (&["queue", "sqs"], "SQS"),
    (&["notification", "sns"], "SNS"),
    (&["api", "gateway"], "APIGateway"),
    (&["database", "rds"], "RDS"),
    (&["dynamo"], "DynamoDB"),
    (&["etl", "glue"], "Glue"),
    (&["analytics", "athena"], "Athena"),
    (&["ml", "sagemaker"], "Sagemaker"),
];

/// Service kinds whose keywords occur in `hint`
///
/// The hint is matched as given; callers pass an image file stem or a
/// diagram name.
pub fn guess_kinds(hint: &str) -> Vec<&'static str> {
    let hint = hint.to_lowercase();
    let kinds: Vec<&'static str> = KEYWORDS
        .iter()
        .filter(|(words, _)| words.iter().any(|w| hint.contains(w)))
        .map(|(_, kind)| *kind)
        .collect();
    debug!(hint = %hint, ?kinds, "Guessed kinds from hint");
    kinds
}

/// Pad `kinds` to two with the default compute and storage pair
fn pad_with_defaults(mut kinds: Vec<&'static str>) -> Vec<&'static str> {
    for default in FALLBACK_PAIR {
        if kinds.len() >= 2 {
            break;
        }
        if !kinds.contains(&default) {
            kinds.push(default);
        }
    }
    kinds
}

/// Parser whose input is a file name rather than source
#[derive(Debug, Default)]
pub struct FilenameParser;

impl FilenameParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser<ArchitectureDatabase> for FilenameParser {
    fn parse(&self, input: &str, database: &mut ArchitectureDatabase) -> Result<()> {
        let parse_span = span!(Level::INFO, "parse_filename", file = input);
        let _enter = parse_span.enter();

        let mut kinds = guess_kinds(input);
        if kinds.len() < 2 {
            match database.policy().apply(Condition::UnmatchedFilename, input) {
                Response::FallBack => kinds = pad_with_defaults(kinds),
                Response::Skip => {}
                Response::Fail => {
                    return Err(ConvertError::rejected(Condition::UnmatchedFilename, input).into())
                }
            }
        }
        for kind in &kinds {
            database.add_node(ServiceInstance::new(*kind, *kind))?;
        }
        for pair in kinds.windows(2) {
            database.add_edge(Connection::new(pair[0], pair[1]))?;
        }

        info!(kinds = kinds.len(), "Filename fallback built");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "filename"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, _input: &str) -> bool {
        true
    }
}

/// Accepts everything with minimal confidence
#[derive(Debug, Default)]
pub struct FilenameDetector;

impl Detector for FilenameDetector {
    fn detect(&self, _input: &str) -> bool {
        true
    }

    fn confidence(&self, _input: &str) -> f64 {
        0.1
    }

    fn diagram_type(&self) -> &'static str {
        "filename"
    }

    fn patterns(&self) -> Vec<&'static str> {
        KEYWORDS
            .iter()
            .flat_map(|(words, _)| words.iter().copied())
            .collect()
    }
}

/// Filename fallback strategy
pub struct FilenameDiagram;

impl Diagram for FilenameDiagram {
    type Database = ArchitectureDatabase;
    type Parser = FilenameParser;
    type Layout = FlatLayoutAlgorithm;

    fn detector() -> Arc<dyn Detector> {
        Arc::new(FilenameDetector)
    }

    fn create_parser() -> Self::Parser {
        FilenameParser::new()
    }

    fn create_database(policy: Policy) -> Self::Database {
        ArchitectureDatabase::with_policy(policy)
    }

    fn create_layout() -> Self::Layout {
        FlatLayoutAlgorithm::new()
    }

    fn name() -> &'static str {
        "filename"
    }

    fn version() -> &'static str {
        "0.1.0"
    }
}
