//! Flat parser: constructor scan without cluster tracking
//!
//! One service per distinct catalog kind, in order of first call. Chains
//! connect kinds, resolving operands either from an inline constructor call
//! or through an `ident = Constructor(...)` binding.

use anyhow::Result;
use std::collections::HashMap;
use tracing::{info, span, trace, Level};

use crate::core::catalog;
use crate::core::policy::{Condition, Response};
use crate::core::syntax::{constructor_calls, strip_comment};
use crate::core::{
    ChainToken, Connection, ConvertError, Database, LineParser, Parser, ServiceInstance, Statement,
};
use crate::plugins::architecture::ArchitectureDatabase;

/// Flat parser implementation
#[derive(Debug, Default)]
pub struct FlatParser {
    lines: LineParser,
}

impl FlatParser {
    pub fn new() -> Self {
        Self {
            lines: LineParser::new(),
        }
    }

    fn resolve(token: &ChainToken, aliases: &HashMap<String, String>) -> Vec<String> {
        match token {
            ChainToken::Names(names) => names
                .iter()
                .filter_map(|n| aliases.get(n.as_str()).cloned())
                .collect(),
            ChainToken::Expression(text) => constructor_calls(text)
                .first()
                .map(|e| vec![e.constructor.to_string()])
                .unwrap_or_default(),
            ChainToken::Modifier => Vec::new(),
        }
    }
}

impl Parser<ArchitectureDatabase> for FlatParser {
    fn parse(&self, input: &str, database: &mut ArchitectureDatabase) -> Result<()> {
        let parse_span = span!(Level::INFO, "parse_flat", input_len = input.len());
        let _enter = parse_span.enter();

        let mut aliases: HashMap<String, String> = HashMap::new();
        let mut chains: Vec<Vec<ChainToken>> = Vec::new();

        for line in input.lines() {
            for entry in constructor_calls(strip_comment(line)) {
                if database.get_node(entry.constructor).is_none() {
                    trace!(kind = entry.constructor, "Found service kind");
                    database.add_node(ServiceInstance::new(entry.constructor, entry.constructor))?;
                }
            }

            match self.lines.parse_line(line) {
                Statement::Assignment {
                    ident, constructor, ..
                } => {
                    if !catalog::is_known(&constructor) {
                        match database.policy().apply(Condition::UnknownConstructor, &constructor) {
                            Response::Skip => continue,
                            // The unknown kind becomes its own default-styled shape
                            Response::FallBack => {
                                if database.get_node(&constructor).is_none() {
                                    database.add_node(ServiceInstance::new(
                                        constructor.clone(),
                                        constructor.clone(),
                                    ))?;
                                }
                            }
                            Response::Fail => {
                                return Err(ConvertError::rejected(
                                    Condition::UnknownConstructor,
                                    constructor,
                                )
                                .into())
                            }
                        }
                    }
                    aliases.insert(ident, constructor);
                }
                Statement::Chain(tokens) => chains.push(tokens),
                Statement::ClusterOpen { .. } | Statement::Other => {}
            }
        }

        // Chains resolve after the scan so bindings below a chain still count
        for tokens in &chains {
            let endpoints: Vec<Vec<String>> = tokens
                .iter()
                .filter(|t| **t != ChainToken::Modifier)
                .map(|t| Self::resolve(t, &aliases))
                .collect();

            for pair in endpoints.windows(2) {
                if pair[0].is_empty() || pair[1].is_empty() {
                    let detail = "chain operand has no known kind";
                    match database.policy().apply(Condition::DanglingConnection, detail) {
                        Response::Skip | Response::FallBack => continue,
                        Response::Fail => {
                            return Err(ConvertError::rejected(Condition::DanglingConnection, detail).into())
                        }
                    }
                }
                for from in &pair[0] {
                    for to in &pair[1] {
                        if from != to && !database.has_connection(from, to) {
                            database.add_edge(Connection::new(from.as_str(), to.as_str()))?;
                        }
                    }
                }
            }
        }

        info!(
            kinds = database.node_count(),
            connections = database.edge_count(),
            "Flat parsing completed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "flat"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        !constructor_calls(input).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Policy;

    fn parse(input: &str) -> ArchitectureDatabase {
        let mut db = ArchitectureDatabase::new();
        FlatParser::new().parse(input, &mut db).unwrap();
        db
    }

    fn kinds(db: &ArchitectureDatabase) -> Vec<&str> {
        db.nodes().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_one_shape_per_kind() {
        let db = parse("a = Lambda('a')\nb = Lambda('b')\nc = S3('c')\n");
        assert_eq!(kinds(&db), vec!["Lambda", "S3"]);
    }

    #[test]
    fn test_alias_chain() {
        let db = parse("compute = Lambda(\"fn\")\nstore = S3(\"bucket\")\ncompute >> store\n");
        assert_eq!(db.node_count(), 2);
        assert!(db.has_connection("Lambda", "S3"));
        assert_eq!(db.edge_count(), 1);
    }

    #[test]
    fn test_inline_constructor_chain() {
        let db = parse("APIGateway('api') >> Lambda('fn') >> DynamoDB('t')\n");
        assert_eq!(kinds(&db), vec!["APIGateway", "Lambda", "DynamoDB"]);
        assert!(db.has_connection("APIGateway", "Lambda"));
        assert!(db.has_connection("Lambda", "DynamoDB"));
    }

    #[test]
    fn test_self_loops_and_duplicates_dropped() {
        let db = parse("a = Lambda()\nb = Lambda()\nc = S3()\na >> b\na >> c\nb >> c\n");
        assert_eq!(db.edge_count(), 1);
    }

    #[test]
    fn test_binding_after_chain_still_resolves() {
        let db = parse("a >> b\na = SQS()\nb = Lambda()\n");
        assert!(db.has_connection("SQS", "Lambda"));
    }

    #[test]
    fn test_unknown_kind_kept_on_fallback() {
        let policy = Policy::new().with(Condition::UnknownConstructor, Response::FallBack);
        let mut db = ArchitectureDatabase::with_policy(policy);
        FlatParser::new()
            .parse("m = Mainframe()\nf = Lambda()\nm >> f\n", &mut db)
            .unwrap();
        assert_eq!(kinds(&db), vec!["Mainframe", "Lambda"]);
        assert!(db.has_connection("Mainframe", "Lambda"));
    }

    #[test]
    fn test_unrecognized_content() {
        let db = parse("print('hello')\nx = Mainframe()\n");
        assert!(db.is_empty());
        assert!(!FlatParser::new().can_parse("print('hello')"));
    }
}
