//! Architecture parser implementation
//!
//! Folds over source lines with a scan state holding the currently open
//! cluster. Only a new `with Cluster(...)` line changes it; dedenting does
//! not close a cluster.

use anyhow::Result;
use tracing::{debug, info, span, trace, Level};

use super::ArchitectureDatabase;
use crate::core::catalog;
use crate::core::policy::{Condition, Response};
use crate::core::{
    ChainToken, Connection, ConvertError, Database, LineParser, Parser, ServiceInstance, Statement,
};

/// Accumulator threaded through the line fold
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanState {
    pub current_cluster: Option<String>,
}

/// Cluster-aware parser for `diagrams` source
#[derive(Debug, Default)]
pub struct ArchitectureParser {
    lines: LineParser,
}

impl ArchitectureParser {
    pub fn new() -> Self {
        Self {
            lines: LineParser::new(),
        }
    }

    fn scan_line(
        &self,
        state: ScanState,
        line: &str,
        database: &mut ArchitectureDatabase,
    ) -> Result<ScanState> {
        match self.lines.parse_line(line) {
            Statement::ClusterOpen { name } => {
                let name = database.open_cluster(name.as_deref());
                debug!(cluster = %name, "Entered cluster");
                Ok(ScanState {
                    current_cluster: Some(name),
                })
            }
            Statement::Assignment {
                ident,
                constructor,
                label,
            } => {
                // Unknown kinds kept by a fallback render with the default style
                let keep = catalog::is_known(&constructor)
                    || match database.policy().apply(Condition::UnknownConstructor, &constructor) {
                        Response::Skip => false,
                        Response::FallBack => true,
                        Response::Fail => {
                            return Err(
                                ConvertError::rejected(Condition::UnknownConstructor, constructor).into(),
                            )
                        }
                    };
                if keep {
                    database.add_node(
                        ServiceInstance::new(ident, constructor)
                            .with_label(label)
                            .in_cluster(state.current_cluster.clone()),
                    )?;
                }
                Ok(state)
            }
            Statement::Chain(tokens) => {
                self.connect_chain(&tokens, database)?;
                Ok(state)
            }
            Statement::Other => Ok(state),
        }
    }

    /// Connect each adjacent pair of endpoint tokens
    ///
    /// `Edge(...)` operands are transparent. A bracketed list connects every
    /// known member on one side to every known member on the other.
    fn connect_chain(&self, tokens: &[ChainToken], database: &mut ArchitectureDatabase) -> Result<()> {
        let endpoints: Vec<Vec<String>> = tokens
            .iter()
            .filter(|t| **t != ChainToken::Modifier)
            .map(|t| known_identifiers(t, database))
            .collect();

        for pair in endpoints.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            if left.is_empty() || right.is_empty() {
                let detail = "chain operand is not a known service";
                match database.policy().apply(Condition::DanglingConnection, detail) {
                    Response::Skip | Response::FallBack => continue,
                    Response::Fail => {
                        return Err(ConvertError::rejected(Condition::DanglingConnection, detail).into())
                    }
                }
            }
            for from in left {
                for to in right {
                    database.add_edge(Connection::new(from.clone(), to.clone()))?;
                }
            }
        }
        Ok(())
    }
}

fn known_identifiers(token: &ChainToken, database: &ArchitectureDatabase) -> Vec<String> {
    match token {
        ChainToken::Names(names) => names
            .iter()
            .filter(|n| {
                let known = database.has_service(n);
                if !known {
                    trace!(token = %n, "Unknown chain identifier");
                }
                known
            })
            .cloned()
            .collect(),
        ChainToken::Expression(_) | ChainToken::Modifier => Vec::new(),
    }
}

impl Parser<ArchitectureDatabase> for ArchitectureParser {
    fn parse(&self, input: &str, database: &mut ArchitectureDatabase) -> Result<()> {
        let parse_span = span!(Level::INFO, "parse_architecture", input_len = input.len());
        let _enter = parse_span.enter();

        let state = input
            .lines()
            .try_fold(ScanState::default(), |state, line| {
                self.scan_line(state, line, database)
            })?;

        info!(
            services = database.node_count(),
            clusters = database.clusters().len(),
            connections = database.edge_count(),
            last_cluster = ?state.current_cluster,
            "Parsing completed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "architecture"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        input.lines().any(|line| self.lines.is_cluster_open(line))
    }
}
