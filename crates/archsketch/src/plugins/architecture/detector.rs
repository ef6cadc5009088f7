//! Detects clustered `diagrams` source

use tracing::{debug, trace};

use crate::core::syntax::constructor_calls;
use crate::core::{Detector, LineParser};

/// Detector for source with at least one `with Cluster(...)` line
#[derive(Debug, Default)]
pub struct ArchitectureDetector {
    lines: LineParser,
}

impl ArchitectureDetector {
    pub fn new() -> Self {
        Self {
            lines: LineParser::new(),
        }
    }

    fn cluster_lines(&self, input: &str) -> usize {
        input
            .lines()
            .filter(|line| self.lines.is_cluster_open(line))
            .count()
    }
}

impl Detector for ArchitectureDetector {
    fn detect(&self, input: &str) -> bool {
        trace!(input_len = input.len(), "ArchitectureDetector::detect called");
        let found = self.cluster_lines(input) > 0;
        if found {
            debug!("Detected cluster grouping");
        }
        found
    }

    fn confidence(&self, input: &str) -> f64 {
        if self.cluster_lines(input) == 0 {
            return 0.0;
        }
        if constructor_calls(input).is_empty() {
            0.6
        } else {
            1.0
        }
    }

    fn diagram_type(&self) -> &'static str {
        "clustered"
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["with Cluster(", ">>", "="]
    }
}
