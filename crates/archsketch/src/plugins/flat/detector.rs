//! Detects cluster-free `diagrams` source

use crate::core::syntax::constructor_calls;
use crate::core::Detector;

/// Detector for any non-blank source
///
/// Non-blank text always selects the flat strategy when no cluster is
/// present; confidence reflects whether any constructor was recognized.
#[derive(Debug, Default)]
pub struct FlatDetector;

impl FlatDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for FlatDetector {
    fn detect(&self, input: &str) -> bool {
        !input.trim().is_empty()
    }

    fn confidence(&self, input: &str) -> f64 {
        if !self.detect(input) {
            0.0
        } else if constructor_calls(input).is_empty() {
            0.2
        } else {
            0.9
        }
    }

    fn diagram_type(&self) -> &'static str {
        "flat"
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["(", ">>"]
    }
}
