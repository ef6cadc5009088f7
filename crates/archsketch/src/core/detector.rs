//! Core detector trait for strategy selection
//!
//! A detector inspects raw diagram source and reports whether its strategy
//! applies.

/// Core trait for source detectors
pub trait Detector: Send + Sync {
    /// Detect if the input matches this strategy
    fn detect(&self, input: &str) -> bool;

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// Get the strategy name
    fn diagram_type(&self) -> &'static str;

    /// Get key patterns that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}
