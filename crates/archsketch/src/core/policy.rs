//! Degrade policy for unexpected content
//!
//! Every condition the pipeline can meet while reading untrusted diagram
//! source maps to exactly one response. Call sites report the condition
//! through [`Policy::apply`] and carry out whatever it returns instead of
//! deciding locally. Conditions with no substitute content treat
//! [`Response::FallBack`] like [`Response::Skip`].

use serde::Serialize;
use std::fmt;
use tracing::{debug, error, trace};

/// Something unexpected found during conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Constructor call not in the catalog
    UnknownConstructor,
    /// Chain token that is not a known service identifier
    DanglingConnection,
    /// Connector whose endpoint received no position
    UnpositionedEndpoint,
    /// Cluster opened but never given a member
    EmptyCluster,
    /// File name matched fewer than two keywords
    UnmatchedFilename,
    /// Source present but nothing recognized in it
    NoRecognizedContent,
    /// Expected image file is absent
    MissingOutputTarget,
    /// Storage write failed
    WriteFailure,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Condition::UnknownConstructor => "unknown constructor",
            Condition::DanglingConnection => "dangling connection",
            Condition::UnpositionedEndpoint => "unpositioned endpoint",
            Condition::EmptyCluster => "empty cluster",
            Condition::UnmatchedFilename => "unmatched file name",
            Condition::NoRecognizedContent => "no recognized content",
            Condition::MissingOutputTarget => "missing output target",
            Condition::WriteFailure => "write failure",
        };
        f.write_str(text)
    }
}

/// What the pipeline does about a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Drop the offending element and continue
    Skip,
    /// Substitute the next-best strategy or default content
    FallBack,
    /// Stop and report a structured failure
    Fail,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Skip => write!(f, "skip"),
            Response::FallBack => write!(f, "fall back"),
            Response::Fail => write!(f, "fail"),
        }
    }
}

/// The default policy table
pub static POLICY: &[(Condition, Response)] = &[
    (Condition::UnknownConstructor, Response::Skip),
    (Condition::DanglingConnection, Response::Skip),
    (Condition::UnpositionedEndpoint, Response::Skip),
    (Condition::EmptyCluster, Response::Skip),
    (Condition::UnmatchedFilename, Response::FallBack),
    (Condition::NoRecognizedContent, Response::FallBack),
    (Condition::MissingOutputTarget, Response::Fail),
    (Condition::WriteFailure, Response::Fail),
];

/// Condition to response table consulted by every pipeline stage
///
/// Starts from [`POLICY`]; single entries can be replaced with
/// [`Policy::with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    table: Vec<(Condition, Response)>,
}

impl Policy {
    pub fn new() -> Self {
        Self {
            table: POLICY.to_vec(),
        }
    }

    /// Replace the response for `condition`
    pub fn with(mut self, condition: Condition, response: Response) -> Self {
        match self.table.iter_mut().find(|(c, _)| *c == condition) {
            Some(entry) => entry.1 = response,
            None => self.table.push((condition, response)),
        }
        self
    }

    pub fn entries(&self) -> &[(Condition, Response)] {
        &self.table
    }

    /// Look up the response for a condition
    pub fn response_for(&self, condition: Condition) -> Response {
        self.table
            .iter()
            .find(|(c, _)| *c == condition)
            .map(|(_, r)| *r)
            .unwrap_or(Response::Fail)
    }

    /// Report a condition and return the response the caller must carry out
    #[must_use]
    pub fn apply(&self, condition: Condition, detail: &str) -> Response {
        let response = self.response_for(condition);
        match response {
            Response::Skip => trace!(%condition, detail, "Skipping"),
            Response::FallBack => debug!(%condition, detail, "Falling back"),
            Response::Fail => error!(%condition, detail, "Conversion failed"),
        }
        response
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::new()
    }
}
