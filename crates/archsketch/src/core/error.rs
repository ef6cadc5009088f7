//! Core error types for the conversion pipeline
//!
//! Under the default policy malformed diagram source is never an error; it
//! degrades to a fallback layout. These variants cover the conditions that
//! do surface to callers.

use std::path::PathBuf;
use thiserror::Error;

use super::policy::Condition;

/// Errors surfaced by the conversion pipeline
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Target image not found: {}", .path.display())]
    MissingOutputTarget { path: PathBuf },

    #[error("Failed to write '{}': {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Layout error: {message}")]
    LayoutError { message: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Rejected {condition}: {detail}")]
    Rejected { condition: Condition, detail: String },
}

impl ConvertError {
    /// Create a missing output target error
    pub fn missing_output_target(path: impl Into<PathBuf>) -> Self {
        Self::MissingOutputTarget { path: path.into() }
    }

    /// Create a write failure error
    pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    /// Create a new layout error
    pub fn layout_error(message: String) -> Self {
        Self::LayoutError { message }
    }

    /// Create a new render error
    pub fn render_error(message: String) -> Self {
        Self::RenderError { message }
    }

    /// A condition the policy answered with `Fail`
    pub fn rejected(condition: Condition, detail: impl Into<String>) -> Self {
        Self::Rejected {
            condition,
            detail: detail.into(),
        }
    }
}
