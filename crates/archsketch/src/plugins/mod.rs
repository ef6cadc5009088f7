//! Conversion strategies and the shared document emitter

pub mod architecture;
pub mod drawio;
pub mod fallback;
pub mod flat;
pub mod orchestrator;

pub use orchestrator::{
    drawio_path_for, Conversion, ConversionOutcome, DetectorReport, Orchestrator,
};
