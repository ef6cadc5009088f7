//! Conversion orchestrator
//!
//! Selects a strategy for the input, then runs
//! Detector → Parser → Database → Layout → Renderer and optionally writes the
//! resulting document next to the rendered image.

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, span, trace, warn, Level};

use crate::core::policy::{Condition, Response};
use crate::core::{
    ConvertError, Database, Detector, Diagram, DiagramLayout, LayoutAlgorithm, Parser, Policy,
    Renderer, Strategy,
};
use crate::plugins::architecture::ArchitectureDiagram;
use crate::plugins::drawio::DrawioRenderer;
use crate::plugins::fallback::FilenameDiagram;
use crate::plugins::flat::FlatDiagram;

/// A rendered conversion
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub strategy: Strategy,
    pub document: String,
    pub layout: DiagramLayout,
}

/// Structured result of writing a document to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawio_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
}

impl ConversionOutcome {
    fn written(path: Option<PathBuf>, strategy: Strategy) -> Self {
        let message = match &path {
            Some(path) => format!("Draw.io file created at {}", path.display()),
            None => "Draw.io document converted but not written".to_string(),
        };
        Self {
            message: Some(message),
            success: true,
            drawio_path: path,
            error: None,
            strategy: Some(strategy),
        }
    }

    fn failed(error: &ConvertError) -> Self {
        Self {
            success: false,
            drawio_path: None,
            message: None,
            error: Some(error.to_string()),
            strategy: None,
        }
    }
}

/// Path of the document written for `image`
pub fn drawio_path_for(image: &Path) -> PathBuf {
    image.with_extension("drawio")
}

/// Keyword source for the filename fallback: the image stem, else `name`
fn fallback_hint(image: Option<&Path>, name: &str) -> String {
    image
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// What one detector makes of a source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorReport {
    pub diagram_type: &'static str,
    pub confidence: f64,
    pub patterns: Vec<&'static str>,
}

/// Coordinates strategy selection and the conversion pipeline
pub struct Orchestrator {
    /// Detectors in priority order
    detectors: Vec<(Strategy, Arc<dyn Detector>)>,
    policy: Policy,
}

impl Orchestrator {
    /// Orchestrator with the clustered, flat and filename strategies
    pub fn new() -> Self {
        Self::with_policy(Policy::default())
    }

    /// Orchestrator whose stages answer conditions with `policy`
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            detectors: vec![
                (Strategy::Clustered, ArchitectureDiagram::detector()),
                (Strategy::Flat, FlatDiagram::detector()),
                (Strategy::Filename, FilenameDiagram::detector()),
            ],
            policy,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn strategies(&self) -> Vec<Strategy> {
        self.detectors.iter().map(|(s, _)| *s).collect()
    }

    /// First strategy whose detector accepts the source
    ///
    /// Missing or blank source always selects the filename strategy.
    pub fn select_strategy(&self, source: Option<&str>) -> Strategy {
        let detect_span = span!(Level::DEBUG, "select_strategy");
        let _enter = detect_span.enter();

        let Some(source) = source.filter(|s| !s.trim().is_empty()) else {
            debug!("No source available");
            return Strategy::Filename;
        };

        for (strategy, detector) in &self.detectors {
            trace!(detector = detector.diagram_type(), "Checking detector");
            if detector.detect(source) {
                debug!(%strategy, "Strategy selected");
                return *strategy;
            }
        }
        Strategy::Filename
    }

    /// Confidence and key patterns of every detector for `source`
    pub fn detector_report(&self, source: &str) -> Vec<DetectorReport> {
        self.detectors
            .iter()
            .map(|(_, d)| DetectorReport {
                diagram_type: d.diagram_type(),
                confidence: d.confidence(source),
                patterns: d.patterns(),
            })
            .collect()
    }

    /// Parse and lay out `input` with one strategy
    pub fn run_pipeline<D: Diagram>(&self, input: &str) -> Result<DiagramLayout> {
        let pipeline_span = span!(Level::INFO, "run_pipeline", strategy = D::name());
        let _enter = pipeline_span.enter();

        let parse_span = span!(Level::DEBUG, "pipeline_parse");
        let _parse_enter = parse_span.enter();
        let parser = D::create_parser();
        let mut database = D::create_database(self.policy.clone());
        parser.parse(input, &mut database)?;
        debug!(
            node_count = database.node_count(),
            edge_count = database.edge_count(),
            "Parsing completed"
        );
        drop(_parse_enter);

        let layout_span = span!(Level::DEBUG, "pipeline_layout");
        let _layout_enter = layout_span.enter();
        let layout = D::create_layout().layout(&database)?;
        debug!(
            shapes = layout.shapes.len(),
            connectors = layout.connectors.len(),
            "Layout completed"
        );
        drop(_layout_enter);

        Ok(layout)
    }

    /// Lay out `source`, falling back to the file name hint
    ///
    /// A clustered or flat result without services is handled by the
    /// policy; by default it is replaced by the filename strategy run on
    /// `name_hint`.
    pub fn layout(&self, source: Option<&str>, name_hint: &str) -> Result<(Strategy, DiagramLayout)> {
        let strategy = self.select_strategy(source);
        let source = source.unwrap_or_default();

        let layout = match strategy {
            Strategy::Clustered => self.run_pipeline::<ArchitectureDiagram>(source)?,
            Strategy::Flat => self.run_pipeline::<FlatDiagram>(source)?,
            Strategy::Filename => {
                return Ok((strategy, self.run_pipeline::<FilenameDiagram>(name_hint)?))
            }
        };

        if layout.service_count() == 0 {
            let detail = format!("{} source", strategy);
            match self.policy.apply(Condition::NoRecognizedContent, &detail) {
                Response::FallBack => {
                    let layout = self.run_pipeline::<FilenameDiagram>(name_hint)?;
                    return Ok((Strategy::Filename, layout));
                }
                Response::Skip => {}
                Response::Fail => {
                    return Err(ConvertError::rejected(Condition::NoRecognizedContent, detail).into())
                }
            }
        }
        Ok((strategy, layout))
    }

    /// Convert source to a draw.io document
    ///
    /// `image` only feeds the filename fallback through its file stem;
    /// without it the whole diagram name is the keyword source.
    pub fn convert(&self, source: Option<&str>, name: &str, image: Option<&Path>) -> Result<Conversion> {
        let convert_span = span!(
            Level::INFO,
            "convert",
            diagram = name,
            source_len = source.map_or(0, str::len)
        );
        let _enter = convert_span.enter();

        let hint = fallback_hint(image, name);
        let (strategy, layout) = self.layout(source, &hint)?;

        let document = DrawioRenderer::new(name).render(&layout)?;
        info!(
            %strategy,
            shapes = layout.shapes.len(),
            connectors = layout.connectors.len(),
            "Conversion completed"
        );
        Ok(Conversion {
            strategy,
            document,
            layout,
        })
    }

    /// Write the document for `image` next to it
    ///
    /// Under the default policy the image must exist and nothing is written
    /// otherwise. The returned path is `None` when the policy lets a failed
    /// write pass.
    pub fn try_convert_to_file(
        &self,
        image: &Path,
        name: &str,
        source: Option<&str>,
    ) -> Result<(Option<PathBuf>, Strategy), ConvertError> {
        if !image.exists() {
            match self
                .policy
                .apply(Condition::MissingOutputTarget, &image.display().to_string())
            {
                Response::Skip | Response::FallBack => {}
                Response::Fail => return Err(ConvertError::missing_output_target(image)),
            }
        }

        let conversion = self
            .convert(source, name, Some(image))
            .map_err(|e| match e.downcast::<ConvertError>() {
                Ok(err) => err,
                Err(other) => ConvertError::render_error(other.to_string()),
            })?;

        let path = drawio_path_for(image);
        if let Err(source) = fs::write(&path, &conversion.document) {
            return match self
                .policy
                .apply(Condition::WriteFailure, &path.display().to_string())
            {
                Response::Skip | Response::FallBack => Ok((None, conversion.strategy)),
                Response::Fail => Err(ConvertError::write_failure(&path, source)),
            };
        }

        info!(path = %path.display(), "Wrote draw.io document");
        Ok((Some(path), conversion.strategy))
    }

    /// [`Self::try_convert_to_file`] reported as a structured outcome
    pub fn convert_to_file(&self, image: &Path, name: &str, source: Option<&str>) -> ConversionOutcome {
        match self.try_convert_to_file(image, name, source) {
            Ok((path, strategy)) => ConversionOutcome::written(path, strategy),
            Err(err) => {
                warn!(error = %err, "Conversion to file failed");
                ConversionOutcome::failed(&err)
            }
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CLUSTERED: &str = r#"
with Cluster("Ingest"):
    stream = Kinesis("events")
    fn = Lambda("process")
stream >> fn
"#;

    #[test]
    fn test_orchestrator_default() {
        let orchestrator = Orchestrator::default();
        assert_eq!(
            orchestrator.strategies(),
            vec![Strategy::Clustered, Strategy::Flat, Strategy::Filename]
        );
    }

    #[test]
    fn test_strategy_selection() {
        let orchestrator = Orchestrator::new();
        assert_eq!(orchestrator.select_strategy(Some(CLUSTERED)), Strategy::Clustered);
        assert_eq!(orchestrator.select_strategy(Some("a = S3()")), Strategy::Flat);
        assert_eq!(orchestrator.select_strategy(Some("  \n")), Strategy::Filename);
        assert_eq!(orchestrator.select_strategy(None), Strategy::Filename);
    }

    #[test]
    fn test_detector_report_covers_all_strategies() {
        let report = Orchestrator::new().detector_report(CLUSTERED);
        let names: Vec<_> = report.iter().map(|r| r.diagram_type).collect();
        assert_eq!(names, vec!["clustered", "flat", "filename"]);
        assert_eq!(report[0].confidence, 1.0);
        assert!(report[0].patterns.contains(&"with Cluster("));
        assert!(report[2].patterns.contains(&"queue"));
    }

    #[test]
    fn test_unrecognized_source_falls_back() {
        let conversion = Orchestrator::new()
            .convert(Some("print('hello')"), "Demo", None)
            .unwrap();
        assert_eq!(conversion.strategy, Strategy::Filename);
        assert_eq!(conversion.layout.service_count(), 2);
        assert_eq!(conversion.layout.connectors.len(), 1);
    }

    #[test]
    fn test_clustered_source_without_services_falls_back() {
        let conversion = Orchestrator::new()
            .convert(Some("with Cluster(\"Legacy\"):\n    m = Mainframe()\n"), "L", None)
            .unwrap();
        assert_eq!(conversion.strategy, Strategy::Filename);
        assert_eq!(conversion.layout.service_count(), 2);
        assert_eq!(conversion.layout.group_count(), 0);
        assert_eq!(conversion.layout.connectors.len(), 1);
    }

    #[test]
    fn test_name_is_fallback_hint_without_image() {
        let conversion = Orchestrator::new()
            .convert(None, "queue_worker", None)
            .unwrap();
        assert!(conversion.document.contains("value=\"SQS Queue\""));

        let conversion = Orchestrator::new()
            .convert(None, "queue / storage.v2", None)
            .unwrap();
        let keys: Vec<&str> = conversion.layout.shapes.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["S3", "SQS"]);
    }

    #[test]
    fn test_image_stem_is_fallback_hint() {
        let conversion = Orchestrator::new()
            .convert(None, "Queue", Some(Path::new("ml_exports/stream.v2.png")))
            .unwrap();
        let keys: Vec<&str> = conversion.layout.shapes.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["Kinesis", "Lambda"]);
    }

    #[test]
    fn test_policy_decides_unrecognized_content() {
        let source = Some("with Cluster(\"Legacy\"):\n    m = Mainframe(\"core\")\n");

        let keep = Policy::new().with(Condition::UnknownConstructor, Response::FallBack);
        let conversion = Orchestrator::with_policy(keep).convert(source, "L", None).unwrap();
        assert_eq!(conversion.strategy, Strategy::Clustered);
        assert_eq!(conversion.layout.group_count(), 1);
        assert!(conversion.document.contains("value=\"core\""));

        let empty = Policy::new().with(Condition::NoRecognizedContent, Response::Skip);
        let conversion = Orchestrator::with_policy(empty).convert(source, "L", None).unwrap();
        assert_eq!(conversion.strategy, Strategy::Clustered);
        assert_eq!(conversion.layout.service_count(), 0);

        let strict = Policy::new().with(Condition::NoRecognizedContent, Response::Fail);
        let err = Orchestrator::with_policy(strict).convert(source, "L", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::Rejected {
                condition: Condition::NoRecognizedContent,
                ..
            })
        ));
    }

    #[test]
    fn test_convert_to_file_writes_sibling() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("arch.png");
        fs::write(&image, b"png").unwrap();

        let outcome = Orchestrator::new().convert_to_file(&image, "Arch", Some(CLUSTERED));
        assert!(outcome.success);
        assert_eq!(outcome.strategy, Some(Strategy::Clustered));
        let path = outcome.drawio_path.unwrap();
        assert_eq!(path, dir.path().join("arch.drawio"));
        assert!(fs::read_to_string(&path).unwrap().contains("Ingest"));
        assert!(outcome.message.unwrap().starts_with("Draw.io file created at"));
    }

    #[test]
    fn test_missing_image_writes_nothing() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("missing.png");

        let outcome = Orchestrator::new().convert_to_file(&image, "Arch", Some(CLUSTERED));
        assert!(!outcome.success);
        assert!(outcome.drawio_path.is_none());
        assert!(outcome.error.unwrap().contains("not found"));
        assert!(!dir.path().join("missing.drawio").exists());
    }

    #[test]
    fn test_missing_image_tolerated_by_policy() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("missing.png");
        let policy = Policy::new().with(Condition::MissingOutputTarget, Response::Skip);

        let outcome = Orchestrator::with_policy(policy).convert_to_file(&image, "Arch", Some(CLUSTERED));
        assert!(outcome.success);
        assert!(dir.path().join("missing.drawio").exists());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("arch.png");
        fs::write(&image, b"png").unwrap();
        fs::create_dir(dir.path().join("arch.drawio")).unwrap();

        let err = Orchestrator::new()
            .try_convert_to_file(&image, "Arch", None)
            .unwrap_err();
        assert!(matches!(err, ConvertError::WriteFailure { .. }));

        let policy = Policy::new().with(Condition::WriteFailure, Response::Skip);
        let outcome = Orchestrator::with_policy(policy).convert_to_file(&image, "Arch", None);
        assert!(outcome.success);
        assert!(outcome.drawio_path.is_none());
        assert_eq!(outcome.strategy, Some(Strategy::Filename));
    }

    #[test]
    fn test_drawio_path_for() {
        assert_eq!(
            drawio_path_for(Path::new("out/diagram.png")),
            PathBuf::from("out/diagram.drawio")
        );
        assert_eq!(drawio_path_for(Path::new("bare")), PathBuf::from("bare.drawio"));
    }
}
