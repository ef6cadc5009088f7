//! `mxfile` renderer implementation

use anyhow::Result;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::Write;
use tracing::{debug, info, span, Level};

use crate::core::catalog;
use crate::core::{
    ConvertError, DiagramLayout, PositionedShape, Renderer, RoutedConnector, ShapeElement,
};

const HEADER_OPEN: &str = r#"<mxfile host="app.diagrams.net" modified="2024-01-01T00:00:00.000Z" agent="5.0 (Windows)" version="22.1.11" etag="generated" type="device">"#;
const MODEL_OPEN: &str = r#"<mxGraphModel dx="1422" dy="794" grid="1" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" pageWidth="827" pageHeight="1169" math="0" shadow="0">"#;

const SERVICE_STYLE: &str = "sketch=0;outlineConnect=0;fontColor=#232F3E;gradientColor=none;strokeColor=none;dashed=0;verticalLabelPosition=bottom;verticalAlign=top;align=center;html=1;fontSize=12;fontStyle=0;aspect=fixed;pointerEvents=1;";
const GROUP_STYLE: &str = "rounded=0;whiteSpace=wrap;html=1;container=1;collapsible=0;fillColor=none;strokeColor=#232F3E;dashed=1;verticalAlign=top;align=left;spacingLeft=10;fontStyle=1;fontColor=#232F3E;";
const EDGE_STYLE: &str = "endArrow=classic;html=1;rounded=0;";

/// Id of the default layer every top-level cell hangs off
pub const LAYER_ID: u32 = 1;

/// Characters XML 1.0 does not allow anywhere in a document
fn is_forbidden_in_xml(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

/// Escape a string for use inside a double-quoted XML attribute
///
/// Characters XML 1.0 forbids are dropped.
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    let needs_escape = value.chars().any(|c| {
        matches!(c, '&' | '<' | '>' | '"' | '\'' | '\n' | '\r' | '\t') || is_forbidden_in_xml(c)
    });
    if !needs_escape {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            c if is_forbidden_in_xml(c) => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Style string for a service of `kind`; unknown kinds use the default kind
pub fn service_style(kind: &str) -> String {
    let entry = catalog::resolve(kind);
    format!(
        "{}fillColor={};shape={};",
        SERVICE_STYLE,
        entry.fill(),
        entry.glyph
    )
}

/// Style string for a connector between two anchor sides
fn edge_style(connector: &RoutedConnector) -> String {
    let (exit_x, exit_y) = connector.exit.relative();
    let (entry_x, entry_y) = connector.entry.relative();
    format!(
        "{}exitX={};exitY={};exitDx=0;exitDy=0;exitPerimeter=0;entryX={};entryY={};entryDx=0;entryDy=0;entryPerimeter=0;",
        EDGE_STYLE, exit_x, exit_y, entry_x, entry_y
    )
}

/// draw.io renderer
#[derive(Debug, Clone)]
pub struct DrawioRenderer {
    diagram_name: String,
}

impl DrawioRenderer {
    pub fn new(diagram_name: impl Into<String>) -> Self {
        Self {
            diagram_name: diagram_name.into(),
        }
    }

    pub fn diagram_name(&self) -> &str {
        &self.diagram_name
    }

    /// Check that every reference in the layout points at an emitted cell
    fn validate(&self, layout: &DiagramLayout) -> Result<(), ConvertError> {
        let mut seen: HashSet<u32> = HashSet::new();
        let groups: HashSet<u32> = layout
            .shapes
            .iter()
            .filter(|s| s.is_group())
            .map(|s| s.id)
            .collect();

        for shape in &layout.shapes {
            if shape.id <= LAYER_ID || !seen.insert(shape.id) {
                return Err(ConvertError::render_error(format!(
                    "duplicate or reserved cell id {}",
                    shape.id
                )));
            }
            if let Some(parent) = shape.parent {
                if !groups.contains(&parent) {
                    return Err(ConvertError::render_error(format!(
                        "shape {} references missing group {}",
                        shape.id, parent
                    )));
                }
            }
        }

        for connector in &layout.connectors {
            let dangling = [connector.source, connector.target]
                .iter()
                .any(|id| !seen.contains(id) || groups.contains(id));
            if dangling || !seen.insert(connector.id) {
                return Err(ConvertError::render_error(format!(
                    "connector {} is not wired to two shapes",
                    connector.id
                )));
            }
        }
        Ok(())
    }

    fn write_shape(&self, out: &mut String, shape: &PositionedShape) -> std::fmt::Result {
        let parent = shape.parent.unwrap_or(LAYER_ID);
        let (value, style) = match &shape.element {
            ShapeElement::Group { label } => (label.as_str(), GROUP_STYLE.to_string()),
            ShapeElement::Service { kind, label } => (label.as_str(), service_style(kind)),
        };
        writeln!(
            out,
            r#"        <mxCell id="{}" value="{}" style="{}" vertex="1" parent="{}">"#,
            shape.id,
            escape_attr(value),
            escape_attr(&style),
            parent
        )?;
        writeln!(
            out,
            r#"          <mxGeometry x="{}" y="{}" width="{}" height="{}" as="geometry"/>"#,
            shape.x, shape.y, shape.width, shape.height
        )?;
        writeln!(out, "        </mxCell>")
    }

    fn write_connector(&self, out: &mut String, connector: &RoutedConnector) -> std::fmt::Result {
        writeln!(
            out,
            r#"        <mxCell id="{}" value="" style="{}" edge="1" parent="{}" source="{}" target="{}">"#,
            connector.id,
            edge_style(connector),
            LAYER_ID,
            connector.source,
            connector.target
        )?;
        writeln!(
            out,
            r#"          <mxGeometry width="50" height="50" relative="1" as="geometry">"#
        )?;
        writeln!(
            out,
            r#"            <mxPoint x="{}" y="{}" as="sourcePoint"/>"#,
            connector.source_point.x, connector.source_point.y
        )?;
        writeln!(
            out,
            r#"            <mxPoint x="{}" y="{}" as="targetPoint"/>"#,
            connector.target_point.x, connector.target_point.y
        )?;
        writeln!(out, "          </mxGeometry>")?;
        writeln!(out, "        </mxCell>")
    }
}

impl Default for DrawioRenderer {
    fn default() -> Self {
        Self::new("Architecture")
    }
}

impl Renderer<DiagramLayout> for DrawioRenderer {
    type Output = String;

    fn render(&self, layout: &DiagramLayout) -> Result<String> {
        let render_span = span!(
            Level::INFO,
            "render_drawio",
            shapes = layout.shapes.len(),
            connectors = layout.connectors.len()
        );
        let _enter = render_span.enter();

        self.validate(layout)?;

        let mut out = String::with_capacity(1024 + 512 * layout.shapes.len());
        writeln!(out, "{}", HEADER_OPEN)?;
        writeln!(
            out,
            r#"  <diagram name="{}" id="generated">"#,
            escape_attr(&self.diagram_name)
        )?;
        writeln!(out, "    {}", MODEL_OPEN)?;
        writeln!(out, "      <root>")?;
        writeln!(out, r#"        <mxCell id="0"/>"#)?;
        writeln!(out, r#"        <mxCell id="{}" parent="0"/>"#, LAYER_ID)?;

        for shape in &layout.shapes {
            self.write_shape(&mut out, shape)?;
        }
        debug!(count = layout.shapes.len(), "Wrote shapes");

        for connector in &layout.connectors {
            self.write_connector(&mut out, connector)?;
        }
        debug!(count = layout.connectors.len(), "Wrote connectors");

        writeln!(out, "      </root>")?;
        writeln!(out, "    </mxGraphModel>")?;
        writeln!(out, "  </diagram>")?;
        write!(out, "</mxfile>")?;

        info!(bytes = out.len(), "Rendered draw.io document");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "drawio"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "mxfile"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnchorSide, Point};

    fn service(id: u32, kind: &str, x: i64, parent: Option<u32>) -> PositionedShape {
        PositionedShape {
            id,
            key: kind.to_lowercase(),
            element: ShapeElement::Service {
                kind: kind.to_string(),
                label: catalog::resolve(kind).label.to_string(),
            },
            x,
            y: 200,
            width: 78,
            height: 78,
            parent,
        }
    }

    fn default_pair() -> DiagramLayout {
        DiagramLayout {
            shapes: vec![service(2, "Lambda", 200, None), service(3, "S3", 400, None)],
            connectors: vec![RoutedConnector {
                id: 4,
                source: 2,
                target: 3,
                exit: AnchorSide::Right,
                entry: AnchorSide::Left,
                source_point: Point::new(278, 239),
                target_point: Point::new(400, 239),
            }],
            width: 678,
            height: 478,
        }
    }

    #[test]
    fn test_renderer_metadata() {
        let renderer = DrawioRenderer::default();
        assert_eq!(renderer.name(), "drawio");
        assert_eq!(renderer.format(), "mxfile");
        assert_eq!(renderer.diagram_name(), "Architecture");
    }

    #[test]
    fn test_fixed_header_and_root_cells() {
        let doc = DrawioRenderer::new("Demo").render(&default_pair()).unwrap();
        assert!(doc.starts_with("<mxfile host=\"app.diagrams.net\""));
        assert!(doc.contains("<diagram name=\"Demo\" id=\"generated\">"));
        assert!(doc.contains("<mxCell id=\"0\"/>"));
        assert!(doc.contains("<mxCell id=\"1\" parent=\"0\"/>"));
        assert!(doc.ends_with("</mxfile>"));
    }

    #[test]
    fn test_default_pair_cells() {
        let doc = DrawioRenderer::new("Demo").render(&default_pair()).unwrap();
        assert!(doc.contains("value=\"Lambda Function\""));
        assert!(doc.contains("fillColor=#ED7100;shape=mxgraph.aws4.lambda_function;"));
        assert!(doc.contains("fillColor=#7AA116;shape=mxgraph.aws4.s3;"));
        assert!(doc.contains("<mxGeometry x=\"400\" y=\"200\" width=\"78\" height=\"78\" as=\"geometry\"/>"));
        assert!(doc.contains("edge=\"1\" parent=\"1\" source=\"2\" target=\"3\""));
        assert!(doc.contains("exitX=1;exitY=0.5;"));
        assert!(doc.contains("entryX=0;entryY=0.5;"));
        assert!(doc.contains("<mxPoint x=\"278\" y=\"239\" as=\"sourcePoint\"/>"));
    }

    #[test]
    fn test_unknown_kind_uses_default_style() {
        assert_eq!(service_style("Mainframe"), service_style("Lambda"));
    }

    #[test]
    fn test_attributes_are_escaped() {
        assert_eq!(escape_attr("plain"), "plain");
        assert_eq!(
            escape_attr("A & B <\"x\">"),
            "A &amp; B &lt;&quot;x&quot;&gt;"
        );
        let doc = DrawioRenderer::new("R&D \"lab\"").render(&default_pair()).unwrap();
        assert!(doc.contains("name=\"R&amp;D &quot;lab&quot;\""));
    }

    #[test]
    fn test_forbidden_control_characters_dropped() {
        assert_eq!(escape_attr("x\u{1}y\u{1f}"), "xy");
        assert_eq!(escape_attr("a\tb\u{b}"), "a&#9;b");
        assert!(matches!(escape_attr("Café ☁"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_rejects_dangling_connector() {
        let mut layout = default_pair();
        layout.connectors[0].target = 99;
        let err = DrawioRenderer::default().render(&layout).unwrap_err();
        assert!(err.to_string().contains("connector 4"));
    }

    #[test]
    fn test_rejects_missing_parent_group() {
        let mut layout = default_pair();
        layout.shapes[1].parent = Some(2);
        assert!(DrawioRenderer::default().render(&layout).is_err());
    }
}
