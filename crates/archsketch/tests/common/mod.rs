//! Helpers shared by the document-level tests
//!
//! Documents are read with `roxmltree`, so every helper first checks that
//! the output is well-formed XML.

#![allow(dead_code)]

use std::collections::HashMap;

/// Attributes of one `<mxCell>` element with its geometry
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub attrs: HashMap<String, String>,
    pub geometry: Option<(i64, i64)>,
}

impl Cell {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn id(&self) -> &str {
        self.get("id").unwrap_or_default()
    }

    pub fn is_edge(&self) -> bool {
        self.get("edge") == Some("1")
    }

    pub fn is_vertex(&self) -> bool {
        self.get("vertex") == Some("1")
    }

    pub fn is_group(&self) -> bool {
        self.is_vertex() && self.get("style").is_some_and(|s| s.contains("container=1"))
    }

    pub fn is_service(&self) -> bool {
        self.is_vertex() && !self.is_group()
    }
}

/// Parse a generated document, failing the test when it is not well-formed
pub fn parse(document: &str) -> roxmltree::Document<'_> {
    match roxmltree::Document::parse(document) {
        Ok(doc) => doc,
        Err(e) => panic!("generated document is not well-formed XML: {e}"),
    }
}

/// Collect every `<mxCell>` in document order
pub fn cells(document: &str) -> Vec<Cell> {
    let doc = parse(document);
    assert_eq!(doc.root_element().tag_name().name(), "mxfile");

    doc.descendants()
        .filter(|n| n.has_tag_name("mxCell"))
        .map(|node| Cell {
            attrs: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            geometry: node
                .children()
                .find(|c| c.has_tag_name("mxGeometry"))
                .and_then(|g| Some((g.attribute("x")?.parse().ok()?, g.attribute("y")?.parse().ok()?))),
        })
        .collect()
}

pub fn services(document: &str) -> Vec<Cell> {
    cells(document).into_iter().filter(Cell::is_service).collect()
}

pub fn groups(document: &str) -> Vec<Cell> {
    cells(document).into_iter().filter(Cell::is_group).collect()
}

pub fn edges(document: &str) -> Vec<Cell> {
    cells(document).into_iter().filter(Cell::is_edge).collect()
}

/// `x`/`y` of the geometry inside the cell with `id`
pub fn geometry(document: &str, id: &str) -> Option<(i64, i64)> {
    cells(document).into_iter().find(|c| c.id() == id)?.geometry
}
