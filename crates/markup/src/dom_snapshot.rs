//! Deterministic DOM serialization for test comparisons.
//!
//! Not a public stable format; intended for structural-equality assertions
//! with readable diffs.
//!
//! Equivalence rules:
//! - Node kinds and element names must match.
//! - Attribute *sets* must match; order is insignificant (names are sorted).
//! - Text, CDATA, and comments must match exactly.

use crate::dom::{Document, NodeData, NodeId};
use std::fmt::Write;

#[derive(Debug)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    pub fn new(doc: &Document, root: NodeId) -> Self {
        let mut lines = Vec::new();
        walk(doc, root, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

fn walk(doc: &Document, node: NodeId, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match doc.data(node) {
        NodeData::Fragment => {
            lines.push(format!("{indent}#fragment"));
        }
        NodeData::Element { name, attributes } => {
            let mut sorted: Vec<&(String, String)> = attributes.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            let mut line = format!("{indent}<{name}");
            for (attr_name, value) in sorted {
                let _ = write!(&mut line, " {attr_name}={value:?}");
            }
            line.push('>');
            lines.push(line);
        }
        NodeData::Text(text) => lines.push(format!("{indent}{text:?}")),
        NodeData::Comment(text) => lines.push(format!("{indent}<!--{text}-->")),
        NodeData::Cdata(data) => lines.push(format!("{indent}<![CDATA[{data}]]>")),
    }
    for &child in doc.children(node) {
        walk(doc, child, depth + 1, lines);
    }
}

/// Structural equality under the snapshot's equivalence rules.
pub fn same_structure(doc_a: &Document, a: NodeId, doc_b: &Document, b: NodeId) -> bool {
    DomSnapshot::new(doc_a, a).render() == DomSnapshot::new(doc_b, b).render()
}
