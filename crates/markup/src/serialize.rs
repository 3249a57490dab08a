//! Tree-to-markup serialization.
//!
//! The output contract mirrors the no-decode tokenizer: text passes through
//! verbatim, so a parse/serialize cycle is byte-stable for anything the
//! tokenizer accepted. Element names are emitted lowercase, attribute values
//! double-quoted with embedded quotes escaped, and members of the
//! self-closing set render as `<tag … />` when they have no children.
//!
//! Callers are expected to unmassage (and sanitize) before serializing; this
//! layer does not strip placeholder artifacts itself.

use crate::dom::{Document, NodeData, NodeId};
use crate::tokenizer::is_self_closing_tag;

pub fn serialize(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    match doc.data(node) {
        NodeData::Fragment => write_children(doc, node, out),
        NodeData::Text(text) => out.push_str(text),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Cdata(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        NodeData::Element { name, attributes } => {
            out.push('<');
            push_lowercase(out, name);
            for (attr_name, value) in attributes {
                out.push(' ');
                out.push_str(attr_name);
                out.push_str("=\"");
                push_attribute_value(out, value);
                out.push('"');
            }
            if !doc.has_children(node) && is_self_closing_tag(name) {
                out.push_str(" />");
                return;
            }
            out.push('>');
            write_children(doc, node, out);
            out.push_str("</");
            push_lowercase(out, name);
            out.push('>');
        }
    }
}

fn write_children(doc: &Document, node: NodeId, out: &mut String) {
    for &child in doc.children(node) {
        write_node(doc, child, out);
    }
}

fn push_lowercase(out: &mut String, name: &str) {
    out.extend(name.chars().map(|c| c.to_ascii_lowercase()));
}

fn push_attribute_value(out: &mut String, value: &str) {
    for c in value.chars() {
        if c == '"' {
            out.push_str("&quot;");
        } else {
            out.push(c);
        }
    }
}
