//! Table editing transform.
//!
//! Tables are real content, not placeholders; massage only makes them
//! editable in place:
//! - borderless tables get a `loki__borderless_table` class so a stylesheet
//!   can draw guide borders while editing;
//! - every cell gets a trailing `BR` so empty cells keep a caret-reachable
//!   line box;
//! - the structure is normalized to `THEAD`/`TBODY` (see
//!   [`normalize_structure`]).
//!
//! Unmassage strips the class and one trailing `BR` per cell.

use crate::context::EditContext;
use crate::masseuse::{Masseuse, MassageError};
use markup::{Document, NodeId};

pub const BORDERLESS_CLASS: &str = "loki__borderless_table";
const EMPTY_HEADER_TEXT: &str = "Column title";

/// Whether the cell renders as blank: no children, or nothing but
/// whitespace, `&nbsp;` entities, and `BR` elements. Entity text is matched
/// verbatim because parsed text is never decoded.
fn cell_is_empty(doc: &Document, cell: NodeId) -> bool {
    doc.children(cell).iter().all(|&child| match doc.data(child) {
        markup::NodeData::Text(text) => text
            .split("&nbsp;")
            .all(|run| run.chars().all(char::is_whitespace)),
        markup::NodeData::Element { .. } => doc.is_element_named(child, "BR"),
        _ => false,
    })
}

fn is_header_row(doc: &Document, row: NodeId) -> bool {
    let mut has_header_cell = false;
    for &cell in doc.children(row) {
        if doc.is_element_named(cell, "TD") {
            return false;
        }
        if doc.is_element_named(cell, "TH") {
            has_header_cell = true;
        }
    }
    has_header_cell
}

fn direct_child_named(doc: &Document, parent: NodeId, name: &str) -> Option<NodeId> {
    doc.children(parent)
        .iter()
        .copied()
        .find(|&child| doc.is_element_named(child, name))
}

fn table_bodies(doc: &Document, table: NodeId) -> Vec<NodeId> {
    doc.children(table)
        .iter()
        .copied()
        .filter(|&child| doc.is_element_named(child, "TBODY"))
        .collect()
}

/// First `TR` of the first `TBODY`, or of the table itself when no body
/// section exists yet.
fn first_row(doc: &Document, table: NodeId) -> Option<NodeId> {
    let source = table_bodies(doc, table).first().copied().unwrap_or(table);
    direct_child_named(doc, source, "TR")
}

/// Existing `THEAD`, or a fresh one inserted before the first child that is
/// neither a `CAPTION` nor a `COLGROUP`.
fn ensure_head(doc: &mut Document, table: NodeId) -> NodeId {
    if let Some(head) = direct_child_named(doc, table, "THEAD") {
        return head;
    }
    let head = doc.create_element("thead", &[]);
    let reference = doc.children(table).iter().copied().find(|&child| {
        !doc.is_element_named(child, "CAPTION") && !doc.is_element_named(child, "COLGROUP")
    });
    match reference {
        Some(reference) => doc.insert_before(head, reference),
        None => doc.append_child(table, head),
    }
    head
}

fn row_cells(doc: &Document, row: NodeId) -> Vec<NodeId> {
    doc.children(row)
        .iter()
        .copied()
        .filter(|&cell| doc.is_element_named(cell, "TD") || doc.is_element_named(cell, "TH"))
        .collect()
}

/// Reshapes `table` into the canonical `THEAD`/`TBODY` sectioning:
///
/// 1. With `first_row_is_head`, the first row is promoted into the head
///    unconditionally.
/// 2. An empty head pulls in the first row if that row looks like a header
///    row (at least one `TH`, no `TD`); otherwise the head is considered
///    invalid and removed at the end.
/// 3. If the table has no `TBODY`, one is created right after the head and
///    every direct-child `TR` is moved into it.
/// 4. Blank cells in a valid head are filled with placeholder title text.
pub fn normalize_structure(
    doc: &mut Document,
    table: NodeId,
    first_row_is_head: bool,
) -> Result<(), MassageError> {
    if !doc.is_element_named(table, "TABLE") {
        return Err(MassageError::NotAnElement { expected: "TABLE" });
    }

    if first_row_is_head {
        if let Some(row) = first_row(doc, table) {
            let head = ensure_head(doc, table);
            match doc.first_child(head) {
                Some(first) => doc.insert_before(row, first),
                None => doc.append_child(head, row),
            }
        }
    }

    let head = ensure_head(doc, table);
    let mut head_valid = true;
    if doc.elements_by_tag_name(head, "TR").is_empty() {
        match first_row(doc, table) {
            Some(candidate) if is_header_row(doc, candidate) => {
                match doc.first_child(head) {
                    Some(first) => doc.insert_before(candidate, first),
                    None => doc.append_child(head, candidate),
                }
            }
            _ => head_valid = false,
        }
    }

    if table_bodies(doc, table).is_empty() {
        let body = doc.create_element("tbody", &[]);
        doc.insert_after(body, head);
        let loose_rows: Vec<NodeId> = doc
            .children(table)
            .iter()
            .copied()
            .filter(|&child| doc.is_element_named(child, "TR"))
            .collect();
        for row in loose_rows {
            doc.append_child(body, row);
        }
    }

    if head_valid {
        let head_rows: Vec<NodeId> = doc
            .children(head)
            .iter()
            .copied()
            .filter(|&child| doc.is_element_named(child, "TR"))
            .collect();
        for row in head_rows {
            for cell in row_cells(doc, row) {
                if cell_is_empty(doc, cell) {
                    doc.set_text_content(cell, EMPTY_HEADER_TEXT);
                }
            }
        }
    } else {
        doc.detach(head);
    }
    Ok(())
}

fn all_cells(doc: &Document, table: NodeId) -> Vec<NodeId> {
    doc.descendants(table)
        .into_iter()
        .filter(|&node| doc.is_element_named(node, "TD") || doc.is_element_named(node, "TH"))
        .collect()
}

pub struct TableMasseuse;

impl Masseuse for TableMasseuse {
    fn massage_tags(&self) -> &[&str] {
        &["TABLE"]
    }

    fn needs_massaging(&self, cx: &EditContext, node: NodeId) -> bool {
        cx.doc.is_element_named(node, "TABLE")
    }

    fn needs_unmassaging(&self, cx: &EditContext, node: NodeId) -> bool {
        cx.doc.is_element_named(node, "TABLE")
    }

    /// Massaged tables are still genuine user content.
    fn is_placeholder(&self, _cx: &EditContext, _node: NodeId) -> bool {
        false
    }

    fn massage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        if !cx.doc.is_element_named(node, "TABLE") {
            return Err(MassageError::NotAnElement { expected: "TABLE" });
        }

        let borderless = cx
            .doc
            .attribute(node, "border")
            .is_none_or(|border| border.is_empty());
        if borderless {
            cx.doc.add_class(node, BORDERLESS_CLASS);
        }

        for cell in all_cells(&cx.doc, node) {
            let padded = cx
                .doc
                .last_child(cell)
                .is_some_and(|last| cx.doc.is_element_named(last, "BR"));
            if !padded {
                let br = cx.doc.create_element("br", &[]);
                cx.doc.append_child(cell, br);
            }
        }

        normalize_structure(&mut cx.doc, node, false)?;
        Ok(node)
    }

    fn unmassage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        if !cx.doc.is_element_named(node, "TABLE") {
            return Err(MassageError::NotAnElement { expected: "TABLE" });
        }
        cx.doc.remove_class(node, BORDERLESS_CLASS);
        for cell in all_cells(&cx.doc, node) {
            let trailing_br = cx
                .doc
                .last_child(cell)
                .filter(|&last| cx.doc.is_element_named(last, "BR"));
            if let Some(br) = trailing_br {
                cx.doc.detach(br);
            }
        }
        Ok(node)
    }
}
