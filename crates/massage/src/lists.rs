//! Nested-list transform.
//!
//! Browsers' editing commands work best when a nested list is a direct child
//! of the outer list rather than living inside an `LI`. Massage hoists a
//! list out of its parent `LI` to become that item's following sibling:
//!
//! `<ul><li>out<ul>…</ul></li><li>next</li></ul>`
//! becomes
//! `<ul><li>out</li><ul>…</ul><li>next</li></ul>`
//!
//! Unmassage reverses it by tucking a list whose parent is a `UL`/`OL` into
//! the closest preceding `LI` sibling, creating an empty one when the list
//! has no item before it.

use crate::context::EditContext;
use crate::masseuse::{Masseuse, MassageError};
use markup::NodeId;

const LIST_TAGS: [&str; 2] = ["UL", "OL"];

fn is_list(cx: &EditContext, node: NodeId) -> bool {
    LIST_TAGS.iter().any(|tag| cx.doc.is_element_named(node, tag))
}

fn parent_is(cx: &EditContext, node: NodeId, tags: &[&str]) -> bool {
    cx.doc
        .parent(node)
        .is_some_and(|parent| tags.iter().any(|tag| cx.doc.is_element_named(parent, tag)))
}

/// Closest previous sibling that is an `LI`, skipping anything else.
fn previous_item(cx: &EditContext, node: NodeId) -> Option<NodeId> {
    let mut current = cx.doc.previous_sibling(node);
    while let Some(sibling) = current {
        if cx.doc.is_element_named(sibling, "LI") {
            return Some(sibling);
        }
        current = cx.doc.previous_sibling(sibling);
    }
    None
}

pub struct ListNestingMasseuse;

impl Masseuse for ListNestingMasseuse {
    fn massage_tags(&self) -> &[&str] {
        &LIST_TAGS
    }

    fn needs_massaging(&self, cx: &EditContext, node: NodeId) -> bool {
        is_list(cx, node) && parent_is(cx, node, &["LI"])
    }

    fn needs_unmassaging(&self, cx: &EditContext, node: NodeId) -> bool {
        is_list(cx, node) && parent_is(cx, node, &LIST_TAGS)
    }

    /// Hoisted lists are still genuine user content.
    fn is_placeholder(&self, _cx: &EditContext, _node: NodeId) -> bool {
        false
    }

    fn massage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        if !is_list(cx, node) {
            return Err(MassageError::NotAnElement { expected: "UL or OL" });
        }
        if !self.needs_massaging(cx, node) {
            return Err(MassageError::AlreadyMassaged);
        }
        let item = cx.doc.parent(node).filter(|&p| cx.doc.is_element_named(p, "LI"));
        if let Some(item) = item {
            cx.doc.insert_after(node, item);
        }
        Ok(node)
    }

    fn unmassage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        if !is_list(cx, node) {
            return Err(MassageError::NotAnElement { expected: "UL or OL" });
        }
        if !self.needs_unmassaging(cx, node) {
            return Ok(node);
        }
        let item = match previous_item(cx, node) {
            Some(item) => item,
            None => {
                let item = cx.doc.create_element("li", &[]);
                cx.doc.insert_before(item, node);
                item
            }
        };
        cx.doc.append_child(item, node);
        Ok(node)
    }
}
