//! Named-anchor transform.
//!
//! A named `<a>` is invisible in an editable document, so massage decorates
//! it with an inert marker image placed immediately before it. The anchor
//! itself stays in the tree; the marker's `loki:anchor_id` attribute records
//! the anchor's id (assigning a fake one if needed) and its `title` records
//! `#name` as a last-resort reconstruction source.
//!
//! Unmassage handles exactly four topologies:
//! - anchor deleted by the user → fabricate a fresh anchor from the marker;
//! - marker still adjacent to its anchor → discard the marker;
//! - marker moved, anchor childless → relocate the anchor to the marker;
//! - marker moved, anchor has content → split: strip the name from the
//!   original and create a new empty named anchor at the marker's position.
//!
//! No other topology exists for a single marker/anchor pair; anything that
//! looks like one indicates a placeholder edited by hand and falls into the
//! fabrication branch.

use crate::context::EditContext;
use crate::fake_id;
use crate::masseuse::{FAKE_ATTRIBUTE, Masseuse, MassageError};
use markup::NodeId;
use std::collections::HashSet;

pub const ANCHOR_ID_ATTRIBUTE: &str = "loki:anchor_id";
pub const PLACEHOLDER_CLASS: &str = "loki__named_anchor";
const MARKER_ICON: &str = "images/nav/anchor.gif";

pub struct AnchorMasseuse;

impl AnchorMasseuse {
    fn anchor_for_placeholder(&self, cx: &EditContext, placeholder: NodeId) -> Option<NodeId> {
        let id = cx.doc.attribute(placeholder, ANCHOR_ID_ATTRIBUTE)?;
        cx.doc.element_by_id(cx.body, id)
    }

    fn name_recorded_on(&self, cx: &EditContext, placeholder: NodeId) -> String {
        let title = cx.doc.attribute(placeholder, "title").unwrap_or("");
        title.strip_prefix('#').unwrap_or(title).to_string()
    }

    /// Best-effort anchor name: the live anchor's if reachable, else the one
    /// recorded on the marker.
    pub fn name_from_placeholder(&self, cx: &EditContext, placeholder: NodeId) -> String {
        if let Some(anchor) = self.anchor_for_placeholder(cx, placeholder) {
            if let Some(name) = cx.doc.attribute(anchor, "name") {
                if !name.is_empty() {
                    return name.to_string();
                }
            }
        }
        self.name_recorded_on(cx, placeholder)
    }

    /// Renames a massaged anchor through its marker, keeping the marker's
    /// bookkeeping consistent when the anchor's id doubled as its name.
    pub fn update_name(&self, cx: &mut EditContext, placeholder: NodeId, name: &str) {
        let title = format!("#{name}");
        cx.doc.set_attribute(placeholder, "title", &title);
        if let Some(anchor) = self.anchor_for_placeholder(cx, placeholder) {
            let id = cx.doc.attribute(anchor, "id").map(str::to_string);
            let old_name = cx.doc.attribute(anchor, "name").map(str::to_string);
            if id.is_some() && id == old_name {
                cx.doc.set_attribute(anchor, "id", name);
                cx.doc.set_attribute(placeholder, ANCHOR_ID_ATTRIBUTE, name);
            }
            cx.doc.set_attribute(anchor, "name", name);
        }
    }

    fn marker_already_present(&self, cx: &EditContext, anchor: NodeId) -> bool {
        let Some(id) = cx.doc.attribute(anchor, "id") else {
            return false;
        };
        cx.doc
            .previous_sibling(anchor)
            .is_some_and(|sibling| cx.doc.attribute(sibling, ANCHOR_ID_ATTRIBUTE) == Some(id))
    }
}

impl Masseuse for AnchorMasseuse {
    fn massage_tags(&self) -> &[&str] {
        &["A"]
    }

    fn needs_massaging(&self, cx: &EditContext, node: NodeId) -> bool {
        cx.doc.is_element_named(node, "A")
            && cx
                .doc
                .attribute(node, "name")
                .is_some_and(|name| !name.is_empty())
    }

    fn needs_unmassaging(&self, cx: &EditContext, node: NodeId) -> bool {
        cx.doc.is_element_named(node, "IMG") && cx.doc.has_attribute(node, ANCHOR_ID_ATTRIBUTE)
    }

    fn massage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        if !cx.doc.is_element_named(node, "A") {
            return Err(MassageError::NotAnElement { expected: "A" });
        }
        if self.marker_already_present(cx, node) {
            return Err(MassageError::AlreadyMassaged);
        }

        let anchor_id = cx.assign_fake_id(node);
        let name = cx.doc.attribute(node, "name").unwrap_or("").to_string();
        let title = format!("#{name}");
        let src = cx.editor_image_uri(MARKER_ICON);
        log::debug!(target: "massage.anchor", "marking named anchor {anchor_id} (#{name})");

        let placeholder = cx.doc.create_element(
            "img",
            &[
                ("class", PLACEHOLDER_CLASS),
                ("title", &title),
                ("src", &src),
                ("width", "12"),
                ("height", "12"),
                (FAKE_ATTRIBUTE, "true"),
                (ANCHOR_ID_ATTRIBUTE, &anchor_id),
            ],
        );
        cx.doc.insert_before(placeholder, node);
        Ok(placeholder)
    }

    fn unmassage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        let Some(expected_id) = cx.doc.attribute(node, ANCHOR_ID_ATTRIBUTE).map(str::to_string)
        else {
            return Err(MassageError::NotAPlaceholder {
                construct: "anchor",
            });
        };

        let Some(anchor) = cx.doc.element_by_id(cx.body, &expected_id) else {
            // The original anchor tag was somehow removed from the document.
            let name = self.name_recorded_on(cx, node);
            log::debug!(target: "massage.anchor", "anchor {expected_id} is gone; fabricating #{name}");
            let anchor = cx.doc.create_element("a", &[("name", &name)]);
            cx.doc.replace_child(anchor, node);
            return Ok(anchor);
        };

        let adjacent_id = cx
            .doc
            .next_sibling(node)
            .and_then(|sibling| cx.doc.attribute(sibling, "id"))
            .map(str::to_string);
        fake_id::release(&mut cx.doc, anchor);

        if adjacent_id.as_deref() == Some(expected_id.as_str()) {
            // Relative position has not changed.
            cx.doc.detach(node);
            return Ok(anchor);
        }

        if !cx.doc.has_children(anchor) {
            // Bare named anchor; just move it to the marker's spot.
            cx.doc.replace_child(anchor, node);
            return Ok(anchor);
        }

        // Anchor has child nodes: split, leaving the original anchor without
        // a name and creating a new named anchor at the marker's position.
        let name = cx.doc.attribute(anchor, "name").unwrap_or("").to_string();
        cx.doc.remove_attribute(anchor, "name");
        let replacement = cx.doc.create_element("a", &[("name", &name)]);
        cx.doc.replace_child(replacement, node);
        Ok(replacement)
    }

    fn massage_node_descendants(&self, cx: &mut EditContext, root: NodeId) {
        // Idempotence: anchors whose marker already exists under this root
        // are skipped, so a second massage pass cannot duplicate markers.
        let marked: HashSet<String> = cx
            .doc
            .descendants(root)
            .into_iter()
            .filter(|&node| self.needs_unmassaging(cx, node))
            .filter_map(|node| {
                cx.doc
                    .attribute(node, ANCHOR_ID_ATTRIBUTE)
                    .map(str::to_string)
            })
            .collect();

        for anchor in self.trigger_matches(cx, root) {
            if !self.needs_massaging(cx, anchor) {
                continue;
            }
            let already = cx
                .doc
                .attribute(anchor, "id")
                .is_some_and(|id| marked.contains(id));
            if already {
                continue;
            }
            if let Err(error) = self.massage(cx, anchor) {
                debug_assert!(false, "anchor massage invariant violation: {error}");
            }
        }
    }

    fn unmassage_node_descendants(&self, cx: &mut EditContext, root: NodeId) {
        let placeholders: Vec<NodeId> = cx
            .doc
            .descendants(root)
            .into_iter()
            .filter(|&node| self.needs_unmassaging(cx, node))
            .collect();
        let marked: HashSet<String> = placeholders
            .iter()
            .filter_map(|&node| {
                cx.doc
                    .attribute(node, ANCHOR_ID_ATTRIBUTE)
                    .map(str::to_string)
            })
            .collect();

        // Named anchors whose marker the user deleted are removed along with
        // the marker's construct: the marker stood for the anchor's presence.
        let anchors: Vec<NodeId> = cx.doc.elements_by_tag_name(root, "A");
        for anchor in anchors.into_iter().rev() {
            if !self.needs_massaging(cx, anchor) {
                continue;
            }
            let still_marked = cx
                .doc
                .attribute(anchor, "id")
                .is_some_and(|id| marked.contains(id));
            if !still_marked {
                log::debug!(target: "massage.anchor", "marker deleted; dropping orphaned anchor");
                cx.doc.detach(anchor);
            }
        }

        for placeholder in placeholders.into_iter().rev() {
            if let Err(error) = self.unmassage(cx, placeholder) {
                debug_assert!(false, "anchor unmassage invariant violation: {error}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EditorSettings;
    use markup::serialize;

    fn context(html: &str) -> EditContext {
        let settings = EditorSettings {
            base_uri: "https://edit.example.edu/loki/".to_string(),
            page_url: "https://edit.example.edu/page".to_string(),
            sanitize_unsecured: true,
        };
        let mut cx = EditContext::from_html(html, settings).expect("fixture parses");
        cx.seed_fake_ids(0x5eed);
        cx
    }

    fn placeholder_in(cx: &EditContext, root: NodeId) -> Option<NodeId> {
        cx.doc
            .descendants(root)
            .into_iter()
            .find(|&node| AnchorMasseuse.needs_unmassaging(cx, node))
    }

    #[test]
    fn massage_inserts_marker_before_the_anchor() {
        let mut cx = context("<p>a<a name=\"x\"></a>b</p>");
        let body = cx.body;
        AnchorMasseuse.massage_node_descendants(&mut cx, body);

        let marker = placeholder_in(&cx, body).expect("marker inserted");
        let anchor = cx.doc.next_sibling(marker).expect("anchor follows marker");
        assert!(cx.doc.is_element_named(anchor, "A"));
        assert_eq!(cx.doc.attribute(anchor, "name"), Some("x"));
        assert_eq!(cx.doc.attribute(marker, "title"), Some("#x"));
        assert_eq!(
            cx.doc.attribute(marker, ANCHOR_ID_ATTRIBUTE),
            cx.doc.attribute(anchor, "id"),
            "marker must record the anchor's id"
        );
    }

    #[test]
    fn massage_is_idempotent() {
        let mut cx = context("<p><a name=\"x\"></a></p>");
        let body = cx.body;
        AnchorMasseuse.massage_node_descendants(&mut cx, body);
        AnchorMasseuse.massage_node_descendants(&mut cx, body);
        let markers = cx
            .doc
            .descendants(body)
            .into_iter()
            .filter(|&n| AnchorMasseuse.needs_unmassaging(&cx, n))
            .count();
        assert_eq!(markers, 1, "second pass must not duplicate markers");
    }

    #[test]
    fn unmoved_marker_is_simply_discarded() {
        let mut cx = context("<p>a<a name=\"x\"></a>b</p>");
        let body = cx.body;
        AnchorMasseuse.massage_node_descendants(&mut cx, body);
        AnchorMasseuse.unmassage_node_descendants(&mut cx, body);
        assert_eq!(
            serialize(&cx.doc, body),
            "<p>a<a name=\"x\"></a>b</p>",
            "round trip must restore the original markup"
        );
    }

    #[test]
    fn moved_marker_relocates_a_bare_anchor() {
        let mut cx = context("<p>a<a name=\"x\"></a>b</p><p id=\"dest\">c</p>");
        let body = cx.body;
        AnchorMasseuse.massage_node_descendants(&mut cx, body);

        let marker = placeholder_in(&cx, body).expect("marker inserted");
        let dest = cx.doc.element_by_id(body, "dest").expect("dest exists");
        cx.doc.append_child(dest, marker);

        AnchorMasseuse.unmassage_node_descendants(&mut cx, body);
        assert_eq!(
            serialize(&cx.doc, body),
            "<p>ab</p><p id=\"dest\">c<a name=\"x\"></a></p>",
            "anchor must follow the marker and vanish from its old spot"
        );
    }

    #[test]
    fn moved_marker_splits_an_anchor_with_content() {
        let mut cx = context("<p><a name=\"x\">kept text</a></p><p id=\"dest\"></p>");
        let body = cx.body;
        AnchorMasseuse.massage_node_descendants(&mut cx, body);

        let marker = placeholder_in(&cx, body).expect("marker inserted");
        let dest = cx.doc.element_by_id(body, "dest").expect("dest exists");
        cx.doc.append_child(dest, marker);

        AnchorMasseuse.unmassage_node_descendants(&mut cx, body);
        assert_eq!(
            serialize(&cx.doc, body),
            "<p><a>kept text</a></p><p id=\"dest\"><a name=\"x\"></a></p>",
            "content stays behind anonymously; the name moves with the marker"
        );
    }

    #[test]
    fn deleted_anchor_is_fabricated_from_the_marker() {
        let mut cx = context("<p><a name=\"x\"></a>text</p>");
        let body = cx.body;
        AnchorMasseuse.massage_node_descendants(&mut cx, body);

        let marker = placeholder_in(&cx, body).expect("marker inserted");
        let anchor = cx.doc.next_sibling(marker).expect("anchor follows");
        cx.doc.detach(anchor);

        AnchorMasseuse.unmassage_node_descendants(&mut cx, body);
        assert_eq!(
            serialize(&cx.doc, body),
            "<p><a name=\"x\"></a>text</p>",
            "marker alone must be enough to rebuild the anchor"
        );
    }

    #[test]
    fn deleted_marker_removes_its_orphaned_anchor() {
        let mut cx = context("<p><a name=\"x\"></a>text</p>");
        let body = cx.body;
        AnchorMasseuse.massage_node_descendants(&mut cx, body);

        let marker = placeholder_in(&cx, body).expect("marker inserted");
        cx.doc.detach(marker);

        AnchorMasseuse.unmassage_node_descendants(&mut cx, body);
        assert_eq!(
            serialize(&cx.doc, body),
            "<p>text</p>",
            "deleting the marker deletes the construct"
        );
    }

    #[test]
    fn user_authored_anchor_id_survives_the_round_trip() {
        let mut cx = context("<p><a id=\"stable\" name=\"x\"></a></p>");
        let body = cx.body;
        AnchorMasseuse.massage_node_descendants(&mut cx, body);
        AnchorMasseuse.unmassage_node_descendants(&mut cx, body);
        assert_eq!(
            serialize(&cx.doc, body),
            "<p><a id=\"stable\" name=\"x\"></a></p>",
            "release must never strip a user-authored id"
        );
    }

    #[test]
    fn update_name_tracks_id_doubling_as_name() {
        let mut cx = context("<p><a id=\"intro\" name=\"intro\"></a></p>");
        let body = cx.body;
        AnchorMasseuse.massage_node_descendants(&mut cx, body);
        let marker = placeholder_in(&cx, body).expect("marker inserted");

        AnchorMasseuse.update_name(&mut cx, marker, "outro");
        assert_eq!(cx.doc.attribute(marker, "title"), Some("#outro"));
        assert_eq!(cx.doc.attribute(marker, ANCHOR_ID_ATTRIBUTE), Some("outro"));
        let anchor = cx.doc.element_by_id(body, "outro").expect("renamed id");
        assert_eq!(cx.doc.attribute(anchor, "name"), Some("outro"));
    }

    #[test]
    fn direct_massage_of_a_marked_anchor_is_an_invariant_violation() {
        let mut cx = context("<p><a name=\"x\"></a></p>");
        let body = cx.body;
        AnchorMasseuse.massage_node_descendants(&mut cx, body);
        let marker = placeholder_in(&cx, body).expect("marker inserted");
        let anchor = cx.doc.next_sibling(marker).expect("anchor follows");
        assert_eq!(
            AnchorMasseuse.massage(&mut cx, anchor),
            Err(MassageError::AlreadyMassaged)
        );
    }
}
