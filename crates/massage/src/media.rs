//! Embedded-media transform.
//!
//! `OBJECT`, `VIDEO`, and `AUDIO` elements are opaque plugins inside an
//! editable document, so massage detaches the real element into the context's
//! side-table and leaves a placeholder image keyed by a fake id. Unmassage
//! looks the id up and splices the original subtree back, byte for byte. A
//! placeholder whose id is missing from the table (document reloaded, or
//! pasted from another session) is left untouched.

use crate::context::EditContext;
use crate::masseuse::{FAKE_ATTRIBUTE, Masseuse, MassageError};
use markup::NodeId;

pub const PLACEHOLDER_CLASS: &str = "loki__media_placeholder";
const PLACEHOLDER_ICON: &str = "images/media/placeholder.gif";

pub struct MediaMasseuse;

impl Masseuse for MediaMasseuse {
    fn massage_tags(&self) -> &[&str] {
        &["OBJECT", "VIDEO", "AUDIO"]
    }

    fn needs_massaging(&self, cx: &EditContext, node: NodeId) -> bool {
        self.massage_tags()
            .iter()
            .any(|tag| cx.doc.is_element_named(node, tag))
    }

    fn needs_unmassaging(&self, cx: &EditContext, node: NodeId) -> bool {
        cx.doc.is_element_named(node, "IMG") && cx.doc.has_class(node, PLACEHOLDER_CLASS)
    }

    fn massage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        if !self.needs_massaging(cx, node) {
            return Err(MassageError::NotAnElement {
                expected: "OBJECT, VIDEO, or AUDIO",
            });
        }

        let src = cx.editor_image_uri(PLACEHOLDER_ICON);
        let placeholder = cx.doc.create_element(
            "img",
            &[
                ("class", PLACEHOLDER_CLASS),
                ("src", &src),
                (FAKE_ATTRIBUTE, "true"),
            ],
        );
        for dimension in ["width", "height"] {
            if let Some(value) = cx.doc.attribute(node, dimension).map(str::to_string) {
                cx.doc.set_attribute(placeholder, dimension, &value);
            }
        }
        let id = cx.assign_fake_id(placeholder);
        log::debug!(target: "massage.media", "stashing media element under {id}");

        cx.doc.replace_child(placeholder, node);
        cx.massaged_media.insert(id, node);
        Ok(placeholder)
    }

    fn unmassage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        if !self.needs_unmassaging(cx, node) {
            return Err(MassageError::NotAPlaceholder {
                construct: "media",
            });
        }
        let stashed = cx
            .doc
            .attribute(node, "id")
            .map(str::to_string)
            .and_then(|id| cx.massaged_media.remove(&id));
        match stashed {
            Some(original) => {
                cx.doc.replace_child(original, node);
                Ok(original)
            }
            None => {
                // Nothing to restore; leave the placeholder alone.
                log::debug!(target: "massage.media", "placeholder has no stashed media; leaving it");
                Ok(node)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EditorSettings;
    use markup::serialize;

    const EMBED: &str = "<p><object width=\"640\" height=\"360\" data=\"movie.swf\">\
<param name=\"movie\" value=\"movie.swf\" /><param name=\"loop\" value=\"true\" />\
<param name=\"quality\" value=\"high\" /><em>fallback</em></object></p>";

    fn context(html: &str) -> EditContext {
        let settings = EditorSettings {
            base_uri: "https://edit.example.edu/loki/".to_string(),
            page_url: "https://edit.example.edu/page".to_string(),
            sanitize_unsecured: true,
        };
        let mut cx = EditContext::from_html(html, settings).expect("fixture parses");
        cx.seed_fake_ids(0xbeef);
        cx
    }

    fn placeholder_in(cx: &EditContext) -> Option<NodeId> {
        cx.doc
            .descendants(cx.body)
            .into_iter()
            .find(|&node| MediaMasseuse.needs_unmassaging(cx, node))
    }

    #[test]
    fn massage_swaps_media_for_a_placeholder_image() {
        let mut cx = context(EMBED);
        let body = cx.body;
        MediaMasseuse.massage_node_descendants(&mut cx, body);

        assert!(cx.doc.elements_by_tag_name(body, "OBJECT").is_empty());
        let placeholder = placeholder_in(&cx).expect("placeholder present");
        assert_eq!(cx.doc.attribute(placeholder, "width"), Some("640"));
        assert_eq!(cx.doc.attribute(placeholder, "height"), Some("360"));
        assert_eq!(
            cx.doc.attribute(placeholder, "src"),
            Some("https://edit.example.edu/loki/images/media/placeholder.gif")
        );
        let id = cx.doc.attribute(placeholder, "id").expect("keyed by id");
        assert!(cx.massaged_media.contains_key(id));
    }

    #[test]
    fn round_trip_is_byte_for_byte() {
        let mut cx = context(EMBED);
        let body = cx.body;
        let before = serialize(&cx.doc, body);
        MediaMasseuse.massage_node_descendants(&mut cx, body);
        MediaMasseuse.unmassage_node_descendants(&mut cx, body);
        assert_eq!(serialize(&cx.doc, body), before);
    }

    #[test]
    fn moved_placeholder_restores_media_at_its_new_position() {
        let mut cx = context(&format!("{EMBED}<p id=\"dest\"></p>"));
        let body = cx.body;
        MediaMasseuse.massage_node_descendants(&mut cx, body);

        let placeholder = placeholder_in(&cx).expect("placeholder present");
        let dest = cx.doc.element_by_id(body, "dest").expect("dest exists");
        cx.doc.append_child(dest, placeholder);

        MediaMasseuse.unmassage_node_descendants(&mut cx, body);
        let object = cx.doc.elements_by_tag_name(body, "OBJECT")[0];
        assert_eq!(cx.doc.parent(object), Some(dest));
        assert_eq!(cx.doc.text_content(object), "fallback");
    }

    #[test]
    fn unknown_placeholder_is_left_untouched() {
        let html = "<p>a<img id=\"_loki_ghosts\" class=\"loki__media_placeholder\" \
src=\"x.gif\" loki:fake=\"true\" />b</p>";
        let mut cx = context(html);
        let body = cx.body;
        MediaMasseuse.unmassage_node_descendants(&mut cx, body);
        assert_eq!(
            serialize(&cx.doc, body),
            html,
            "a side-table miss must not remove the placeholder"
        );
    }

    #[test]
    fn deleted_placeholder_discards_the_stashed_media() {
        let mut cx = context(EMBED);
        let body = cx.body;
        MediaMasseuse.massage_node_descendants(&mut cx, body);
        let placeholder = placeholder_in(&cx).expect("placeholder present");
        cx.doc.detach(placeholder);
        MediaMasseuse.unmassage_node_descendants(&mut cx, body);
        assert!(cx.doc.elements_by_tag_name(body, "OBJECT").is_empty());
    }

    #[test]
    fn each_media_element_gets_its_own_key() {
        let mut cx = context("<audio src=\"a.mp3\"></audio><video src=\"b.webm\"></video>");
        let body = cx.body;
        MediaMasseuse.massage_node_descendants(&mut cx, body);
        assert_eq!(cx.massaged_media.len(), 2);
        MediaMasseuse.unmassage_node_descendants(&mut cx, body);
        assert_eq!(cx.massaged_media.len(), 0);
        assert_eq!(
            serialize(&cx.doc, body),
            "<audio src=\"a.mp3\"></audio><video src=\"b.webm\"></video>"
        );
    }
}
