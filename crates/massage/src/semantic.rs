//! Semantic/presentational inline element transform.
//!
//! Browser editing commands produce and toggle the presentational tags (`B`,
//! `I`), so massage rewrites each semantic element (`STRONG`, `EM`) into its
//! presentational twin and unmassage rewrites every presentational element
//! back, whether or not this transform created it. Attributes are carried
//! over except empty-valued ones; the synthetic copy is tagged `loki:fake`.
//!
//! One instance handles one tag pair; the standard pipeline registers
//! `STRONG`/`B` and `EM`/`I`.

use crate::context::EditContext;
use crate::masseuse::{FAKE_ATTRIBUTE, Masseuse, MassageError};
use markup::NodeId;

pub struct SemanticElementMasseuse {
    semantic: &'static str,
    presentational: &'static str,
}

impl SemanticElementMasseuse {
    pub fn new(semantic: &'static str, presentational: &'static str) -> Self {
        Self {
            semantic,
            presentational,
        }
    }

    pub fn strong_b() -> Self {
        Self::new("STRONG", "B")
    }

    pub fn em_i() -> Self {
        Self::new("EM", "I")
    }

    /// Rebuilds `element` under `tag`, carrying over children and non-empty
    /// attributes, and swaps it into the tree.
    fn rename(&self, cx: &mut EditContext, element: NodeId, tag: &str, fake: bool) -> NodeId {
        let replacement = cx.doc.create_element(tag, &[]);
        let attributes: Vec<(String, String)> = cx
            .doc
            .attributes(element)
            .iter()
            .filter(|(name, value)| name != FAKE_ATTRIBUTE && !value.is_empty())
            .cloned()
            .collect();
        for (name, value) in &attributes {
            cx.doc.set_attribute(replacement, name, value);
        }
        if fake {
            cx.doc.set_attribute(replacement, FAKE_ATTRIBUTE, "true");
        }
        let children: Vec<NodeId> = cx.doc.children(element).to_vec();
        for child in children {
            cx.doc.append_child(replacement, child);
        }
        cx.doc.replace_child(replacement, element);
        replacement
    }
}

impl Masseuse for SemanticElementMasseuse {
    fn massage_tags(&self) -> &[&str] {
        std::slice::from_ref(&self.semantic)
    }

    fn needs_massaging(&self, cx: &EditContext, node: NodeId) -> bool {
        cx.doc.is_element_named(node, self.semantic)
    }

    /// Every presentational element converts back, not only the ones this
    /// transform created.
    fn needs_unmassaging(&self, cx: &EditContext, node: NodeId) -> bool {
        cx.doc.is_element_named(node, self.presentational)
    }

    fn is_placeholder(&self, cx: &EditContext, node: NodeId) -> bool {
        self.needs_unmassaging(cx, node) && cx.doc.has_attribute(node, FAKE_ATTRIBUTE)
    }

    fn massage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        if !cx.doc.is_element_named(node, self.semantic) {
            return Err(MassageError::NotAnElement {
                expected: self.semantic,
            });
        }
        Ok(self.rename(cx, node, self.presentational, true))
    }

    fn unmassage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        if !cx.doc.is_element_named(node, self.presentational) {
            return Err(MassageError::NotAPlaceholder {
                construct: self.presentational,
            });
        }
        Ok(self.rename(cx, node, self.semantic, false))
    }
}
