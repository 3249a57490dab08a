//! Masseuse contract and the transform pipeline.
//!
//! A masseuse replaces elements inconvenient to edit with convenient fake
//! ones (massage) and restores the real markup on save (unmassage). Each
//! construct transform is stateless per call; anything that must persist
//! across a massage/unmassage pair lives in the [`EditContext`].
//!
//! Ordering: the pipeline applies transforms in registration order for both
//! directions. Each transform's unmassage locates its own placeholders by
//! tag/attribute signature, so relative ordering across distinct constructs
//! does not matter — only within-construct idempotence does.

use crate::context::EditContext;
use markup::NodeId;
use std::fmt;

/// Invariant violations: programmer errors, signaled immediately and not
/// retried. Identity misses (a placeholder whose target is gone) are *not*
/// errors; each construct handles them with a best-effort fallback branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MassageError {
    /// A construct transform was handed a node of the wrong kind.
    NotAnElement { expected: &'static str },
    /// Single-node massage was invoked on an already-massaged node.
    AlreadyMassaged,
    /// Single-node unmassage was invoked on something that is not this
    /// construct's placeholder.
    NotAPlaceholder { construct: &'static str },
}

impl fmt::Display for MassageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MassageError::NotAnElement { expected } => {
                write!(f, "expected {expected} element")
            }
            MassageError::AlreadyMassaged => {
                write!(f, "node is already massaged")
            }
            MassageError::NotAPlaceholder { construct } => {
                write!(f, "node is not a {construct} placeholder")
            }
        }
    }
}

impl std::error::Error for MassageError {}

/// Attribute marking an element as a stand-in for real markup.
pub const FAKE_ATTRIBUTE: &str = "loki:fake";

/// One construct transform.
///
/// `massage`/`unmassage` operate on a single node and return the node that
/// now occupies the construct's position. The descendant passes have default
/// implementations driving the single-node entry points over a snapshot of
/// trigger-tag matches; constructs with cross-node bookkeeping override them.
pub trait Masseuse {
    /// Tag names whose elements this transform massages from.
    fn massage_tags(&self) -> &[&str];

    /// Whether `node` is a real construct instance this transform converts.
    fn needs_massaging(&self, cx: &EditContext, node: NodeId) -> bool;

    /// Whether `node` is this transform's own placeholder (or editable form).
    fn needs_unmassaging(&self, cx: &EditContext, node: NodeId) -> bool;

    fn massage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError>;

    fn unmassage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError>;

    /// Whether higher-level selection logic should treat `node` as synthetic
    /// rather than as user content.
    fn is_placeholder(&self, cx: &EditContext, node: NodeId) -> bool {
        self.needs_unmassaging(cx, node)
    }

    fn massage_node_descendants(&self, cx: &mut EditContext, root: NodeId) {
        for node in self.trigger_matches(cx, root) {
            if self.needs_massaging(cx, node) {
                if let Err(error) = self.massage(cx, node) {
                    debug_assert!(false, "massage invariant violation: {error}");
                }
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
        for node in placeholders.into_iter().rev() {
            if let Err(error) = self.unmassage(cx, node) {
                debug_assert!(false, "unmassage invariant violation: {error}");
            }
        }
    }

    /// Reverse-document-order snapshot of elements matching the trigger
    /// tags, so conversions cannot disturb not-yet-visited matches.
    fn trigger_matches(&self, cx: &EditContext, root: NodeId) -> Vec<NodeId> {
        let mut matches: Vec<NodeId> = cx
            .doc
            .descendants(root)
            .into_iter()
            .filter(|&node| {
                self.massage_tags()
                    .iter()
                    .any(|tag| cx.doc.is_element_named(node, tag))
            })
            .collect();
        matches.reverse();
        matches
    }
}

/// Ordered list of construct transforms applied over a subtree.
pub struct Pipeline {
    masseuses: Vec<Box<dyn Masseuse>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            masseuses: Vec::new(),
        }
    }

    /// The six construct transforms in their standard order.
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.register(Box::new(crate::lists::ListNestingMasseuse));
        pipeline.register(Box::new(crate::table::TableMasseuse));
        pipeline.register(Box::new(crate::media::MediaMasseuse));
        pipeline.register(Box::new(crate::image::ImageSecurityMasseuse));
        pipeline.register(Box::new(crate::anchor::AnchorMasseuse));
        pipeline.register(Box::new(crate::semantic::SemanticElementMasseuse::strong_b()));
        pipeline.register(Box::new(crate::semantic::SemanticElementMasseuse::em_i()));
        pipeline
    }

    pub fn register(&mut self, masseuse: Box<dyn Masseuse>) {
        self.masseuses.push(masseuse);
    }

    /// Forward direction: real → convenient, in registration order.
    pub fn massage_node_descendants(&self, cx: &mut EditContext, root: NodeId) {
        for masseuse in &self.masseuses {
            masseuse.massage_node_descendants(cx, root);
        }
    }

    /// Reverse direction: convenient → real. Registration order, not
    /// reversed; see the module docs.
    pub fn unmassage_node_descendants(&self, cx: &mut EditContext, root: NodeId) {
        for masseuse in &self.masseuses {
            masseuse.unmassage_node_descendants(cx, root);
        }
    }

    pub fn massage_body(&self, cx: &mut EditContext) {
        let body = cx.body;
        self.massage_node_descendants(cx, body);
    }

    pub fn unmassage_body(&self, cx: &mut EditContext) {
        let body = cx.body;
        self.unmassage_node_descendants(cx, body);
    }

    pub fn is_placeholder(&self, cx: &EditContext, node: NodeId) -> bool {
        self.masseuses
            .iter()
            .any(|masseuse| masseuse.is_placeholder(cx, node))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
