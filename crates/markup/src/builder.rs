//! Tree builder: assembles tokenizer events into a document fragment.
//!
//! Well-formedness is enforced here rather than in the tokenizer: a closing
//! tag must match the element currently open (case-insensitively), and
//! closing past the fragment root is an error. Elements left open at end of
//! input are tolerated. On error the builder halts the scan; nodes appended
//! before the failure remain in the arena as the valid prefix.

use crate::dom::{Document, NodeId};
use crate::error::ParseError;
use crate::tokenizer::{self, ParseSink};

pub struct TreeBuilder<'d> {
    doc: &'d mut Document,
    root: NodeId,
    current: NodeId,
    error: Option<ParseError>,
}

impl<'d> TreeBuilder<'d> {
    pub fn new(doc: &'d mut Document) -> Self {
        let root = doc.create_fragment();
        Self {
            doc,
            root,
            current: root,
            error: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn finish(self) -> Result<NodeId, ParseError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.root),
        }
    }
}

impl ParseSink for TreeBuilder<'_> {
    fn open(&mut self, tag: &str, attributes: Vec<(String, String)>) {
        log::trace!(target: "markup.builder", "open: {tag}");
        let borrowed: Vec<(&str, &str)> = attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let element = self.doc.create_element(tag, &borrowed);
        self.doc.append_child(self.current, element);
        self.current = element;
    }

    fn close(&mut self, tag: &str) {
        if self.current == self.root {
            self.error = Some(ParseError::UnexpectedClosingTag {
                tag: tag.to_string(),
            });
            return;
        }
        if !self.doc.is_element_named(self.current, tag) {
            self.error = Some(ParseError::MismatchedClosingTag {
                expected: self
                    .doc
                    .tag_name(self.current)
                    .unwrap_or_default()
                    .to_string(),
                found: tag.to_string(),
            });
            return;
        }
        // The fragment root is always reachable from an open element.
        self.current = self
            .doc
            .parent(self.current)
            .unwrap_or(self.root);
    }

    fn text(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        let node = self.doc.create_text(data);
        self.doc.append_child(self.current, node);
    }

    fn cdata(&mut self, data: &str) {
        let node = self.doc.create_cdata(data);
        self.doc.append_child(self.current, node);
    }

    fn comment(&mut self, data: &str) {
        let node = self.doc.create_comment(data);
        self.doc.append_child(self.current, node);
    }

    fn should_halt(&self) -> bool {
        self.error.is_some()
    }
}

/// Parses `text` into a fragment node inside `doc`.
///
/// The returned fragment owns everything that was parsed. On error the
/// partially-built fragment remains in the arena but is not returned;
/// callers at the paste/load boundary are expected to degrade to treating
/// the content as inert text.
pub fn build_fragment(doc: &mut Document, text: &str) -> Result<NodeId, ParseError> {
    let mut builder = TreeBuilder::new(doc);
    let scan_result = tokenizer::parse(text, &mut builder);
    // At most one of the two can fail: a builder error halts the scan before
    // the tokenizer can produce its own.
    let built = builder.finish();
    scan_result.and(built)
}
