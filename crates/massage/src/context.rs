//! Document-scoped editing context.
//!
//! Owns the arena, the body fragment, the editor settings, the media
//! side-table, and the fake-id generator. The side-table maps a placeholder's
//! fake id to the detached original subtree; its lifetime equals the
//! context's, so entries orphaned by a deleted placeholder simply leak until
//! the context is dropped.

use crate::fake_id::FakeIdAllocator;
use markup::{Document, NodeId, ParseError, build_fragment};
use std::collections::HashMap;
use url::Url;

/// Host-page facts the construct transforms need.
#[derive(Clone, Debug)]
pub struct EditorSettings {
    /// Base URI the editor's own images are served from
    /// (placeholder icons live under `images/` here).
    pub base_uri: String,
    /// Full URL of the page hosting the editor.
    pub page_url: String,
    /// Whether insecure foreign images are hidden behind a placeholder.
    pub sanitize_unsecured: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            base_uri: String::new(),
            page_url: String::new(),
            sanitize_unsecured: true,
        }
    }
}

#[derive(Debug)]
pub struct EditContext {
    pub doc: Document,
    /// Root fragment standing in for the editable document body.
    pub body: NodeId,
    pub settings: EditorSettings,
    pub(crate) fake_ids: FakeIdAllocator,
    pub(crate) massaged_media: HashMap<String, NodeId>,
}

impl EditContext {
    pub fn new(doc: Document, body: NodeId, settings: EditorSettings) -> Self {
        Self {
            doc,
            body,
            settings,
            fake_ids: FakeIdAllocator::default(),
            massaged_media: HashMap::new(),
        }
    }

    /// Parses `html` into a fresh context.
    pub fn from_html(html: &str, settings: EditorSettings) -> Result<Self, ParseError> {
        let mut doc = Document::new();
        let body = build_fragment(&mut doc, html)?;
        Ok(Self::new(doc, body, settings))
    }

    #[cfg(test)]
    pub(crate) fn seed_fake_ids(&mut self, seed: u64) {
        self.fake_ids = FakeIdAllocator::with_seed(seed);
    }

    /// Assigns (or returns) an identifier for `element`.
    pub fn assign_fake_id(&mut self, element: NodeId) -> String {
        self.fake_ids.assign(&mut self.doc, element)
    }

    /// Domain the editor page itself is served from, if `page_url` parses.
    pub fn editor_domain(&self) -> Option<String> {
        Url::parse(&self.settings.page_url)
            .ok()
            .and_then(|url| url.host_str().map(|host| host.to_ascii_lowercase()))
    }

    /// Whether the hosting page is loaded over a secure scheme.
    pub fn page_is_secure(&self) -> bool {
        !self
            .settings
            .page_url
            .to_ascii_lowercase()
            .starts_with("http:")
    }

    /// URL under the editor's own image directory.
    pub fn editor_image_uri(&self, relative: &str) -> String {
        format!("{}{relative}", self.settings.base_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EditorSettings {
        EditorSettings {
            base_uri: "https://edit.example.edu/loki/".to_string(),
            page_url: "https://edit.example.edu/pages/about".to_string(),
            sanitize_unsecured: true,
        }
    }

    #[test]
    fn from_html_builds_a_body_fragment() {
        let cx = EditContext::from_html("<p>hi</p>", settings()).expect("parses");
        assert_eq!(cx.doc.children(cx.body).len(), 1);
    }

    #[test]
    fn editor_domain_comes_from_the_page_url() {
        let cx = EditContext::from_html("", settings()).expect("parses");
        assert_eq!(cx.editor_domain().as_deref(), Some("edit.example.edu"));
        assert!(cx.page_is_secure());
    }

    #[test]
    fn plain_http_pages_are_not_secure() {
        let mut config = settings();
        config.page_url = "http://edit.example.edu/".to_string();
        let cx = EditContext::from_html("", config).expect("parses");
        assert!(!cx.page_is_secure());
    }
}
