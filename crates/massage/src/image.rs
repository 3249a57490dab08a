//! Mixed-content image transform.
//!
//! On a secure page, a plain `http:` image either triggers browser warnings
//! or silently fails to load, so massage rewrites or hides it:
//! - same-domain images get a scheme-relative `src` (the scheme prefix is
//!   stripped, leaving `//host/...`), which loads cleanly on either scheme;
//! - foreign images are swapped for an opaque placeholder that remembers the
//!   original `src` in `loki:src`, if `sanitize_unsecured` is on.
//!
//! On an insecure page, or with sanitizing off for foreign images, nothing
//! happens. Unmassage rebuilds a fresh `IMG` from `loki:src`, carrying over
//! only `title` and `alt`.

use crate::context::EditContext;
use crate::masseuse::{FAKE_ATTRIBUTE, Masseuse, MassageError};
use markup::NodeId;

pub const ORIGINAL_SRC_ATTRIBUTE: &str = "loki:src";
const PLACEHOLDER_ICON: &str = "images/insecure_image.gif";

enum Security {
    /// Same-domain insecure image: rewrite its `src` scheme-relative.
    RewriteSchemeRelative(String),
    /// Foreign insecure image: hide it behind a placeholder.
    Hide(String),
}

pub struct ImageSecurityMasseuse;

impl ImageSecurityMasseuse {
    fn classify(&self, cx: &EditContext, node: NodeId) -> Option<Security> {
        if !cx.page_is_secure() {
            return None;
        }
        let src = cx.doc.attribute(node, "src")?;
        if !src.to_ascii_lowercase().starts_with("http:") {
            return None;
        }
        let domain = url::Url::parse(src)
            .ok()
            .and_then(|url| url.host_str().map(|host| host.to_ascii_lowercase()));
        if domain.is_some() && domain == cx.editor_domain() {
            let relative = src["http:".len()..].to_string();
            return Some(Security::RewriteSchemeRelative(relative));
        }
        if cx.settings.sanitize_unsecured {
            return Some(Security::Hide(src.to_string()));
        }
        None
    }
}

impl Masseuse for ImageSecurityMasseuse {
    fn massage_tags(&self) -> &[&str] {
        &["IMG"]
    }

    fn needs_massaging(&self, cx: &EditContext, node: NodeId) -> bool {
        cx.doc.is_element_named(node, "IMG")
            && !cx.doc.has_attribute(node, ORIGINAL_SRC_ATTRIBUTE)
            && self.classify(cx, node).is_some()
    }

    fn needs_unmassaging(&self, cx: &EditContext, node: NodeId) -> bool {
        cx.doc.is_element_named(node, "IMG")
            && cx.doc.has_attribute(node, ORIGINAL_SRC_ATTRIBUTE)
    }

    fn massage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        if !cx.doc.is_element_named(node, "IMG") {
            return Err(MassageError::NotAnElement { expected: "IMG" });
        }
        let Some(security) = self.classify(cx, node) else {
            return Err(MassageError::AlreadyMassaged);
        };
        match security {
            Security::RewriteSchemeRelative(relative) => {
                log::debug!(target: "massage.image", "rewriting same-domain image scheme-relative");
                cx.doc.set_attribute(node, "src", &relative);
                Ok(node)
            }
            Security::Hide(original_src) => {
                log::debug!(target: "massage.image", "hiding insecure image: {original_src}");
                let placeholder = cx.doc.clone_shallow(node);
                cx.doc
                    .set_attribute(placeholder, ORIGINAL_SRC_ATTRIBUTE, &original_src);
                cx.doc.set_attribute(placeholder, FAKE_ATTRIBUTE, "true");
                let icon = cx.editor_image_uri(PLACEHOLDER_ICON);
                cx.doc.set_attribute(placeholder, "src", &icon);
                cx.doc.replace_child(placeholder, node);
                Ok(placeholder)
            }
        }
    }

    fn unmassage(&self, cx: &mut EditContext, node: NodeId) -> Result<NodeId, MassageError> {
        let Some(src) = cx
            .doc
            .attribute(node, ORIGINAL_SRC_ATTRIBUTE)
            .map(str::to_string)
        else {
            return Err(MassageError::NotAPlaceholder {
                construct: "insecure image",
            });
        };
        let real = cx.doc.create_element("img", &[]);
        for carried in ["title", "alt"] {
            if let Some(value) = cx.doc.attribute(node, carried).map(str::to_string) {
                if !value.is_empty() {
                    cx.doc.set_attribute(real, carried, &value);
                }
            }
        }
        cx.doc.set_attribute(real, "src", &src);
        cx.doc.replace_child(real, node);
        Ok(real)
    }
}
