//! Short-lived correlation identifiers ("fake ids").
//!
//! A fake id lets a placeholder find its way back to the original node (or
//! vice versa) after the tree has been mutated by the user. Generated ids are
//! `_loki_` followed by six random lowercase letters, collision-checked
//! against every element id in the owning arena.
//!
//! The generated-vs-user-authored distinction is load-bearing: `release`
//! must never strip an identifier the surrounding page depends on, so it only
//! removes ids matching the generator's own pattern.

use markup::{Document, NodeId};
use std::hash::{BuildHasher, Hasher};

pub const FAKE_ID_PREFIX: &str = "_loki_";

const GENERATED_LETTERS: usize = 6;

/// Whether `id` has the shape of a generated identifier
/// (`_loki_` + one or more lowercase letters).
pub fn is_fake_id(id: &str) -> bool {
    match id.strip_prefix(FAKE_ID_PREFIX) {
        Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_lowercase()),
        None => false,
    }
}

/// Identifier generator. One per edit context; state is just the xorshift
/// seed (no `rand` dependency anywhere in this workspace).
#[derive(Debug)]
pub struct FakeIdAllocator {
    state: u64,
}

impl Default for FakeIdAllocator {
    fn default() -> Self {
        // RandomState gives a per-process random key without an extra crate.
        let mut hasher = std::collections::hash_map::RandomState::new().build_hasher();
        hasher.write_u64(0x6c6f6b69); // "loki"
        Self::with_seed(hasher.finish())
    }
}

impl FakeIdAllocator {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.max(1), // xorshift must not start at zero
        }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn generate(&mut self, doc: &Document) -> String {
        loop {
            let mut id = String::with_capacity(FAKE_ID_PREFIX.len() + GENERATED_LETTERS);
            id.push_str(FAKE_ID_PREFIX);
            let mut bits = self.next();
            for _ in 0..GENERATED_LETTERS {
                id.push((b'a' + (bits % 26) as u8) as char);
                bits /= 26;
            }
            if !doc.id_in_use(&id) {
                return id;
            }
            log::debug!(target: "massage.fake_id", "id collision, re-rolling: {id}");
        }
    }

    /// Returns `element`'s id, generating and assigning one if it has none.
    pub fn assign(&mut self, doc: &mut Document, element: NodeId) -> String {
        if let Some(existing) = doc.attribute(element, "id") {
            return existing.to_string();
        }
        let id = self.generate(doc);
        doc.set_attribute(element, "id", &id);
        id
    }
}

/// Removes `element`'s id only if it matches the generated pattern.
pub fn release(doc: &mut Document, element: NodeId) {
    if doc.attribute(element, "id").is_some_and(is_fake_id) {
        doc.remove_attribute(element, "id");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_accepts_generated_shape_only() {
        assert!(is_fake_id("_loki_abcdef"));
        assert!(is_fake_id("_loki_z"));
        assert!(!is_fake_id("_loki_"));
        assert!(!is_fake_id("_loki_ABC"));
        assert!(!is_fake_id("_loki_abc1"));
        assert!(!is_fake_id("anchor"));
    }

    #[test]
    fn assign_respects_existing_ids() {
        let mut doc = Document::new();
        let el = doc.create_element("a", &[("id", "mine")]);
        let mut ids = FakeIdAllocator::with_seed(7);
        assert_eq!(ids.assign(&mut doc, el), "mine");
        assert_eq!(doc.attribute(el, "id"), Some("mine"));
    }

    #[test]
    fn assign_generates_pattern_conformant_ids() {
        let mut doc = Document::new();
        let el = doc.create_element("a", &[]);
        let mut ids = FakeIdAllocator::with_seed(7);
        let id = ids.assign(&mut doc, el);
        assert!(is_fake_id(&id), "expected generated shape, got: {id}");
        assert_eq!(doc.attribute(el, "id"), Some(id.as_str()));
    }

    #[test]
    fn generated_ids_are_unique_within_the_document() {
        let mut doc = Document::new();
        let mut ids = FakeIdAllocator::with_seed(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let el = doc.create_element("img", &[]);
            let id = ids.assign(&mut doc, el);
            assert!(seen.insert(id), "allocator produced a duplicate id");
        }
    }

    #[test]
    fn release_strips_generated_ids_only() {
        let mut doc = Document::new();
        let generated = doc.create_element("a", &[("id", "_loki_qwerty")]);
        let authored = doc.create_element("a", &[("id", "section-two")]);
        release(&mut doc, generated);
        release(&mut doc, authored);
        assert_eq!(doc.attribute(generated, "id"), None);
        assert_eq!(doc.attribute(authored, "id"), Some("section-two"));
    }
}
