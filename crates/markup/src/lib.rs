//! Tolerant HTML tokenizer, tree builder, and serializer.
//!
//! Pipeline: raw markup → [`parse`] (SAX events) → [`build_fragment`] (arena
//! tree) → edit → [`serialize`] (markup string). The massage layer sits on
//! top of the tree between building and serializing.

pub mod dom;
#[cfg(any(test, feature = "dom-snapshot"))]
pub mod dom_snapshot;
pub mod serialize;

mod builder;
mod error;
mod scan;
mod tokenizer;

pub use crate::builder::build_fragment;
pub use crate::dom::{Document, NodeData, NodeId};
pub use crate::error::ParseError;
pub use crate::serialize::serialize;
pub use crate::tokenizer::{ParseSink, SELF_CLOSING_TAGS, is_self_closing_tag, parse};
