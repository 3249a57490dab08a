//! Bidirectional document transforms for in-place HTML editing.
//!
//! The editable copy of a document ("massaged") differs from the saved copy
//! ("unmassaged"): constructs that browsers render invisibly or refuse to
//! edit are swapped for convenient stand-ins while editing and swapped back
//! on save. [`Pipeline::standard`] wires up the six construct transforms;
//! [`EditContext`] carries the document arena and the cross-transform state.

pub mod anchor;
pub mod context;
pub mod fake_id;
pub mod image;
pub mod lists;
pub mod masseuse;
pub mod media;
pub mod semantic;
pub mod table;

pub use anchor::AnchorMasseuse;
pub use context::{EditContext, EditorSettings};
pub use fake_id::{FAKE_ID_PREFIX, FakeIdAllocator, is_fake_id, release};
pub use image::ImageSecurityMasseuse;
pub use lists::ListNestingMasseuse;
pub use masseuse::{FAKE_ATTRIBUTE, MassageError, Masseuse, Pipeline};
pub use media::MediaMasseuse;
pub use semantic::SemanticElementMasseuse;
pub use table::{TableMasseuse, normalize_structure};
