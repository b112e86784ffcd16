//! Editing primitives for JS/TS configuration modules.
//!
//! Documents are tokenized (strings and comments are opaque), object literals
//! are parsed into a shallow [`ObjectLiteral`] model, mutated, and rendered
//! back in place. Text outside the edited regions is preserved byte for byte.

pub mod document;
pub mod lexer;
pub mod object;

pub use document::Document;
pub use object::{render_key, Anchor, Entry, ObjectLiteral};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("unbalanced brackets in object starting at byte {offset}")]
    Unbalanced { offset: usize },
    #[error("object `{0}` not found")]
    MissingObject(String),
    #[error("key `{key}` not found")]
    MissingKey { key: String },
}
