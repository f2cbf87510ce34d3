//! Markup-to-text normalization for message bodies.
//!
//! # Responsibility
//! - Parse server-rendered HTML fragments into a small markup tree.
//! - Flatten that tree into a readable plain-text approximation.
//!
//! # Invariants
//! - Conversion is pure: no I/O, no global state besides compiled regexes.
//! - Parsing never fails; malformed markup degrades to best-effort structure.

pub mod markup;
pub mod plain;

pub use markup::{parse_markup, MarkupNode};
pub use plain::{strip_markup, to_plain_text};
