//! Remote directory domain model.
//!
//! # Responsibility
//! - Define the transient value types exchanged with the directory service.
//! - Keep remote identifiers opaque; this crate never mints or persists them.
//!
//! # Invariants
//! - Every remote object is identified by the id the server assigned.
//! - List titles are unique per identity and double as category keys.

pub mod account;
pub mod notification;
