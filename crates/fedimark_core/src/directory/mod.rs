//! Directory service contracts.
//!
//! # Responsibility
//! - Define the remote calls the classification engine depends on.
//! - Own the per-session identity cache and account locks shared by core
//!   services.
//!
//! # Invariants
//! - Every remote read is a fresh query; only the identity is cached.
//! - Remote failures surface as `DirectoryError`, never as panics.

pub mod client;
pub mod locks;
pub mod session;
