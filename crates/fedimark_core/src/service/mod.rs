//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate directory calls into classification and gating use-cases.
//! - Keep application handlers decoupled from remote protocol details.

pub mod classifier;
pub mod follower_gate;
