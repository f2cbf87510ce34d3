//! Notification trigger loops.
//!
//! # Responsibility
//! - Deliver inbound notifications to an application handler, one at a time.
//! - Offer a pull mode (fetch batch, dispatch, dismiss) and a push mode
//!   (consume a live event stream).
//!
//! # Invariants
//! - Both modes run on the calling thread and never dispatch concurrently.
//! - The loop waits for each handler call to return before the next one.
//! - Failed remote calls are reported, never retried.

pub mod handler;
pub mod pump;
