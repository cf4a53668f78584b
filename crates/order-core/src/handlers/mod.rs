//! Asynchronous workflows of the order engine.
//!
//! This module contains the handler for quote retrieval and the handler for
//! order submission. Both suspend only at their call to the external
//! collaborator and update the shared state before and after it.

pub mod quote;
pub mod submission;

pub use quote::{QuoteHandler, QuoteOutcome};
pub use submission::SubmissionHandler;
