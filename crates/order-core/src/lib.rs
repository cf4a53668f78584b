//! Order input engine for the trading client.
//!
//! This crate holds the state of the order being composed on the trading page
//! and the logic around it: the mutation handlers triggered by user input and
//! market updates, field validation, quote retrieval with out-of-order response
//! protection, and order submission through the wallet signer. It also provides
//! the builder that assembles an engine from configuration.

use thiserror::Error;

pub mod builder;
pub mod engine;
pub mod handlers;
pub mod state;
pub mod validation;

pub use builder::{BuilderError, OrderEngineBuilder, OrderEngineFactories};
pub use engine::{event_bus::EventBus, OrderEngine};
pub use handlers::QuoteOutcome;
pub use state::{OrderInputState, QuoteTicket};

/// Errors that can occur during order input workflows.
#[derive(Debug, Error)]
pub enum OrderInputError {
	/// A workflow was started while its preconditions did not hold.
	/// The order state is left untouched.
	#[error("Precondition failed: {0}")]
	Precondition(String),
	/// Error related to configuration issues.
	#[error("Configuration error: {0}")]
	Config(String),
	/// Error from one of the backing services.
	#[error("Service error: {0}")]
	Service(String),
}
