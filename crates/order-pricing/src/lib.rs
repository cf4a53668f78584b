//! Pricing engine module for the order input system.
//!
//! This module provides the contract used to obtain priced previews (quotes) of
//! an order before it is submitted. The engine's matching logic is external;
//! implementations only translate a [`QuoteRequest`] into a [`Quote`].

use async_trait::async_trait;
use order_types::{ConfigSchema, ImplementationRegistry, Quote, QuoteRequest};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod mock;
}

/// Errors that can occur during quote retrieval.
#[derive(Debug, Error)]
pub enum PricingError {
	/// Error that occurs while talking to the pricing engine.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when the engine does not know the requested pair.
	#[error("Pair not supported: {0}")]
	PairNotSupported(String),
	/// Internal error of the pricing engine.
	#[error("Internal error: {0}")]
	Internal(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for pricing engine implementations.
///
/// This trait must be implemented by any pricing engine that wants to
/// integrate with the order input system.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait PricingEngineInterface: Send + Sync {
	/// Returns the configuration schema for this pricing engine implementation.
	///
	/// The schema is used to validate the TOML table of the implementation
	/// before the engine is wired into an order engine.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Requests a priced preview of an order.
	///
	/// A response is returned for every accepted request, including partial
	/// fills; liquidity shortfalls are reported inside the [`Quote`].
	async fn quote(&self, request: &QuoteRequest) -> Result<Quote, PricingError>;
}

/// Type alias for pricing engine factory functions.
pub type PricingFactory =
	fn(&toml::Value) -> Result<Box<dyn PricingEngineInterface>, PricingError>;

/// Registry trait for pricing engine implementations.
pub trait PricingRegistry: ImplementationRegistry<Factory = PricingFactory> {}

/// Get all registered pricing engine implementations.
///
/// Returns a vector of (name, factory) tuples used by the engine builder.
pub fn get_all_implementations() -> Vec<(&'static str, PricingFactory)> {
	use implementations::{http, mock};

	vec![
		(mock::Registry::NAME, mock::Registry::factory()),
		(http::Registry::NAME, http::Registry::factory()),
	]
}

/// Service that routes quote requests to the primary pricing engine.
pub struct PricingService {
	/// Map of implementation names to their interfaces.
	implementations: HashMap<String, Arc<dyn PricingEngineInterface>>,
	/// The implementation quote requests are sent to.
	primary_implementation: String,
}

impl PricingService {
	/// Creates a new PricingService with the given implementations.
	pub fn new(
		implementations: HashMap<String, Arc<dyn PricingEngineInterface>>,
		primary_implementation: String,
	) -> Result<Self, PricingError> {
		if !implementations.contains_key(&primary_implementation) {
			return Err(PricingError::Configuration(format!(
				"Primary implementation '{}' not found in available implementations",
				primary_implementation
			)));
		}

		Ok(Self {
			implementations,
			primary_implementation,
		})
	}

	/// Creates a service backed by a single engine.
	pub fn single(name: impl Into<String>, engine: Arc<dyn PricingEngineInterface>) -> Self {
		let name = name.into();
		Self {
			implementations: HashMap::from([(name.clone(), engine)]),
			primary_implementation: name,
		}
	}

	/// Name of the implementation quote requests are sent to.
	pub fn primary(&self) -> &str {
		&self.primary_implementation
	}

	/// Requests a quote from the primary implementation.
	pub async fn quote(&self, request: &QuoteRequest) -> Result<Quote, PricingError> {
		let implementation = self
			.implementations
			.get(&self.primary_implementation)
			.ok_or_else(|| {
				PricingError::Internal(format!(
					"Primary implementation '{}' not available",
					self.primary_implementation
				))
			})?;

		tracing::debug!(
			implementation = %self.primary_implementation,
			pair = %order_types::truncate_id(&request.pair_address),
			side = %request.side,
			order_type = %request.order_type,
			"Requesting quote"
		);
		implementation.quote(request).await
	}
}
