//! Builder for constructing order engines.
//!
//! Instantiates the configured pricing engine and signer through named factory
//! functions, validates each implementation table against the schema the
//! implementation declares, and wires the result into an [`OrderEngine`].

use crate::engine::{event_bus::EventBus, OrderEngine};
use order_config::Config;
use order_pricing::{PricingEngineInterface, PricingError, PricingService};
use order_signer::{SignerError, SignerInterface, SignerService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during order engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions available to the builder, keyed by implementation name.
pub struct OrderEngineFactories<PF, SF> {
	pub pricing_factories: HashMap<String, PF>,
	pub signer_factories: HashMap<String, SF>,
}

/// Builder for constructing an OrderEngine with pluggable implementations.
pub struct OrderEngineBuilder {
	config: Config,
}

impl OrderEngineBuilder {
	/// Creates a new OrderEngineBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the OrderEngine using the given factories.
	pub async fn build<PF, SF>(
		self,
		factories: OrderEngineFactories<PF, SF>,
	) -> Result<OrderEngine, BuilderError>
	where
		PF: Fn(&toml::Value) -> Result<Box<dyn PricingEngineInterface>, PricingError>,
		SF: Fn(&toml::Value) -> Result<Box<dyn SignerInterface>, SignerError>,
	{
		let mut pricing_impls: HashMap<String, Arc<dyn PricingEngineInterface>> = HashMap::new();
		for (name, config) in &self.config.pricing.implementations {
			let Some(factory) = factories.pricing_factories.get(name) else {
				tracing::warn!(component = "pricing", implementation = %name, "No factory registered");
				continue;
			};
			let implementation = factory(config)
				.map_err(|e| load_error("pricing", name, e.to_string()))?;
			implementation
				.config_schema()
				.validate(config)
				.map_err(|e| load_error("pricing", name, e.to_string()))?;

			let is_primary = &self.config.pricing.primary == name;
			tracing::info!(component = "pricing", implementation = %name, enabled = %is_primary, "Loaded");
			pricing_impls.insert(name.clone(), Arc::from(implementation));
		}

		let primary_pricing = self.config.pricing.primary.clone();
		if !pricing_impls.contains_key(&primary_pricing) {
			return Err(BuilderError::MissingComponent(format!(
				"Primary pricing '{}' failed to load or has no registered factory",
				primary_pricing
			)));
		}
		let pricing = Arc::new(
			PricingService::new(pricing_impls, primary_pricing)
				.map_err(|e| BuilderError::Config(e.to_string()))?,
		);

		let mut account = None;
		let signer = match &self.config.signer {
			None => {
				tracing::warn!(component = "signer", "No signer configured - orders cannot be submitted");
				None
			},
			Some(signer_config) => {
				let name = &signer_config.primary;
				let config = signer_config.implementations.get(name).ok_or_else(|| {
					BuilderError::Config(format!("Primary signer '{}' is not configured", name))
				})?;
				let factory = factories.signer_factories.get(name).ok_or_else(|| {
					BuilderError::MissingComponent(format!(
						"No factory registered for signer '{}'",
						name
					))
				})?;
				let implementation =
					factory(config).map_err(|e| load_error("signer", name, e.to_string()))?;
				implementation
					.config_schema()
					.validate(config)
					.map_err(|e| load_error("signer", name, e.to_string()))?;

				let service = SignerService::new(implementation);
				// Fetch the account address once during initialization
				let address = service
					.account_address()
					.await
					.map_err(|e| load_error("signer", name, e.to_string()))?;
				tracing::info!(
					component = "signer",
					implementation = %name,
					account = %order_types::truncate_id(&address),
					"Loaded"
				);
				account = Some(address);
				Some(Arc::new(service))
			},
		};

		let event_bus = EventBus::new(self.config.events.capacity);
		let engine = OrderEngine::new(self.config, pricing, signer, event_bus);
		Ok(match account {
			Some(account) => engine.with_account(account),
			None => engine,
		})
	}
}

fn load_error(component: &str, name: &str, error: String) -> BuilderError {
	tracing::error!(
		component = component,
		implementation = %name,
		error = %error,
		"Failed to create implementation"
	);
	BuilderError::Config(format!(
		"Failed to create {} implementation '{}': {}",
		component, name, error
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use order_config::test_config;

	fn factories() -> OrderEngineFactories<order_pricing::PricingFactory, order_signer::SignerFactory>
	{
		OrderEngineFactories {
			pricing_factories: order_pricing::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			signer_factories: order_signer::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	#[tokio::test]
	async fn test_build_from_config() {
		let engine = OrderEngineBuilder::new(test_config())
			.build(factories())
			.await
			.unwrap();
		assert_eq!(engine.account(), Some("account_local_dev"));
		assert_eq!(engine.config().session.id, "test-session");
		assert_eq!(engine.snapshot().await.slippage, engine.config().exchange.default_slippage);
	}

	#[tokio::test]
	async fn test_build_without_signer() {
		let mut config = test_config();
		config.signer = None;
		let engine = OrderEngineBuilder::new(config).build(factories()).await.unwrap();
		assert!(engine.account().is_none());
	}

	#[tokio::test]
	async fn test_invalid_implementation_table_rejected() {
		let mut config = test_config();
		config.pricing.implementations.insert(
			"mock".to_string(),
			toml::from_str("fail = \"yes\"").unwrap(),
		);
		let err = OrderEngineBuilder::new(config).build(factories()).await.err().unwrap();
		assert!(err.to_string().contains("pricing implementation 'mock'"), "got: {}", err);
	}

	#[tokio::test]
	async fn test_missing_primary_factory() {
		let mut factories = factories();
		factories.pricing_factories.clear();
		let err = OrderEngineBuilder::new(test_config()).build(factories).await.err().unwrap();
		assert!(matches!(err, BuilderError::MissingComponent(_)));
	}
}
