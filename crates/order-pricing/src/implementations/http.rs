//! HTTP pricing engine client.
//!
//! Sends the JSON encoded [`QuoteRequest`] to `{url}/quote` and decodes the
//! JSON [`Quote`] returned by the engine.

use crate::{PricingEngineInterface, PricingError, PricingFactory, PricingRegistry};
use async_trait::async_trait;
use order_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Quote, QuoteRequest, Schema,
	ValidationError,
};
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration schema for the HTTP pricing engine.
pub struct HttpPricingSchema;

impl ConfigSchema for HttpPricingSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("url", FieldType::String).with_validator(|value| {
				let url = value.as_str().unwrap_or_default();
				if url.starts_with("http://") || url.starts_with("https://") {
					Ok(())
				} else {
					Err("url must start with http:// or https://".to_string())
				}
			})],
			vec![Field::new(
				"timeout_ms",
				FieldType::Integer {
					min: Some(1),
					max: Some(300_000),
				},
			)],
		);
		schema.validate(config)
	}
}

/// Pricing engine reached over HTTP.
pub struct HttpPricingEngine {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpPricingEngine {
	pub fn new(url: &str, timeout: Duration) -> Result<Self, PricingError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.pool_idle_timeout(Duration::from_secs(90))
			.build()
			.map_err(|e| PricingError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			endpoint: format!("{}/quote", url.trim_end_matches('/')),
		})
	}
}

#[async_trait]
impl PricingEngineInterface for HttpPricingEngine {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpPricingSchema)
	}

	async fn quote(&self, request: &QuoteRequest) -> Result<Quote, PricingError> {
		let response = self
			.client
			.post(&self.endpoint)
			.json(request)
			.send()
			.await
			.map_err(|e| PricingError::Network(e.to_string()))?;

		let status = response.status();
		if status == reqwest::StatusCode::NOT_FOUND {
			return Err(PricingError::PairNotSupported(request.pair_address.clone()));
		}
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(PricingError::Network(format!(
				"Pricing engine returned {}: {}",
				status, body
			)));
		}

		response
			.json::<Quote>()
			.await
			.map_err(|e| PricingError::Internal(format!("Invalid quote response: {}", e)))
	}
}

/// Registry for the HTTP pricing engine implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = PricingFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn PricingEngineInterface>, PricingError> {
			let url = config
				.get("url")
				.and_then(|v| v.as_str())
				.ok_or_else(|| PricingError::Configuration("url is required".to_string()))?;
			let timeout_ms = config
				.get("timeout_ms")
				.and_then(|v| v.as_integer())
				.map(|ms| ms.max(1) as u64)
				.unwrap_or(DEFAULT_TIMEOUT_MS);

			Ok(Box::new(HttpPricingEngine::new(
				url,
				Duration::from_millis(timeout_ms),
			)?))
		}
	}
}

impl PricingRegistry for Registry {}
