//! Local signer for development sessions.
//!
//! Renders orders as a textual transaction manifest and approves or rejects
//! every submission according to its configuration, without a real wallet.

use crate::{SignerError, SignerFactory, SignerInterface, SignerRegistry};
use async_trait::async_trait;
use order_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, TransactionManifest,
	TransactionOutcome, TransactionRequest, ValidationError,
};
use rust_decimal::Decimal;
use std::fmt::Write;

const DEFAULT_ACCOUNT: &str = "account_local_dev";

/// Configuration schema for the local signer.
pub struct LocalSignerSchema;

impl ConfigSchema for LocalSignerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("account", FieldType::String).with_validator(|value| {
					if value.as_str().is_some_and(|s| !s.trim().is_empty()) {
						Ok(())
					} else {
						Err("account cannot be empty".to_string())
					}
				}),
				Field::new("approve", FieldType::Boolean),
			],
		);
		schema.validate(config)
	}
}

/// Signer that approves or rejects transactions locally.
pub struct LocalSigner {
	account: String,
	approve: bool,
}

impl LocalSigner {
	pub fn new(account: impl Into<String>, approve: bool) -> Self {
		Self {
			account: account.into(),
			approve,
		}
	}
}

#[async_trait]
impl SignerInterface for LocalSigner {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalSignerSchema)
	}

	async fn account_address(&self) -> Result<String, SignerError> {
		Ok(self.account.clone())
	}

	async fn build_transaction(
		&self,
		request: &TransactionRequest,
	) -> Result<TransactionManifest, SignerError> {
		if request.amount <= Decimal::ZERO {
			return Err(SignerError::BuildFailed(
				"Order amount must be greater than 0".to_string(),
			));
		}
		if request.requester.is_empty() || request.beneficiary.is_empty() {
			return Err(SignerError::BuildFailed(
				"Requester and beneficiary are required".to_string(),
			));
		}

		let mut body = String::new();
		let lines = [
			format!(
				"CALL_METHOD Address(\"{}\") \"withdraw\" Address(\"{}\") Decimal(\"{}\");",
				request.requester, request.token_address, request.amount
			),
			format!(
				"TAKE_ALL_FROM_WORKTOP Address(\"{}\") Bucket(\"order\");",
				request.token_address
			),
			format!(
				"CALL_METHOD Address(\"{}\") \"new_order\" Bucket(\"order\") \"{}\" \"{}\" Decimal(\"{}\") Decimal(\"{}\") {}u32;",
				request.pair_address,
				request.order_type,
				request.side,
				request.price,
				request.slippage,
				request.platform_badge_id
			),
			format!(
				"CALL_METHOD Address(\"{}\") \"deposit_batch\" Expression(\"ENTIRE_WORKTOP\");",
				request.beneficiary
			),
		];
		for line in lines {
			writeln!(body, "{}", line)
				.map_err(|e| SignerError::BuildFailed(e.to_string()))?;
		}

		Ok(TransactionManifest { body })
	}

	async fn submit(
		&self,
		manifest: &TransactionManifest,
	) -> Result<TransactionOutcome, SignerError> {
		if manifest.body.trim().is_empty() {
			return Err(SignerError::SubmissionFailed(
				"Transaction manifest is empty".to_string(),
			));
		}
		if !self.approve {
			return Ok(TransactionOutcome::failure("Transaction rejected by user"));
		}

		let transaction_id = format!("txid_{}", uuid::Uuid::new_v4().simple());
		Ok(TransactionOutcome {
			success: true,
			message: format!("Transaction {} committed", transaction_id),
			transaction_id: Some(transaction_id),
		})
	}
}

/// Registry for the local signer implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = SignerFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn SignerInterface>, SignerError> {
			let account = config
				.get("account")
				.and_then(|v| v.as_str())
				.unwrap_or(DEFAULT_ACCOUNT);
			let approve = config
				.get("approve")
				.and_then(|v| v.as_bool())
				.unwrap_or(true);

			Ok(Box::new(LocalSigner::new(account, approve)))
		}
	}
}

impl SignerRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::SignerService;
	use order_types::{OrderSide, OrderType, NOT_APPLICABLE};

	fn request() -> TransactionRequest {
		TransactionRequest {
			pair_address: "component_pair".to_string(),
			order_type: OrderType::Market,
			side: OrderSide::Sell,
			token_address: "resource_xrd".to_string(),
			amount: Decimal::new(125, 1),
			price: NOT_APPLICABLE,
			slippage: Decimal::new(1, 2),
			platform_badge_id: 1,
			requester: "account_a".to_string(),
			beneficiary: "account_a".to_string(),
		}
	}

	#[tokio::test]
	async fn test_manifest_contains_order_fields() {
		let signer = LocalSigner::new("account_a", true);
		let manifest = signer.build_transaction(&request()).await.unwrap();
		assert!(manifest.body.contains("Decimal(\"12.5\")"));
		assert!(manifest.body.contains("\"MARKET\" \"SELL\" Decimal(\"-1\") Decimal(\"0.01\") 1u32"));
		assert_eq!(manifest.body.lines().count(), 4);
	}

	#[tokio::test]
	async fn test_build_rejects_non_positive_amount() {
		let mut req = request();
		req.amount = Decimal::ZERO;
		let signer = LocalSigner::new("account_a", true);
		assert!(matches!(
			signer.build_transaction(&req).await,
			Err(SignerError::BuildFailed(_))
		));
	}

	#[tokio::test]
	async fn test_approval_and_rejection() {
		let approved = SignerService::new(Box::new(LocalSigner::new("account_a", true)))
			.sign_and_submit(&request())
			.await
			.unwrap();
		assert!(approved.success);
		assert!(approved.transaction_id.is_some());
		assert!(approved.message.contains("committed"));

		let rejected = SignerService::new(Box::new(LocalSigner::new("account_a", false)))
			.sign_and_submit(&request())
			.await
			.unwrap();
		assert!(!rejected.success);
		assert_eq!(rejected.message, "Transaction rejected by user");
	}

	#[tokio::test]
	async fn test_factory_defaults() {
		let config = toml::Value::Table(toml::Table::new());
		assert!(LocalSignerSchema.validate(&config).is_ok());
		let signer = (Registry::factory())(&config).unwrap();
		assert_eq!(signer.account_address().await.unwrap(), DEFAULT_ACCOUNT);

		let config: toml::Value = toml::from_str("account = \" \"").unwrap();
		assert!(LocalSignerSchema.validate(&config).is_err());
	}
}
