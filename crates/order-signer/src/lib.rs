//! Wallet signer module for the order input system.
//!
//! This module provides the contract used to turn an order into a wallet
//! transaction, hand it to the user for approval and report the outcome. The
//! wallet connection lifecycle itself is external: a configured signer is a
//! connected wallet session.

use async_trait::async_trait;
use order_types::{
	ConfigSchema, ImplementationRegistry, TransactionManifest, TransactionOutcome,
	TransactionRequest,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during signer operations.
#[derive(Debug, Error)]
pub enum SignerError {
	/// Error that occurs when no wallet session is available.
	#[error("Wallet not connected: {0}")]
	NotConnected(String),
	/// Error that occurs when a transaction cannot be built from the request.
	#[error("Failed to build transaction: {0}")]
	BuildFailed(String),
	/// Error that occurs when the wallet cannot submit the transaction.
	#[error("Failed to submit transaction: {0}")]
	SubmissionFailed(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for wallet signer implementations.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait SignerInterface: Send + Sync {
	/// Returns the configuration schema for this signer implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Address of the account connected through this signer.
	async fn account_address(&self) -> Result<String, SignerError>;

	/// Builds a wallet transaction for the given order.
	async fn build_transaction(
		&self,
		request: &TransactionRequest,
	) -> Result<TransactionManifest, SignerError>;

	/// Hands a transaction to the wallet for approval and broadcast.
	///
	/// A rejected transaction is a successful call returning an unsuccessful
	/// outcome; errors are reserved for failures of the wallet itself.
	async fn submit(&self, manifest: &TransactionManifest)
		-> Result<TransactionOutcome, SignerError>;
}

/// Type alias for signer factory functions.
pub type SignerFactory = fn(&toml::Value) -> Result<Box<dyn SignerInterface>, SignerError>;

/// Registry trait for signer implementations.
pub trait SignerRegistry: ImplementationRegistry<Factory = SignerFactory> {}

/// Get all registered signer implementations.
pub fn get_all_implementations() -> Vec<(&'static str, SignerFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Service wrapping the wallet signer of the session.
pub struct SignerService {
	implementation: Box<dyn SignerInterface>,
}

impl SignerService {
	pub fn new(implementation: Box<dyn SignerInterface>) -> Self {
		Self { implementation }
	}

	/// Address of the connected account.
	pub async fn account_address(&self) -> Result<String, SignerError> {
		self.implementation.account_address().await
	}

	/// Builds the transaction and submits it for approval.
	pub async fn sign_and_submit(
		&self,
		request: &TransactionRequest,
	) -> Result<TransactionOutcome, SignerError> {
		let manifest = self.implementation.build_transaction(request).await?;
		tracing::debug!(
			lines = manifest.body.lines().count(),
			"Transaction manifest built"
		);
		self.implementation.submit(&manifest).await
	}
}
