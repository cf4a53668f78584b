//! Transaction types for the signer contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderSide, OrderType};

/// Sentinel sent for the price or slippage field when it does not apply to the order type.
pub const NOT_APPLICABLE: Decimal = Decimal::NEGATIVE_ONE;

/// Everything the signer needs to build an order transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
	pub pair_address: String,
	pub order_type: OrderType,
	pub side: OrderSide,
	/// Address of the target leg token.
	pub token_address: String,
	/// Amount entered on the target leg.
	pub amount: Decimal,
	/// Limit price, or [`NOT_APPLICABLE`] for market orders.
	pub price: Decimal,
	/// Slippage fraction, or [`NOT_APPLICABLE`] for limit orders.
	pub slippage: Decimal,
	/// Platform badge used for fee accounting.
	pub platform_badge_id: u32,
	/// Account paying for the order.
	pub requester: String,
	/// Account receiving the proceeds.
	pub beneficiary: String,
}

/// Signer-specific rendering of a transaction, ready for approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionManifest {
	/// Manifest body handed to the wallet.
	pub body: String,
}

/// Result reported by the signer once the user approved or rejected the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
	/// Whether the transaction was approved and committed.
	pub success: bool,
	/// Human-readable result message.
	pub message: String,
	/// Transaction identifier, when one was assigned.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub transaction_id: Option<String>,
}

impl TransactionOutcome {
	/// Builds a failed outcome from an error message.
	pub fn failure(message: impl Into<String>) -> Self {
		Self {
			success: false,
			message: message.into(),
			transaction_id: None,
		}
	}
}
