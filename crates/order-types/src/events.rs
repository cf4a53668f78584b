//! Event types published by the order engine.
//!
//! Events flow through the engine's event bus. Refresh events are the
//! fire-and-forget triggers consumed by the balance and account history
//! subsystems; the other categories let observers follow both workflows.

use serde::{Deserialize, Serialize};

use crate::{OrderSide, OrderType, Quote};

/// Main event type encompassing all session events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
	/// Events from the quote retrieval workflow.
	Quote(QuoteEvent),
	/// Events from the order submission workflow.
	Transaction(TransactionEvent),
	/// Downstream refresh requests.
	Refresh(RefreshEvent),
}

/// Events related to quote retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuoteEvent {
	/// A quote was received and written into the order state.
	Applied { generation: u64, quote: Quote },
	/// The pricing engine failed; the target leg was marked invalid.
	Failed { generation: u64, error: String },
	/// A response arrived after a newer request was issued and was dropped.
	Discarded { generation: u64 },
}

/// Events related to order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionEvent {
	/// A transaction was handed to the signer.
	Started {
		pair_address: String,
		order_type: OrderType,
		side: OrderSide,
	},
	/// The submission completed, successfully or not.
	Finished { success: bool, message: String },
}

/// Refresh requests for independent subsystems. Nothing awaits their completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshEvent {
	/// Reload the wallet balances of the pair tokens.
	Balances { account: String },
	/// Reload the order history of the account.
	AccountHistory { account: String },
}
