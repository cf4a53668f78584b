//! Order submission workflow.
//!
//! Builds the transaction request from the current order, hands it to the
//! wallet signer and records the outcome. Balance and account history refreshes
//! are requested after every submission that got past its preconditions,
//! whether the signer approved, rejected or failed.

use crate::engine::event_bus::EventBus;
use crate::state::OrderInputStore;
use crate::OrderInputError;
use order_config::ExchangeConfig;
use order_signer::SignerService;
use order_types::{
	truncate_id, OrderTab, RefreshEvent, SessionEvent, TradingContext, TransactionEvent,
	TransactionOutcome, TransactionRequest, NOT_APPLICABLE,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

/// Handler for the order submission workflow.
pub struct SubmissionHandler {
	signer: Option<Arc<SignerService>>,
	store: OrderInputStore,
	exchange: ExchangeConfig,
	event_bus: EventBus,
}

impl SubmissionHandler {
	pub fn new(
		signer: Option<Arc<SignerService>>,
		store: OrderInputStore,
		exchange: ExchangeConfig,
		event_bus: EventBus,
	) -> Self {
		Self {
			signer,
			store,
			exchange,
			event_bus,
		}
	}

	/// Submits the current order through the wallet signer.
	///
	/// Precondition failures leave the state untouched. Once the order is
	/// handed over, `transaction_in_progress` stays set until the signer
	/// answers; signer errors become an unsuccessful outcome.
	#[instrument(skip_all, fields(pair = %truncate_id(&context.pair.address)))]
	pub async fn submit_order(
		&self,
		context: &TradingContext,
	) -> Result<TransactionOutcome, OrderInputError> {
		let (signer, account) = match (&self.signer, &context.account) {
			(Some(signer), Some(account)) => (signer, account),
			_ => {
				return Err(OrderInputError::Precondition(
					"Wallet signer is not initialized yet.".into(),
				))
			},
		};

		let request = self
			.store
			.update_with(|state| {
				if state.transaction_in_progress {
					return Err(OrderInputError::Precondition(
						"A transaction is already in progress.".into(),
					));
				}
				let target = state.target_leg();
				let amount = target
					.amount
					.filter(|amount| *amount > Decimal::ZERO)
					.ok_or_else(|| {
						OrderInputError::Precondition(
							"No amount specified when creating transaction.".into(),
						)
					})?;

				let request = TransactionRequest {
					pair_address: context.pair.address.clone(),
					order_type: state.order_type(),
					side: state.side,
					token_address: target.address.clone(),
					amount,
					price: match state.tab {
						OrderTab::Limit => state.price,
						OrderTab::Market => NOT_APPLICABLE,
					},
					slippage: match state.tab {
						OrderTab::Market => state.slippage,
						OrderTab::Limit => NOT_APPLICABLE,
					},
					platform_badge_id: self.exchange.platform_badge_id,
					requester: account.clone(),
					beneficiary: account.clone(),
				};
				state.begin_transaction();
				Ok(request)
			})
			.await?;

		tracing::info!(
			side = %request.side,
			order_type = %request.order_type,
			amount = %request.amount,
			"Submitting order"
		);
		self.event_bus
			.publish(SessionEvent::Transaction(TransactionEvent::Started {
				pair_address: request.pair_address.clone(),
				order_type: request.order_type,
				side: request.side,
			}))
			.ok();

		let outcome = match signer.sign_and_submit(&request).await {
			Ok(outcome) => outcome,
			Err(e) => {
				tracing::warn!(error = %e, "Order submission failed");
				TransactionOutcome::failure(e.to_string())
			},
		};

		self.store
			.update_with(|state| state.finish_transaction(outcome.message.clone()))
			.await;
		tracing::info!(
			success = outcome.success,
			transaction_id = outcome.transaction_id.as_deref().unwrap_or("-"),
			"Order submission finished"
		);

		self.event_bus
			.publish(SessionEvent::Transaction(TransactionEvent::Finished {
				success: outcome.success,
				message: outcome.message.clone(),
			}))
			.ok();
		for refresh in [
			RefreshEvent::Balances {
				account: account.clone(),
			},
			RefreshEvent::AccountHistory {
				account: account.clone(),
			},
		] {
			self.event_bus.publish(SessionEvent::Refresh(refresh)).ok();
		}

		Ok(outcome)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::state::OrderInputState;
	use async_trait::async_trait;
	use order_signer::{MockSignerInterface, SignerError, SignerInterface};
	use order_types::{
		ConfigSchema, LegId, OrderSide, OrderType, PairInfo, TokenInfo, TransactionManifest,
	};
	use std::str::FromStr;
	use std::sync::Mutex;
	use tokio::sync::{broadcast, mpsc, oneshot};

	const ACCOUNT: &str = "account_tdx_alice";

	fn dec(s: &str) -> Decimal {
		Decimal::from_str(s).unwrap()
	}

	fn token(address: &str, symbol: &str) -> TokenInfo {
		TokenInfo {
			address: address.to_string(),
			symbol: symbol.to_string(),
			icon_url: String::new(),
		}
	}

	fn context() -> TradingContext {
		TradingContext::new(PairInfo {
			address: "component_xrd_usdc".to_string(),
			token1: token("resource_xrd", "XRD"),
			token2: token("resource_usdc", "USDC"),
			price_max_decimals: 4,
			amount_max_decimals: 8,
		})
		.with_account(ACCOUNT)
	}

	fn committed(id: &str) -> TransactionOutcome {
		TransactionOutcome {
			success: true,
			message: format!("Transaction {} committed", id),
			transaction_id: Some(id.to_string()),
		}
	}

	fn setup(
		signer: Option<Box<dyn SignerInterface>>,
	) -> (SubmissionHandler, OrderInputStore, EventBus) {
		let ctx = context();
		let mut state = OrderInputState::default();
		state.set_pair(&ctx);
		state.set_amount(LegId::Leg2, Some(dec("10")), &ctx);
		let store = OrderInputStore::new(state);
		let event_bus = EventBus::new(16);
		let handler = SubmissionHandler::new(
			signer.map(|signer| Arc::new(SignerService::new(signer))),
			store.clone(),
			ExchangeConfig::default(),
			event_bus.clone(),
		);
		(handler, store, event_bus)
	}

	fn drain(receiver: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
		let mut events = Vec::new();
		while let Ok(event) = receiver.try_recv() {
			events.push(event);
		}
		events
	}

	fn refresh_count(events: &[SessionEvent]) -> (usize, usize) {
		let balances = events
			.iter()
			.filter(|e| matches!(e, SessionEvent::Refresh(RefreshEvent::Balances { account }) if account == ACCOUNT))
			.count();
		let history = events
			.iter()
			.filter(|e| matches!(e, SessionEvent::Refresh(RefreshEvent::AccountHistory { account }) if account == ACCOUNT))
			.count();
		(balances, history)
	}

	fn manifest() -> TransactionManifest {
		TransactionManifest {
			body: "CALL_METHOD".to_string(),
		}
	}

	/// Signer whose wallet approval only completes when the gate is opened.
	struct GatedSigner {
		started: mpsc::UnboundedSender<()>,
		gate: Mutex<Option<oneshot::Receiver<TransactionOutcome>>>,
	}

	#[async_trait]
	impl SignerInterface for GatedSigner {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			unimplemented!()
		}

		async fn account_address(&self) -> Result<String, SignerError> {
			Ok(ACCOUNT.to_string())
		}

		async fn build_transaction(
			&self,
			_request: &TransactionRequest,
		) -> Result<TransactionManifest, SignerError> {
			Ok(manifest())
		}

		async fn submit(
			&self,
			_manifest: &TransactionManifest,
		) -> Result<TransactionOutcome, SignerError> {
			let gate = self.gate.lock().unwrap().take().unwrap();
			self.started.send(()).unwrap();
			Ok(gate.await.unwrap())
		}
	}

	#[tokio::test]
	async fn test_requires_signer_and_account() {
		let (handler, store, event_bus) = setup(None);
		let mut events = event_bus.subscribe();
		let before = store.snapshot().await;
		let err = handler.submit_order(&context()).await.unwrap_err();
		assert_eq!(
			err.to_string(),
			"Precondition failed: Wallet signer is not initialized yet."
		);

		let mut mock = MockSignerInterface::new();
		mock.expect_build_transaction().never();
		let (handler, _, _) = setup(Some(Box::new(mock)));
		let mut no_account = context();
		no_account.account = None;
		let err = handler.submit_order(&no_account).await.unwrap_err();
		assert!(matches!(err, OrderInputError::Precondition(_)));

		assert_eq!(store.snapshot().await, before);
		assert!(drain(&mut events).is_empty());
	}

	#[tokio::test]
	async fn test_requires_target_amount() {
		let mut mock = MockSignerInterface::new();
		mock.expect_build_transaction().never();
		let (handler, store, event_bus) = setup(Some(Box::new(mock)));
		let mut events = event_bus.subscribe();
		let ctx = context();
		// On SELL the target leg is leg1, which is empty
		store.update_with(|state| state.set_side(OrderSide::Sell)).await;
		let before = store.snapshot().await;

		let err = handler.submit_order(&ctx).await.unwrap_err();
		assert_eq!(
			err.to_string(),
			"Precondition failed: No amount specified when creating transaction."
		);
		assert_eq!(store.snapshot().await, before);
		assert!(drain(&mut events).is_empty());
	}

	#[tokio::test]
	async fn test_market_order_submission() {
		let mut mock = MockSignerInterface::new();
		mock.expect_build_transaction()
			.withf(|request| {
				request.order_type == OrderType::Market
					&& request.side == OrderSide::Buy
					&& request.token_address == "resource_usdc"
					&& request.amount == dec("10")
					&& request.price == NOT_APPLICABLE
					&& request.slippage == dec("0.01")
					&& request.platform_badge_id == 1
					&& request.requester == ACCOUNT
					&& request.beneficiary == ACCOUNT
			})
			.times(1)
			.returning(|_| Ok(manifest()));
		mock.expect_submit()
			.times(1)
			.returning(|_| Ok(committed("txid_1")));
		let (handler, store, event_bus) = setup(Some(Box::new(mock)));
		let mut events = event_bus.subscribe();

		let outcome = handler.submit_order(&context()).await.unwrap();
		assert_eq!(outcome, committed("txid_1"));

		let state = store.snapshot().await;
		assert!(!state.transaction_in_progress);
		assert_eq!(
			state.transaction_result.as_deref(),
			Some("Transaction txid_1 committed")
		);

		let events = drain(&mut events);
		assert_eq!(refresh_count(&events), (1, 1));
		assert_eq!(
			&events[..2],
			&[
				SessionEvent::Transaction(TransactionEvent::Started {
					pair_address: "component_xrd_usdc".to_string(),
					order_type: OrderType::Market,
					side: OrderSide::Buy,
				}),
				SessionEvent::Transaction(TransactionEvent::Finished {
					success: true,
					message: "Transaction txid_1 committed".to_string(),
				}),
			]
		);
	}

	#[tokio::test]
	async fn test_post_only_order_carries_price() {
		let mut mock = MockSignerInterface::new();
		mock.expect_build_transaction()
			.withf(|request| {
				request.order_type == OrderType::PostOnly
					&& request.side == OrderSide::Sell
					&& request.token_address == "resource_xrd"
					&& request.price == dec("0.05")
					&& request.slippage == NOT_APPLICABLE
			})
			.times(1)
			.returning(|_| Ok(manifest()));
		mock.expect_submit()
			.times(1)
			.returning(|_| Ok(TransactionOutcome::failure("Transaction rejected by user")));
		let (handler, store, event_bus) = setup(Some(Box::new(mock)));
		let mut events = event_bus.subscribe();
		let ctx = context();
		store
			.update_with(|state| {
				state.set_active_tab(OrderTab::Limit);
				state.toggle_prevent_immediate_execution();
				state.set_side(OrderSide::Sell);
				state.set_price(dec("0.05"));
				state.set_amount(LegId::Leg1, Some(dec("100")), &ctx);
			})
			.await;

		let outcome = handler.submit_order(&ctx).await.unwrap();
		assert!(!outcome.success);
		assert_eq!(
			store.snapshot().await.transaction_result.as_deref(),
			Some("Transaction rejected by user")
		);
		assert_eq!(refresh_count(&drain(&mut events)), (1, 1));
	}

	#[tokio::test]
	async fn test_signer_error_is_recorded() {
		let mut mock = MockSignerInterface::new();
		mock.expect_build_transaction()
			.times(1)
			.returning(|_| Ok(manifest()));
		mock.expect_submit()
			.times(1)
			.returning(|_| Err(SignerError::SubmissionFailed("wallet closed".into())));
		let (handler, store, event_bus) = setup(Some(Box::new(mock)));
		let mut events = event_bus.subscribe();

		let outcome = handler.submit_order(&context()).await.unwrap();
		assert!(!outcome.success);
		assert_eq!(outcome.message, "Failed to submit transaction: wallet closed");

		let state = store.snapshot().await;
		assert!(!state.transaction_in_progress);
		assert_eq!(
			state.transaction_result.as_deref(),
			Some("Failed to submit transaction: wallet closed")
		);
		assert_eq!(refresh_count(&drain(&mut events)), (1, 1));
	}

	#[tokio::test]
	async fn test_build_failure_is_recorded() {
		let mut mock = MockSignerInterface::new();
		mock.expect_build_transaction()
			.times(1)
			.returning(|_| Err(SignerError::BuildFailed("unknown resource".into())));
		mock.expect_submit().never();
		let (handler, store, event_bus) = setup(Some(Box::new(mock)));
		let mut events = event_bus.subscribe();

		let outcome = handler.submit_order(&context()).await.unwrap();
		assert!(!outcome.success);
		assert!(outcome.transaction_id.is_none());

		let state = store.snapshot().await;
		assert!(!state.transaction_in_progress);
		assert_eq!(
			state.transaction_result.as_deref(),
			Some("Failed to build transaction: unknown resource")
		);
		assert_eq!(refresh_count(&drain(&mut events)), (1, 1));
	}

	#[tokio::test]
	async fn test_in_progress_until_signer_answers() {
		let (gate, gate_rx) = oneshot::channel();
		let (started, mut started_rx) = mpsc::unbounded_channel();
		let signer = GatedSigner {
			started,
			gate: Mutex::new(Some(gate_rx)),
		};
		let (handler, store, _) = setup(Some(Box::new(signer)));
		let handler = Arc::new(handler);
		let ctx = context();

		let pending = tokio::spawn({
			let handler = handler.clone();
			let ctx = ctx.clone();
			async move { handler.submit_order(&ctx).await }
		});
		started_rx.recv().await.unwrap();

		let state = store.snapshot().await;
		assert!(state.transaction_in_progress);
		assert!(state.transaction_result.is_none());

		let err = handler.submit_order(&ctx).await.unwrap_err();
		assert_eq!(
			err.to_string(),
			"Precondition failed: A transaction is already in progress."
		);

		gate.send(committed("txid_2")).unwrap();
		assert!(pending.await.unwrap().unwrap().success);
		let state = store.snapshot().await;
		assert!(!state.transaction_in_progress);
		assert_eq!(
			state.transaction_result.as_deref(),
			Some("Transaction txid_2 committed")
		);
	}
}
