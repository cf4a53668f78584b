//! Shared access to the order input state.

use super::OrderInputState;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to the order input state.
///
/// Every update runs to completion under the write lock, so mutations never
/// interleave. The lock is never held across a call to an external collaborator.
#[derive(Clone)]
pub struct OrderInputStore {
	state: Arc<RwLock<OrderInputState>>,
}

impl OrderInputStore {
	pub fn new(state: OrderInputState) -> Self {
		Self {
			state: Arc::new(RwLock::new(state)),
		}
	}

	/// Returns a copy of the current state.
	pub async fn snapshot(&self) -> OrderInputState {
		self.state.read().await.clone()
	}

	/// Reads the state through a closure.
	pub async fn read_with<F, R>(&self, reader: F) -> R
	where
		F: FnOnce(&OrderInputState) -> R,
	{
		let state = self.state.read().await;
		reader(&state)
	}

	/// Applies an update with a closure and returns its result.
	pub async fn update_with<F, R>(&self, updater: F) -> R
	where
		F: FnOnce(&mut OrderInputState) -> R,
	{
		let mut state = self.state.write().await;
		updater(&mut state)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use order_types::OrderSide;

	#[tokio::test]
	async fn test_updates_are_visible_to_clones() {
		let store = OrderInputStore::new(OrderInputState::default());
		let other = store.clone();

		let side = store
			.update_with(|state| {
				state.set_side(OrderSide::Sell);
				state.side
			})
			.await;
		assert_eq!(side, OrderSide::Sell);
		assert_eq!(other.read_with(|state| state.side).await, OrderSide::Sell);
		assert_eq!(other.snapshot().await.side, OrderSide::Sell);
	}
}
