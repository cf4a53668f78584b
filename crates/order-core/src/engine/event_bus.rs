//! Event bus for session events.
//!
//! Publishing never blocks and never fails the publisher's operation: callers
//! drop the result when nobody is subscribed.

use order_types::SessionEvent;
use tokio::sync::broadcast;

/// Broadcast channel carrying [`SessionEvent`]s to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
	/// Creates a bus that buffers up to `capacity` events per slow subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity.max(1));
		Self { sender }
	}

	/// Subscribes to all events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all current subscribers.
	///
	/// Fails only when there are no subscribers.
	pub fn publish(
		&self,
		event: SessionEvent,
	) -> Result<(), broadcast::error::SendError<SessionEvent>> {
		self.sender.send(event)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use order_types::RefreshEvent;

	#[tokio::test]
	async fn test_publish_reaches_subscribers() {
		let bus = EventBus::new(8);
		let event = SessionEvent::Refresh(RefreshEvent::Balances {
			account: "account_a".to_string(),
		});
		assert!(bus.publish(event.clone()).is_err());

		let mut receiver = bus.subscribe();
		bus.publish(event.clone()).unwrap();
		assert_eq!(receiver.recv().await.unwrap(), event);
	}
}
