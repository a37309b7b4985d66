//! In-process cart change feed.
//!
//! Mutating cart handlers publish a [`CartEvent`] after every successful
//! write; consumers subscribe and filter on their user identity. The feed is
//! transport-agnostic — the SSE route is just one subscriber, and publishers
//! never know who is listening.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// A cart changed for a user; `count` is the cart size after the change.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartEvent {
    pub user_id: Uuid,
    pub count: i64,
}

/// Broadcast fan-out of [`CartEvent`]s to interested consumers.
#[derive(Debug, Clone)]
pub struct CartFeed {
    tx: broadcast::Sender<CartEvent>,
}

impl CartFeed {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event. A send error only means no subscriber is
    /// currently listening, which is not a failure.
    pub fn publish(&self, event: CartEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!(user_id = %event.user_id, "cart event dropped: no subscribers");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let feed = CartFeed::new(8);
        let mut rx = feed.subscribe();
        let user_id = Uuid::new_v4();

        feed.publish(CartEvent { user_id, count: 3 });

        let event = rx.recv().await.expect("event");
        assert_eq!(event.user_id, user_id);
        assert_eq!(event.count, 3);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let feed = CartFeed::new(8);
        feed.publish(CartEvent {
            user_id: Uuid::new_v4(),
            count: 1,
        });
    }

    #[tokio::test]
    async fn each_subscriber_sees_every_event() {
        let feed = CartFeed::new(8);
        let mut a = feed.subscribe();
        let mut b = feed.subscribe();
        let user_id = Uuid::new_v4();

        feed.publish(CartEvent { user_id, count: 1 });
        feed.publish(CartEvent { user_id, count: 2 });

        assert_eq!(a.recv().await.expect("a first").count, 1);
        assert_eq!(a.recv().await.expect("a second").count, 2);
        assert_eq!(b.recv().await.expect("b first").count, 1);
        assert_eq!(b.recv().await.expect("b second").count, 2);
    }
}
