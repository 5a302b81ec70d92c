use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::models::OrderStatus;

/// Default buffer size for the domain event channel.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Domain events emitted after successful writes. Delivery is best-effort:
/// a full or closed channel is logged by the emitter and never fails the
/// write that produced the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    IngredientSaved(Uuid),
    IngredientDeleted(Uuid),
    IngredientUnitSaved(Uuid),
    IngredientUnitDeleted(Uuid),
    RecipeSaved(Uuid),
    RecipeDeleted(Uuid),
    MealSaved(Uuid),
    MealDeleted(Uuid),
    MenuWeekActivated(Uuid),
    MenuWeekArchived(Uuid),
    OrderCreated(Uuid),
    OrderItemSaved {
        order_id: Uuid,
        order_item_id: Uuid,
    },
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
}

/// Cloneable sending half of the domain event channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates the domain event channel.
pub fn channel() -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
    (EventSender::new(tx), rx)
}

/// Drains the receiving half, logging each event. The default consumer when
/// the embedding application has no interest of its own.
pub fn spawn_event_logger(mut receiver: mpsc::Receiver<Event>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            debug!(?event, "domain event");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_and_receive() {
        let (sender, mut receiver) = channel();
        let id = Uuid::new_v4();
        sender.send(Event::OrderCreated(id)).await.unwrap();

        match receiver.recv().await {
            Some(Event::OrderCreated(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (sender, receiver) = channel();
        drop(receiver);
        assert!(sender.send(Event::RecipeDeleted(Uuid::new_v4())).await.is_err());
    }
}
