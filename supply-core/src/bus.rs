use std::collections::HashMap;
use std::sync::Arc;

use supply_shared::{DomainEvent, EventKind};
use tokio::sync::broadcast;

/// Typed publish/subscribe hub, one broadcast topic per event name plus a firehose.
///
/// Publishing never blocks; with no subscribers the event is simply dropped.
#[derive(Clone)]
pub struct EventBus {
    all: broadcast::Sender<DomainEvent>,
    topics: Arc<HashMap<EventKind, broadcast::Sender<DomainEvent>>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (all, _) = broadcast::channel(capacity);
        let topics = EventKind::ALL
            .iter()
            .map(|kind| (*kind, broadcast::channel(capacity).0))
            .collect();
        Self {
            all,
            topics: Arc::new(topics),
        }
    }

    /// Returns how many receivers saw the event
    pub fn publish(&self, event: DomainEvent) -> usize {
        let kind = event.kind();
        tracing::debug!(event = %kind, "Publishing domain event");
        let mut delivered = 0;
        if let Some(topic) = self.topics.get(&kind) {
            delivered += topic.send(event.clone()).unwrap_or(0);
        }
        delivered + self.all.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.all.subscribe()
    }

    pub fn subscribe_topic(&self, kind: EventKind) -> broadcast::Receiver<DomainEvent> {
        match self.topics.get(&kind) {
            Some(topic) => topic.subscribe(),
            // Every kind is registered in `new`
            None => self.all.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supply_shared::models::events::ResponseActionsGeneratedEvent;
    use uuid::Uuid;

    fn sample() -> DomainEvent {
        DomainEvent::ResponseActionsGenerated(ResponseActionsGeneratedEvent {
            event_id: Uuid::new_v4(),
            actions: vec![],
        })
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(8);
        assert_eq!(bus.publish(sample()), 0);
    }

    #[tokio::test]
    async fn test_topic_subscription_is_filtered() {
        let bus = EventBus::new(8);
        let mut actions = bus.subscribe_topic(EventKind::ResponseActionsGenerated);
        let mut suppliers = bus.subscribe_topic(EventKind::SupplierAdded);
        let mut firehose = bus.subscribe();

        assert_eq!(bus.publish(sample()), 2);

        assert_eq!(actions.recv().await.unwrap().kind(), EventKind::ResponseActionsGenerated);
        assert_eq!(firehose.recv().await.unwrap().kind(), EventKind::ResponseActionsGenerated);
        assert!(suppliers.try_recv().is_err());
    }
}
