use std::sync::Arc;

use async_trait::async_trait;
use supply_shared::DomainEvent;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bus::EventBus;

/// Anything that wants to see engine events (UI bridge, notifier, log sink)
#[async_trait]
pub trait EventObserver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_event(&self, event: &DomainEvent);
}

/// Forward every bus event to `observer` until `shutdown` fires or the bus closes
pub fn spawn_observer(
    bus: &EventBus,
    observer: Arc<dyn EventObserver>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(event) => observer.on_event(&event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(observer = observer.name(), skipped, "Observer lagged behind the event bus");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        tracing::info!(observer = observer.name(), "Observer stopped");
    })
}

/// Writes each event to the tracing log
pub struct EventLogObserver;

#[async_trait]
impl EventObserver for EventLogObserver {
    fn name(&self) -> &'static str {
        "event_log"
    }

    async fn on_event(&self, event: &DomainEvent) {
        match event.payload() {
            Ok(payload) => tracing::info!(event = event.name(), %payload, "Supply chain event"),
            Err(e) => tracing::error!(event = event.name(), "Failed to serialize event payload: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use supply_shared::models::events::ResponseActionsGeneratedEvent;
    use uuid::Uuid;

    struct Counting(AtomicUsize);

    #[async_trait]
    impl EventObserver for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn on_event(&self, _event: &DomainEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_observer_receives_events() {
        let bus = EventBus::new(16);
        let observer = Arc::new(Counting(AtomicUsize::new(0)));
        let shutdown = CancellationToken::new();
        let handle = spawn_observer(&bus, observer.clone(), shutdown.clone());

        for _ in 0..3 {
            bus.publish(DomainEvent::ResponseActionsGenerated(ResponseActionsGeneratedEvent {
                event_id: Uuid::new_v4(),
                actions: vec![],
            }));
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(observer.0.load(Ordering::SeqCst), 3);
    }
}
