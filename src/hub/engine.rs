//! Broadcast hub
//!
//! The hub is the only entry point the rest of the system uses: the transport
//! calls `connect`/`disconnect`, the comment service calls `publish` after a
//! write has been committed.
//!
//! Publishing is best-effort. The event is serialized once, every subscriber
//! in the topic snapshot is sent to concurrently, and any subscriber whose
//! send fails (closed, timed out, transport error) is removed from the
//! registry and marked removed so its transport tears the socket down. Nothing
//! is retried or kept for late subscribers, and `publish` never reports an
//! error to its caller.

use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::config::HubSettings;
use crate::connection::{Connection, Liveness, WeakConnection};
use crate::hub::TopicId;
use crate::hub::event::CommentEvent;
use crate::hub::registry::TopicRegistry;
use crate::utils::{HubError, SendError};

/// Outcome of one `publish` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub attempted: usize,
    pub delivered: usize,
    pub dropped: usize,
}

#[derive(Debug)]
pub struct Hub {
    registry: TopicRegistry,
    send_timeout: Duration,
}

impl Hub {
    pub fn new(settings: &HubSettings) -> Self {
        Self::with_registry(TopicRegistry::new(), settings.send_timeout())
    }

    pub fn with_registry(registry: TopicRegistry, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
        }
    }

    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Register `connection` under `topic`. Registering the same connection
    /// twice is a no-op.
    pub fn connect(&self, topic: TopicId, connection: &Connection) -> Result<(), HubError> {
        if connection.topic() != topic {
            return Err(HubError::TopicMismatch {
                expected: topic,
                actual: connection.topic(),
            });
        }
        if connection.liveness() == Liveness::Removed {
            return Err(HubError::ConnectionRemoved(connection.id()));
        }

        let added = self.registry.add(topic, connection.downgrade());

        // Lost a race with a concurrent teardown: undo our own insertion.
        if connection.liveness() == Liveness::Removed {
            self.registry.remove(topic, &connection.id());
            return Err(HubError::ConnectionRemoved(connection.id()));
        }

        if added {
            info!(
                topic,
                connection = %connection.id(),
                subscribers = self.registry.connection_count(topic),
                "connection registered"
            );
        }
        Ok(())
    }

    /// Unregister `connection`. Safe to call after the hub already dropped it.
    pub fn disconnect(&self, topic: TopicId, connection: &Connection) {
        let removed = self.registry.remove(topic, &connection.id());
        connection.mark_removed();
        if removed {
            info!(topic, connection = %connection.id(), "connection unregistered");
        }
    }

    /// Fan `event` out to every connection subscribed to `topic`.
    pub async fn publish(&self, topic: TopicId, event: &CommentEvent) -> Delivery {
        let subscribers = self.registry.snapshot(topic);
        if subscribers.is_empty() {
            debug!(topic, kind = event.kind(), "no subscribers, event dropped");
            return Delivery::default();
        }

        let frame = match serde_json::to_string(event) {
            Ok(json) => WsMessage::text(json),
            Err(e) => {
                error!(topic, error = %e, "failed to serialize event");
                return Delivery::default();
            }
        };

        let timeout = self.send_timeout;
        let results = join_all(subscribers.iter().map(|subscriber| {
            let frame = frame.clone();
            async move { deliver(subscriber, frame, timeout).await }
        }))
        .await;

        let mut delivery = Delivery {
            attempted: subscribers.len(),
            ..Delivery::default()
        };

        for (subscriber, result) in subscribers.iter().zip(results) {
            match result {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    warn!(
                        topic,
                        connection = %subscriber.id(),
                        error = %e,
                        "dropping subscriber after failed send"
                    );
                    self.registry.remove(topic, &subscriber.id());
                    subscriber.mark_removed();
                    delivery.dropped += 1;
                }
            }
        }

        debug!(
            topic,
            kind = event.kind(),
            delivered = delivery.delivered,
            dropped = delivery.dropped,
            "event published"
        );
        delivery
    }
}

async fn deliver(
    subscriber: &WeakConnection,
    frame: WsMessage,
    timeout: Duration,
) -> Result<(), SendError> {
    let connection = subscriber.upgrade().ok_or(SendError::Closed)?;
    connection.send(frame, timeout).await
}
