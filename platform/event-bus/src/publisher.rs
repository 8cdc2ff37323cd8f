//! Producer-side event publishing
//!
//! Turns a domain payload into a published, serialized message: build the
//! envelope, encode it with its type tag, hand the bytes to the transport.

use crate::{encode_tagged, BusError, EventBus, EventEnvelope, EventKind};
use serde::Serialize;
use std::sync::Arc;

/// Errors surfaced to the caller of [`EventPublisher::publish`]
///
/// Neither variant is retried internally; retry, if desired, is a policy
/// layered by the caller.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to serialize event envelope: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("transport rejected publish: {0}")]
    Transport(#[from] BusError),
}

/// Publishes typed events to a single topic on an injected bus handle
///
/// # Example
/// ```rust
/// use event_bus::{EventKind, EventPublisher, InMemoryBus};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let publisher = EventPublisher::new(Arc::new(InMemoryBus::new()), "customers");
/// let envelope = publisher
///     .publish(
///         "customers.CustomerCreatedEvent",
///         EventKind::Created,
///         None,
///         serde_json::json!({ "name": "Ana" }),
///     )
///     .await?;
/// tracing::info!(event_id = %envelope.id, "published");
/// # Ok(())
/// # }
/// ```
pub struct EventPublisher {
    bus: Arc<dyn EventBus>,
    topic: String,
}

impl EventPublisher {
    /// Create a publisher bound to one topic
    pub fn new(bus: Arc<dyn EventBus>, topic: impl Into<String>) -> Self {
        Self {
            bus,
            topic: topic.into(),
        }
    }

    /// The topic this publisher sends to
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wrap a payload in an envelope and publish it
    ///
    /// Builds the envelope (fresh id, `occurred_at = now`, the given kind),
    /// serializes it with `type_tag` as outer metadata, and hands the bytes
    /// to the transport. The call completes once the transport accepted the
    /// send; acceptance does not guarantee broker durability.
    ///
    /// `key` is the application-chosen ordering key; `None` means no
    /// cross-message ordering is required for this payload.
    ///
    /// Returns the envelope that was published, so callers can log the
    /// assigned event id.
    ///
    /// # Errors
    ///
    /// [`PublishError::Serialization`] if the payload cannot be encoded,
    /// [`PublishError::Transport`] if the bus rejected the send.
    pub async fn publish<T: Serialize>(
        &self,
        type_tag: &str,
        kind: EventKind,
        key: Option<&str>,
        payload: T,
    ) -> Result<EventEnvelope<T>, PublishError> {
        let envelope = EventEnvelope::new(kind, payload);
        let bytes = encode_tagged(type_tag, &envelope)?;

        self.bus.publish(&self.topic, key, bytes).await?;

        tracing::debug!(
            event_id = %envelope.id,
            kind = %envelope.kind,
            type_tag = %type_tag,
            topic = %self.topic,
            "Published event"
        );

        Ok(envelope)
    }
}
