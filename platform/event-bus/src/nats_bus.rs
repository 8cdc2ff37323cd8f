//! NATS-based implementation of the EventBus trait

use crate::{BusError, BusMessage, BusResult, EventBus};
use async_nats::Client;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};

/// Header carrying the application-chosen ordering key of a message.
const EVENT_KEY_HEADER: &str = "Event-Key";

/// EventBus implementation using NATS
///
/// This is the production implementation. It wraps an already-connected
/// `async_nats::Client`; consumer groups map onto NATS queue groups, and the
/// optional per-message key rides in the `Event-Key` header so that subject
/// based subscription patterns are unaffected by keying.
///
/// # Example
/// ```rust,no_run
/// use event_bus::{EventBus, NatsBus};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let nats_client = async_nats::connect("nats://localhost:4222").await?;
/// let bus = NatsBus::new(nats_client);
///
/// bus.publish("customers", Some("c-1"), b"hello".to_vec()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NatsBus {
    client: Client,
}

impl NatsBus {
    /// Create a new NatsBus from an existing NATS client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying NATS client
    ///
    /// Useful for advanced use cases that need NATS features not exposed
    /// through the EventBus trait.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn convert_message(nats_msg: async_nats::Message) -> BusMessage {
        let mut msg = BusMessage::new(nats_msg.subject.to_string(), nats_msg.payload.to_vec());

        if let Some(nats_headers) = nats_msg.headers {
            let mut headers = std::collections::HashMap::new();
            for (key, values) in nats_headers.iter() {
                // Take the first value for each header
                if let Some(value) = values.first() {
                    headers.insert(key.to_string(), value.to_string());
                }
            }

            if let Some(key) = headers.remove(EVENT_KEY_HEADER) {
                msg = msg.with_key(key);
            }
            if !headers.is_empty() {
                msg = msg.with_headers(headers);
            }
        }

        msg
    }
}

#[async_trait]
impl EventBus for NatsBus {
    async fn publish(&self, subject: &str, key: Option<&str>, payload: Vec<u8>) -> BusResult<()> {
        match key {
            Some(key) => {
                let mut headers = async_nats::HeaderMap::new();
                headers.insert(EVENT_KEY_HEADER, key);
                self.client
                    .publish_with_headers(subject.to_string(), headers, payload.into())
                    .await
                    .map_err(|e| BusError::PublishError(e.to_string()))?;
            }
            None => {
                self.client
                    .publish(subject.to_string(), payload.into())
                    .await
                    .map_err(|e| BusError::PublishError(e.to_string()))?;
            }
        }

        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> BusResult<BoxStream<'static, BusMessage>> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| BusError::SubscribeError(e.to_string()))?;

        Ok(subscriber.map(Self::convert_message).boxed())
    }

    async fn subscribe_queue(
        &self,
        subject: &str,
        group: &str,
    ) -> BusResult<BoxStream<'static, BusMessage>> {
        let subscriber = self
            .client
            .queue_subscribe(subject.to_string(), group.to_string())
            .await
            .map_err(|e| BusError::SubscribeError(e.to_string()))?;

        Ok(subscriber.map(Self::convert_message).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    // Note: These tests require a running NATS server
    // For CI, use InMemoryBus tests instead
    // For manual testing: docker run -p 4222:4222 nats:2.10-alpine

    #[tokio::test]
    #[ignore] // Requires NATS server
    async fn test_nats_bus_publish_subscribe() {
        let client = async_nats::connect("nats://localhost:4222")
            .await
            .expect("NATS server must be running on localhost:4222");

        let bus = NatsBus::new(client);

        let mut stream = bus.subscribe("test.nats.>").await.unwrap();

        let payload = b"test message".to_vec();
        bus.publish("test.nats.hello", Some("k-1"), payload.clone())
            .await
            .unwrap();

        let msg = tokio::time::timeout(std::time::Duration::from_secs(2), stream.next())
            .await
            .expect("timeout waiting for message")
            .expect("stream ended");

        assert_eq!(msg.subject, "test.nats.hello");
        assert_eq!(msg.payload, payload);
        assert_eq!(msg.key.as_deref(), Some("k-1"));
    }

    #[tokio::test]
    #[ignore] // Requires NATS server
    async fn test_nats_bus_queue_group_single_delivery() {
        let client = async_nats::connect("nats://localhost:4222")
            .await
            .expect("NATS server must be running on localhost:4222");

        let bus = NatsBus::new(client);

        let mut member1 = bus.subscribe_queue("test.nats.queue", "grupo1").await.unwrap();
        let mut member2 = bus.subscribe_queue("test.nats.queue", "grupo1").await.unwrap();

        bus.publish("test.nats.queue", None, b"once".to_vec())
            .await
            .unwrap();

        let first = tokio::time::timeout(std::time::Duration::from_secs(2), member1.next()).await;
        let second =
            tokio::time::timeout(std::time::Duration::from_millis(500), member2.next()).await;

        // Exactly one member of the group receives the message
        assert!(first.is_ok() != second.is_ok());
    }
}
