//! # EventBus Abstraction
//!
//! Broker transport abstraction connecting the producer and consumer
//! processes, together with the typed event envelope that travels over it.
//!
//! ## Implementations
//!
//! - **NatsBus**: production implementation wrapping an `async_nats::Client`
//! - **InMemoryBus**: dev/test implementation with no external dependencies
//!
//! Both are selected by configuration at startup and injected as an
//! `Arc<dyn EventBus>`; nothing in this crate holds ambient global state.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use event_bus::{EventBus, EventKind, EventPublisher, InMemoryBus, NatsBus};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Production: NATS
//! let nats_client = async_nats::connect("nats://localhost:4222").await?;
//! let bus: Arc<dyn EventBus> = Arc::new(NatsBus::new(nats_client));
//!
//! // Dev/Test: In-Memory
//! let bus: Arc<dyn EventBus> = Arc::new(InMemoryBus::new());
//!
//! // Publish a typed event to a topic
//! let publisher = EventPublisher::new(bus.clone(), "customers");
//! let envelope = publisher
//!     .publish(
//!         "customers.CustomerCreatedEvent",
//!         EventKind::Created,
//!         None,
//!         serde_json::json!({ "name": "Ana" }),
//!     )
//!     .await?;
//! println!("published event {}", envelope.id);
//! # Ok(())
//! # }
//! ```

mod envelope;
mod inmemory_bus;
mod nats_bus;
mod publisher;

pub use envelope::{encode_tagged, EventEnvelope, EventKind, TYPE_TAG_FIELD};
pub use inmemory_bus::InMemoryBus;
pub use nats_bus::NatsBus;
pub use publisher::{EventPublisher, PublishError};

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;

/// A message received from the event bus
#[derive(Debug, Clone)]
pub struct BusMessage {
    /// The subject/topic this message was published to
    pub subject: String,
    /// The message payload (raw bytes)
    pub payload: Vec<u8>,
    /// Application-chosen ordering key, if the publisher set one
    pub key: Option<String>,
    /// Transport headers other than the ordering key
    pub headers: Option<std::collections::HashMap<String, String>>,
}

impl BusMessage {
    /// Create a new bus message with no key and no headers
    pub fn new(subject: String, payload: Vec<u8>) -> Self {
        Self {
            subject,
            payload,
            key: None,
            headers: None,
        }
    }

    /// Attach an ordering key to the message
    pub fn with_key(mut self, key: String) -> Self {
        self.key = Some(key);
        self
    }

    /// Attach transport headers to the message
    pub fn with_headers(mut self, headers: std::collections::HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// Errors that can occur when using the event bus
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("failed to publish message: {0}")]
    PublishError(String),

    #[error("failed to subscribe to subject: {0}")]
    SubscribeError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("invalid subject pattern: {0}")]
    InvalidSubject(String),
}

/// Result type for event bus operations
pub type BusResult<T> = Result<T, BusError>;

/// Core event bus abstraction for publish-subscribe messaging
///
/// The bus moves opaque bytes between processes; typed encoding and decoding
/// live above it (see [`EventPublisher`] and the `event-consumer` crate).
///
/// A `publish` call completes once the transport has *accepted* the send.
/// Acceptance does not imply broker durability; any batching or background
/// flushing is the transport's concern and opaque to callers.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a message to a subject
    ///
    /// # Arguments
    /// * `subject` - The subject/topic to publish to (e.g., "customers")
    /// * `key` - Optional ordering key. Messages sharing a key are delivered
    ///   in publish order; with no key there is no cross-message ordering
    ///   guarantee.
    /// * `payload` - The message payload as raw bytes
    async fn publish(&self, subject: &str, key: Option<&str>, payload: Vec<u8>) -> BusResult<()>;

    /// Subscribe to messages matching a subject pattern
    ///
    /// Every subscriber receives every matching message. Patterns support
    /// NATS-style wildcards:
    /// - `*` matches a single token (e.g., `customers.*`)
    /// - `>` matches one or more trailing tokens (e.g., `customers.>`)
    async fn subscribe(&self, subject: &str) -> BusResult<BoxStream<'static, BusMessage>>;

    /// Subscribe as a member of a named consumer group
    ///
    /// Each matching message is delivered to exactly one member of the
    /// group; distinct groups each receive their own copy. This is how the
    /// broker distributes a topic across consumer instances.
    async fn subscribe_queue(
        &self,
        subject: &str,
        group: &str,
    ) -> BusResult<BoxStream<'static, BusMessage>>;
}

impl fmt::Debug for dyn EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventBus")
    }
}
