//! In-memory implementation of the EventBus trait for testing and development

use crate::{BusMessage, BusResult, EventBus};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A registered subscription: plain subscribers get every matching message,
/// queue-group subscribers share matching messages round-robin within the
/// group.
struct Subscriber {
    pattern: String,
    group: Option<String>,
    sender: mpsc::UnboundedSender<BusMessage>,
}

#[derive(Default)]
struct Inner {
    subscribers: Vec<Subscriber>,
    /// Per-group rotation counter for queue delivery
    round_robin: HashMap<String, usize>,
}

/// EventBus implementation backed by in-process channels
///
/// This implementation is suitable for:
/// - Unit tests (no external dependencies)
/// - Local development without a broker
/// - Integration tests that need fast, isolated message buses
///
/// Delivery happens synchronously inside `publish`, so messages published
/// from a single task are received in publish order — which also makes
/// per-key ordering trivially true here.
///
/// # Example
/// ```rust
/// use event_bus::{EventBus, InMemoryBus};
/// use futures::StreamExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bus = InMemoryBus::new();
///
/// // Subscribe before publishing
/// let mut stream = bus.subscribe("customers.>").await?;
///
/// // Publish a message
/// bus.publish("customers.created", None, b"hello".to_vec()).await?;
///
/// // Receive it
/// let msg = stream.next().await.unwrap();
/// assert_eq!(msg.subject, "customers.created");
/// assert_eq!(msg.payload, b"hello");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBus {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryBus {
    /// Create a new in-memory event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a subject matches a subscription pattern
    ///
    /// Supports NATS-style wildcards:
    /// - `*` matches exactly one token
    /// - `>` matches one or more tokens
    ///
    /// # Examples
    /// - `customers.>` matches `customers.events.created`
    /// - `customers.*.created` matches `customers.events.created`
    /// - `customers.*` does NOT match `customers.events.created` (too many tokens)
    fn matches_pattern(subject: &str, pattern: &str) -> bool {
        let subject_tokens: Vec<&str> = subject.split('.').collect();
        let pattern_tokens: Vec<&str> = pattern.split('.').collect();

        let mut s_idx = 0;
        let mut p_idx = 0;

        while s_idx < subject_tokens.len() && p_idx < pattern_tokens.len() {
            let pattern_token = pattern_tokens[p_idx];

            if pattern_token == ">" {
                // `>` matches all remaining tokens
                return true;
            } else if pattern_token == "*" || subject_tokens[s_idx] == pattern_token {
                s_idx += 1;
                p_idx += 1;
            } else {
                return false;
            }
        }

        // Both must be exhausted for a full match (unless pattern ended with `>`)
        s_idx == subject_tokens.len() && p_idx == pattern_tokens.len()
    }

    fn add_subscriber(
        &self,
        pattern: &str,
        group: Option<&str>,
    ) -> BoxStream<'static, BusMessage> {
        let (sender, mut receiver) = mpsc::unbounded_channel();

        {
            let mut inner = self.inner.lock().expect("bus state poisoned");
            inner.subscribers.push(Subscriber {
                pattern: pattern.to_string(),
                group: group.map(str::to_string),
                sender,
            });
        }

        let stream = async_stream::stream! {
            while let Some(msg) = receiver.recv().await {
                yield msg;
            }
        };

        stream.boxed()
    }
}

#[async_trait]
impl EventBus for InMemoryBus {
    async fn publish(&self, subject: &str, key: Option<&str>, payload: Vec<u8>) -> BusResult<()> {
        let mut msg = BusMessage::new(subject.to_string(), payload);
        if let Some(key) = key {
            msg = msg.with_key(key.to_string());
        }

        let mut guard = self.inner.lock().expect("bus state poisoned");
        let inner = &mut *guard;

        // Drop subscriptions whose receiving stream has been dropped
        inner.subscribers.retain(|s| !s.sender.is_closed());

        // Broadcast delivery to plain subscribers
        for sub in inner
            .subscribers
            .iter()
            .filter(|s| s.group.is_none() && Self::matches_pattern(subject, &s.pattern))
        {
            let _ = sub.sender.send(msg.clone());
        }

        // Queue-group delivery: one member per group, rotating
        let mut group_members: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, sub) in inner.subscribers.iter().enumerate() {
            if let Some(group) = &sub.group {
                if Self::matches_pattern(subject, &sub.pattern) {
                    group_members.entry(group.clone()).or_default().push(idx);
                }
            }
        }

        for (group, members) in group_members {
            let counter = inner.round_robin.entry(group).or_insert(0);
            let chosen = members[*counter % members.len()];
            *counter += 1;
            let _ = inner.subscribers[chosen].sender.send(msg.clone());
        }

        Ok(())
    }

    async fn subscribe(&self, pattern: &str) -> BusResult<BoxStream<'static, BusMessage>> {
        Ok(self.add_subscriber(pattern, None))
    }

    async fn subscribe_queue(
        &self,
        pattern: &str,
        group: &str,
    ) -> BusResult<BoxStream<'static, BusMessage>> {
        Ok(self.add_subscriber(pattern, Some(group)))
    }
}
