//! Customer business logic
//!
//! Saving a customer is simulated (there is no persistence layer); the
//! observable effect is the published customer-created event.

use customer_contracts::{Customer, CUSTOMER_CREATED_TAG};
use event_bus::{EventBus, EventKind, EventPublisher, PublishError};
use std::sync::Arc;

/// Handles customer intake and delegates event publication
pub struct CustomerService {
    events: EventPublisher,
}

impl CustomerService {
    /// Create the service on an injected bus handle, publishing to `topic`
    pub fn new(bus: Arc<dyn EventBus>, topic: impl Into<String>) -> Self {
        Self {
            events: EventPublisher::new(bus, topic),
        }
    }

    /// Save a customer and publish a customer-created event
    ///
    /// The customer's own id, when present, is used as the ordering key so
    /// that events about the same customer arrive in publish order; without
    /// one the event is unkeyed.
    ///
    /// # Errors
    ///
    /// Publish errors surface unchanged to the caller (and from there as an
    /// HTTP 5xx); no retry happens at this layer.
    pub async fn save(&self, customer: Customer) -> Result<Customer, PublishError> {
        tracing::info!(name = %customer.name, "Received customer");

        let key = customer.id.map(|id| id.to_string());
        let envelope = self
            .events
            .publish(
                CUSTOMER_CREATED_TAG,
                EventKind::Created,
                key.as_deref(),
                customer.clone(),
            )
            .await?;

        tracing::info!(
            event_id = %envelope.id,
            topic = %self.events.topic(),
            "Customer created event published"
        );

        Ok(customer)
    }
}
