//! Consumer wiring for the customer topic

use customer_contracts::{
    Customer, CUSTOMER_CREATED_TAG, CUSTOMER_DELETED_TAG, CUSTOMER_UPDATED_TAG,
};
use event_bus::EventBus;
use event_consumer::{spawn_consumer, EventRouter};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::handlers::handle_customer_created;

/// Build the router for the customer topic
///
/// All three variants are registered so their envelopes decode; only the
/// created variant has a handler. Updated and deleted events are recognized
/// and deliberately skipped — the behavior shipped by the original service.
pub fn customer_router() -> EventRouter {
    EventRouter::new()
        .on(CUSTOMER_CREATED_TAG, handle_customer_created)
        .recognize::<Customer>(CUSTOMER_UPDATED_TAG)
        .recognize::<Customer>(CUSTOMER_DELETED_TAG)
}

/// Start the customer events consumer as a background task
pub fn start_customer_events_consumer(
    bus: Arc<dyn EventBus>,
    topic: &str,
    group: &str,
) -> JoinHandle<()> {
    tracing::info!(topic = %topic, group = %group, "Starting customer events consumer");
    spawn_consumer(bus, topic, group, customer_router())
}
