//! Event handlers for the customer topic
//!
//! Each handler receives the fully-typed event for its variant and performs
//! its side effect — here, structured logging standing in for a real
//! notification channel.

use customer_contracts::CustomerEvent;
use event_consumer::BoxError;

/// Handle a customer-created event
pub async fn handle_customer_created(event: CustomerEvent) -> Result<(), BoxError> {
    tracing::info!(
        event_id = %event.id,
        kind = %event.kind,
        customer = ?event.payload,
        "Received customer created event"
    );

    Ok(())
}
