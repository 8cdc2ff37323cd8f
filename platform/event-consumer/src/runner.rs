//! Broker-managed delivery loop
//!
//! Bridges a queue-group subscription to the router: each received message
//! is processed end to end before the next is taken, so ordering within a
//! subscription is whatever the transport delivered. Decode failures drop
//! the message and continue; handler failures stop the loop.

use crate::{DispatchError, DispatchOutcome, EventRouter};
use event_bus::{BusError, EventBus};
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Terminal failures of a consumer loop
#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("subscription failed: {0}")]
    Subscribe(#[from] BusError),

    #[error(transparent)]
    Dispatch(DispatchError),
}

/// Consume a subject as a member of a consumer group until the stream ends
/// or a handler fails
///
/// Error policy, per message:
/// - `UnknownTypeTag` / `MalformedEnvelope`: the message is dropped after a
///   warn log and the loop continues. There is no retry and no dead-letter
///   path for dropped messages — a known limitation, not a feature.
/// - `Handler`: returned to the caller, stopping the loop. Committing
///   progress past a failed handler is considered unsafe, so the error is
///   never swallowed here; redelivery is whatever the transport does about
///   an abandoned subscription.
pub async fn run_consumer(
    bus: Arc<dyn EventBus>,
    subject: &str,
    group: &str,
    router: EventRouter,
) -> Result<(), ConsumerError> {
    let mut stream = bus.subscribe_queue(subject, group).await?;
    info!(subject = %subject, group = %group, "Consumer subscribed");

    while let Some(msg) = stream.next().await {
        match router.dispatch(&msg.payload).await {
            Ok(DispatchOutcome::Dispatched { type_tag }) => {
                debug!(subject = %msg.subject, type_tag = %type_tag, "Event dispatched");
            }
            Ok(DispatchOutcome::Unhandled { type_tag }) => {
                // Recognized variant with no registered handler: deliberate no-op
                debug!(subject = %msg.subject, type_tag = %type_tag, "No handler for event, skipping");
            }
            Err(err @ DispatchError::UnknownTypeTag(_)) => {
                warn!(subject = %msg.subject, error = %err, "Dropping message with unregistered type tag");
            }
            Err(err @ DispatchError::MalformedEnvelope(_)) => {
                warn!(subject = %msg.subject, error = %err, "Dropping malformed message");
            }
            Err(err @ DispatchError::Handler { .. }) => {
                error!(subject = %msg.subject, error = %err, "Handler failed, stopping consumer");
                return Err(ConsumerError::Dispatch(err));
            }
        }
    }

    warn!(subject = %subject, group = %group, "Consumer stream ended");
    Ok(())
}

/// Spawn [`run_consumer`] on a background task
///
/// The task logs its terminal state; a handler failure therefore surfaces in
/// the service logs rather than crashing the process.
pub fn spawn_consumer(
    bus: Arc<dyn EventBus>,
    subject: &str,
    group: &str,
    router: EventRouter,
) -> JoinHandle<()> {
    let subject = subject.to_string();
    let group = group.to_string();

    tokio::spawn(async move {
        if let Err(e) = run_consumer(bus, &subject, &group, router).await {
            error!(subject = %subject, group = %group, error = %e, "Consumer terminated");
        }
    })
}
