//! # Event Consumer
//!
//! Consumer-side counterpart to the `event-bus` publisher: receive raw bytes
//! from the broker, reconstruct the typed envelope via a statically agreed
//! tag-to-type registry, and route each event to the handler registered for
//! its concrete variant.
//!
//! The registry is built once at startup and is read-only afterwards, so it
//! can be shared across concurrently running consumer workers without
//! locking.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use event_bus::{EventEnvelope, InMemoryBus};
//! use event_consumer::{spawn_consumer, EventRouter};
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Deserialize)]
//! struct Customer {
//!     name: String,
//! }
//!
//! # async fn example() {
//! let router = EventRouter::new()
//!     .on("customers.CustomerCreatedEvent", |event: EventEnvelope<Customer>| async move {
//!         tracing::info!(event_id = %event.id, name = %event.payload.name, "customer created");
//!         Ok(())
//!     })
//!     .recognize::<Customer>("customers.CustomerDeletedEvent");
//!
//! let bus = Arc::new(InMemoryBus::new());
//! spawn_consumer(bus, "customers", "grupo1", router);
//! # }
//! ```

mod router;
mod runner;

pub use router::{BoxError, DispatchError, DispatchOutcome, EventRouter};
pub use runner::{run_consumer, spawn_consumer, ConsumerError};
