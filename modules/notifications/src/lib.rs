pub mod config;
pub mod consumer_tasks;
pub mod handlers;

pub use consumer_tasks::{customer_router, start_customer_events_consumer};
