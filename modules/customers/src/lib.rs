pub mod config;
pub mod routes;
pub mod service;

pub use service::CustomerService;
