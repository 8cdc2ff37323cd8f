//! HTTP boundary of the customers service
//!
//! A single POST endpoint accepts a customer and returns it once the created
//! event has been handed to the transport. Publish failures map to 5xx —
//! the caller decides whether to retry.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use customer_contracts::Customer;
use event_bus::PublishError;
use std::sync::Arc;

use crate::service::CustomerService;

/// Error response wrapper
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Publish error HTTP response
#[derive(Debug)]
pub struct PublishHttpError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for PublishHttpError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Map publish errors to HTTP status codes
fn map_error(error: PublishError) -> PublishHttpError {
    match error {
        PublishError::Transport(_) => PublishHttpError {
            status: StatusCode::BAD_GATEWAY,
            message: "Event transport unavailable".to_string(), // Don't leak broker details
        },
        PublishError::Serialization(_) => PublishHttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        },
    }
}

/// Handler for POST /customers
///
/// Accepts a customer, publishes the created event, echoes the customer back.
pub async fn save_customer(
    State(service): State<Arc<CustomerService>>,
    Json(customer): Json<Customer>,
) -> Result<Json<Customer>, PublishHttpError> {
    let customer = service.save(customer).await.map_err(map_error)?;
    Ok(Json(customer))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "module": "customers",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Build the service router
pub fn app(service: Arc<CustomerService>) -> Router {
    Router::new()
        .route("/customers", post(save_customer))
        .route("/api/health", get(health))
        .with_state(service)
}
