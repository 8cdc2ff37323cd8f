/// HTTP boundary tests for the customers service
///
/// Exercises POST /customers against an in-memory bus: the saved customer is
/// echoed back, the created event lands on the topic, and transport failures
/// surface as 5xx without a body leak of broker internals.
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use customer_contracts::{Customer, CustomerEvent, CUSTOMER_CREATED_TAG};
use customers_rs::{routes, CustomerService};
use event_bus::{
    BusError, BusMessage, BusResult, EventBus, EventKind, InMemoryBus,
};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tower::ServiceExt;

fn post_customer(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/customers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_post_customer_returns_customer_and_publishes_event() {
    let bus = Arc::new(InMemoryBus::new());
    let mut stream = bus.subscribe("customers").await.unwrap();

    let service = Arc::new(CustomerService::new(bus.clone(), "customers"));
    let app = routes::app(service);

    let response = app
        .oneshot(post_customer(r#"{"name":"Ana"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let returned: Customer = serde_json::from_slice(&body).unwrap();
    assert_eq!(returned.name, "Ana");

    let msg = timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("timeout")
        .expect("stream ended");

    let value: Value = serde_json::from_slice(&msg.payload).unwrap();
    assert_eq!(
        value.get("type").and_then(Value::as_str),
        Some(CUSTOMER_CREATED_TAG)
    );

    let event: CustomerEvent = serde_json::from_slice(&msg.payload).unwrap();
    assert_eq!(event.kind, EventKind::Created);
    assert_eq!(event.payload.name, "Ana");
}

#[tokio::test]
async fn test_health_endpoint() {
    let service = Arc::new(CustomerService::new(
        Arc::new(InMemoryBus::new()),
        "customers",
    ));
    let app = routes::app(service);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

struct UnreachableBus;

#[async_trait]
impl EventBus for UnreachableBus {
    async fn publish(&self, _subject: &str, _key: Option<&str>, _payload: Vec<u8>) -> BusResult<()> {
        Err(BusError::PublishError("connection refused".to_string()))
    }

    async fn subscribe(&self, _subject: &str) -> BusResult<BoxStream<'static, BusMessage>> {
        Err(BusError::SubscribeError("connection refused".to_string()))
    }

    async fn subscribe_queue(
        &self,
        _subject: &str,
        _group: &str,
    ) -> BusResult<BoxStream<'static, BusMessage>> {
        Err(BusError::SubscribeError("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_transport_failure_maps_to_bad_gateway() {
    let service = Arc::new(CustomerService::new(Arc::new(UnreachableBus), "customers"));
    let app = routes::app(service);

    let response = app
        .oneshot(post_customer(r#"{"name":"Ana"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&body).unwrap();
    // Broker details stay out of the response
    assert_eq!(
        error.get("error").and_then(Value::as_str),
        Some("Event transport unavailable")
    );
}
