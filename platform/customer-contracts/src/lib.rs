//! # Customer Event Contract
//!
//! Canonical types and constants for the `customers` topic: the payload
//! shape, the closed set of type tags, and the topic/consumer-group names.
//!
//! This crate is the statically agreed type-mapping configuration described
//! by the wire contract: producer and consumer deployments both depend on it
//! so that the same (tag, payload type) bindings exist on both sides before
//! any traffic flows. The contract is point-to-point — there is no schema
//! registry and no version negotiation — so any change here must ship to
//! both services in lockstep.

use serde::{Deserialize, Serialize};

/// Topic the customer events are published to
pub const CUSTOMER_TOPIC: &str = "customers";

/// Consumer group under which the notifications service subscribes
pub const NOTIFICATIONS_GROUP: &str = "grupo1";

/// Type tag of the customer-created variant
pub const CUSTOMER_CREATED_TAG: &str = "customers.CustomerCreatedEvent";

/// Type tag of the customer-updated variant
pub const CUSTOMER_UPDATED_TAG: &str = "customers.CustomerUpdatedEvent";

/// Type tag of the customer-deleted variant
pub const CUSTOMER_DELETED_TAG: &str = "customers.CustomerDeletedEvent";

/// Customer record carried as event payload
///
/// Opaque to the event core: it is wrapped, serialized, and handed to
/// handlers without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// An event envelope carrying a [`Customer`] payload
///
/// All three customer variants share this payload shape; the type tag on the
/// wire is what distinguishes them.
pub type CustomerEvent = event_bus::EventEnvelope<Customer>;

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::{encode_tagged, EventEnvelope, EventKind};
    use serde_json::Value;

    #[test]
    fn test_type_tags_are_stable() {
        // Wire compatibility: renaming a tag breaks deployed consumers
        assert_eq!(CUSTOMER_CREATED_TAG, "customers.CustomerCreatedEvent");
        assert_eq!(CUSTOMER_UPDATED_TAG, "customers.CustomerUpdatedEvent");
        assert_eq!(CUSTOMER_DELETED_TAG, "customers.CustomerDeletedEvent");
        assert_eq!(CUSTOMER_TOPIC, "customers");
        assert_eq!(NOTIFICATIONS_GROUP, "grupo1");
    }

    #[test]
    fn test_customer_wire_fields() {
        let customer = Customer {
            id: Some(7),
            name: "Ana".to_string(),
            email: Some("ana@example.com".to_string()),
        };

        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value.get("id").and_then(Value::as_i64), Some(7));
        assert_eq!(value.get("name").and_then(Value::as_str), Some("Ana"));
        assert_eq!(
            value.get("email").and_then(Value::as_str),
            Some("ana@example.com")
        );
    }

    #[test]
    fn test_optional_fields_are_omitted_not_null() {
        let customer = Customer {
            id: None,
            name: "Ana".to_string(),
            email: None,
        };

        let value = serde_json::to_value(&customer).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("email").is_none());
    }

    #[test]
    fn test_created_event_wire_shape() {
        let envelope = EventEnvelope::new(
            EventKind::Created,
            Customer {
                id: None,
                name: "Ana".to_string(),
                email: None,
            },
        );

        let bytes = encode_tagged(CUSTOMER_CREATED_TAG, &envelope).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            value.get("type").and_then(Value::as_str),
            Some(CUSTOMER_CREATED_TAG)
        );
        assert_eq!(value.get("kind").and_then(Value::as_str), Some("CREATED"));
        assert_eq!(
            value.pointer("/payload/name").and_then(Value::as_str),
            Some("Ana")
        );

        let decoded: CustomerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, envelope);
    }
}
