//! # Event Envelope
//!
//! The common wrapper around every event that crosses the broker boundary.
//!
//! ## Wire Contract
//!
//! An envelope is serialized as a JSON object with the type tag of its
//! concrete variant embedded as outer metadata, next to the envelope fields
//! rather than inside the payload:
//!
//! ```json
//! {
//!   "type": "customers.CustomerCreatedEvent",
//!   "id": "550e8400-e29b-41d4-a716-446655440000",
//!   "occurred_at": "2026-08-30T12:00:00.123456789Z",
//!   "kind": "CREATED",
//!   "payload": { "name": "Ana" }
//! }
//! ```
//!
//! Field names and encodings are a point-to-point contract between producer
//! and consumer deployments. There is no schema registry and no version
//! negotiation; both sides must agree statically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the wire field carrying the type tag.
///
/// The tag identifies which concrete variant produced a serialized message
/// and is the only piece of metadata the consumer needs to recover the
/// original payload type.
pub const TYPE_TAG_FIELD: &str = "type";

/// Classification of an event over a domain object.
///
/// This is a closed vocabulary: extending it requires updating producer and
/// consumer deployments in lockstep, since no capability negotiation exists
/// on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

impl EventKind {
    /// The wire name of this kind, as it appears in serialized envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "CREATED",
            EventKind::Updated => "UPDATED",
            EventKind::Deleted => "DELETED",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic event envelope wrapping a domain payload of type `T`.
///
/// An envelope is constructed once by the producer, immutable thereafter,
/// serialized exactly once, and decoded exactly once on the consumer side.
/// The constructor populates every field; a published envelope never has an
/// absent payload.
///
/// # Type Parameter
///
/// * `T` - The event-specific payload type. Opaque to this crate: it is
///   carried and (de)serialized, never interpreted.
///
/// # Examples
///
/// ```rust
/// use event_bus::{EventEnvelope, EventKind};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Customer {
///     name: String,
/// }
///
/// let envelope = EventEnvelope::new(
///     EventKind::Created,
///     Customer { name: "Ana".to_string() },
/// );
/// assert_eq!(envelope.kind, EventKind::Created);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    /// Unique event identifier, assigned by the producer at construction.
    /// Used for traceability only — consumers do not dedup on it.
    pub id: Uuid,

    /// Timestamp assigned by the producer when the envelope was built,
    /// not by the broker at publish time.
    pub occurred_at: DateTime<Utc>,

    /// Classification of the event within the closed [`EventKind`] set.
    pub kind: EventKind,

    /// Event-specific payload.
    pub payload: T,
}

impl<T> EventEnvelope<T> {
    /// Create a new envelope with a fresh random id and `occurred_at = now`.
    pub fn new(kind: EventKind, payload: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            kind,
            payload,
        }
    }

    /// Create an envelope with an explicit id (useful for testing).
    pub fn with_id(id: Uuid, kind: EventKind, payload: T) -> Self {
        Self {
            id,
            occurred_at: Utc::now(),
            kind,
            payload,
        }
    }
}

/// Envelope borrowed together with its type tag, in wire layout.
#[derive(Serialize)]
struct TaggedEnvelope<'a, T> {
    #[serde(rename = "type")]
    type_tag: &'a str,
    #[serde(flatten)]
    envelope: &'a EventEnvelope<T>,
}

/// Serialize an envelope to its wire form, embedding the given type tag.
///
/// Encoding is pure: the envelope is borrowed and never mutated. The tag is
/// written into the outer `"type"` field, outside the payload body.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if the payload cannot be
/// encoded (e.g. a map with non-string keys).
pub fn encode_tagged<T: Serialize>(
    type_tag: &str,
    envelope: &EventEnvelope<T>,
) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&TaggedEnvelope { type_tag, envelope })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Customer {
        name: String,
    }

    #[test]
    fn test_envelope_creation_populates_all_fields() {
        let before = Utc::now();
        let envelope = EventEnvelope::new(
            EventKind::Created,
            Customer {
                name: "Ana".to_string(),
            },
        );
        let after = Utc::now();

        assert!(!envelope.id.is_nil());
        assert!(envelope.occurred_at >= before && envelope.occurred_at <= after);
        assert_eq!(envelope.kind, EventKind::Created);
        assert_eq!(envelope.payload.name, "Ana");
    }

    #[test]
    fn test_event_kind_wire_names() {
        assert_eq!(
            serde_json::to_value(EventKind::Created).unwrap(),
            json!("CREATED")
        );
        assert_eq!(
            serde_json::to_value(EventKind::Updated).unwrap(),
            json!("UPDATED")
        );
        assert_eq!(
            serde_json::to_value(EventKind::Deleted).unwrap(),
            json!("DELETED")
        );

        let kind: EventKind = serde_json::from_value(json!("DELETED")).unwrap();
        assert_eq!(kind, EventKind::Deleted);
    }

    #[test]
    fn test_encode_tagged_embeds_tag_outside_payload() {
        let envelope = EventEnvelope::new(
            EventKind::Created,
            Customer {
                name: "Ana".to_string(),
            },
        );

        let bytes = encode_tagged("customers.CustomerCreatedEvent", &envelope).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            value.get(TYPE_TAG_FIELD).and_then(Value::as_str),
            Some("customers.CustomerCreatedEvent")
        );
        assert_eq!(
            value.get("id").and_then(Value::as_str),
            Some(envelope.id.to_string().as_str())
        );
        assert_eq!(value.get("kind").and_then(Value::as_str), Some("CREATED"));
        // Tag lives next to the envelope fields, not inside the payload
        assert!(value.get("payload").unwrap().get(TYPE_TAG_FIELD).is_none());
        assert_eq!(
            value.pointer("/payload/name").and_then(Value::as_str),
            Some("Ana")
        );
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let envelope = EventEnvelope::new(
            EventKind::Updated,
            Customer {
                name: "Ana".to_string(),
            },
        );

        let bytes = encode_tagged("customers.CustomerUpdatedEvent", &envelope).unwrap();
        let decoded: EventEnvelope<Customer> = serde_json::from_slice(&bytes).unwrap();

        // Full equality, including sub-second timestamp precision
        assert_eq!(decoded, envelope);
        assert_eq!(
            decoded.occurred_at.timestamp_subsec_nanos(),
            envelope.occurred_at.timestamp_subsec_nanos()
        );
    }

    #[test]
    fn test_decode_rejects_missing_required_field() {
        // No "kind" field: structural decode must fail closed
        let raw = json!({
            "type": "customers.CustomerCreatedEvent",
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "occurred_at": "2026-08-30T12:00:00Z",
            "payload": { "name": "Ana" }
        });

        let result: Result<EventEnvelope<Customer>, _> = serde_json::from_value(raw);
        assert!(result.is_err());
    }
}
