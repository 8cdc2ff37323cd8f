//! Tag-to-variant registry and type-preserving dispatch
//!
//! A serialized message carries its concrete variant's type tag as outer
//! metadata. The router maps each registered tag to a typed decoder and an
//! optional handler, replacing runtime type introspection with an explicit
//! per-tag decode step: the handler always receives the fully-typed
//! `EventEnvelope<T>`, never raw JSON.

use event_bus::{EventEnvelope, TYPE_TAG_FIELD};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Error type handlers may return; surfaced as [`DispatchError::Handler`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'static>>;

/// Decodes the envelope for one tag and, when a handler is registered,
/// yields the future running it. `None` means the variant is recognized but
/// has no handler.
type RouteFn = Box<dyn Fn(Value) -> Result<Option<HandlerFuture>, DispatchError> + Send + Sync>;

/// Errors raised while processing one received message
///
/// `UnknownTypeTag` and `MalformedEnvelope` are decode-time failures and are
/// isolated per message: the delivery loop drops the message after logging
/// and keeps going. `Handler` failures are intentionally *not* isolated —
/// they propagate and abort processing (see [`crate::run_consumer`]).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown event type tag '{0}'")]
    UnknownTypeTag(String),

    #[error("malformed event envelope: {0}")]
    MalformedEnvelope(String),

    #[error("handler for '{type_tag}' failed: {source}")]
    Handler {
        type_tag: String,
        #[source]
        source: BoxError,
    },
}

/// Terminal success states of a dispatched message
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The message was decoded and its handler ran to completion
    Dispatched { type_tag: String },
    /// The tag is registered and the envelope decoded cleanly, but no
    /// handler exists for the variant: the message is a silent no-op
    Unhandled { type_tag: String },
}

/// The shared tag-to-variant registry plus dispatch logic
///
/// Both processes must agree on the same (tag, payload type) bindings before
/// any traffic flows; there is no schema negotiation on the wire. Tags not
/// registered here fail closed on receipt.
#[derive(Default)]
pub struct EventRouter {
    routes: HashMap<String, RouteFn>,
}

impl EventRouter {
    /// Create an empty router
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag with its payload type and an async handler
    ///
    /// The handler receives the decoded `EventEnvelope<T>` and performs side
    /// effects; its errors are not caught by the router.
    pub fn on<T, F, Fut>(mut self, type_tag: impl Into<String>, handler: F) -> Self
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(EventEnvelope<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let route: RouteFn = Box::new(move |value| {
            let envelope = decode_envelope::<T>(value)?;
            Ok(Some(Box::pin(handler(envelope)) as HandlerFuture))
        });
        self.routes.insert(type_tag.into(), route);
        self
    }

    /// Register a tag and payload type without a handler
    ///
    /// Messages with this tag decode fully (so shape errors still surface as
    /// `MalformedEnvelope`) and then terminate as
    /// [`DispatchOutcome::Unhandled`].
    pub fn recognize<T>(mut self, type_tag: impl Into<String>) -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        let route: RouteFn = Box::new(move |value| {
            decode_envelope::<T>(value)?;
            Ok(None)
        });
        self.routes.insert(type_tag.into(), route);
        self
    }

    /// Whether a tag has a registry entry
    pub fn is_registered(&self, type_tag: &str) -> bool {
        self.routes.contains_key(type_tag)
    }

    /// Process one received message end to end
    ///
    /// Lifecycle: parse the outer structure, extract the type tag, resolve
    /// it against the registry, decode into the concrete variant, run the
    /// handler. Each step fails closed — there is no best-effort partial
    /// decode and no retry state.
    pub async fn dispatch(&self, raw: &[u8]) -> Result<DispatchOutcome, DispatchError> {
        let value: Value = serde_json::from_slice(raw).map_err(|e| {
            DispatchError::MalformedEnvelope(format!("invalid envelope structure: {e}"))
        })?;

        let type_tag = value
            .get(TYPE_TAG_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DispatchError::MalformedEnvelope(format!(
                    "missing or non-string '{TYPE_TAG_FIELD}' field"
                ))
            })?
            .to_string();

        let route = self
            .routes
            .get(&type_tag)
            .ok_or_else(|| DispatchError::UnknownTypeTag(type_tag.clone()))?;

        match route(value)? {
            Some(handler_future) => {
                handler_future
                    .await
                    .map_err(|source| DispatchError::Handler {
                        type_tag: type_tag.clone(),
                        source,
                    })?;
                Ok(DispatchOutcome::Dispatched { type_tag })
            }
            None => Ok(DispatchOutcome::Unhandled { type_tag }),
        }
    }
}

fn decode_envelope<T: DeserializeOwned>(value: Value) -> Result<EventEnvelope<T>, DispatchError> {
    serde_json::from_value(value)
        .map_err(|e| DispatchError::MalformedEnvelope(format!("envelope does not conform: {e}")))
}
