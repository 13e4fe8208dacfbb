//! Asynchronous messaging boundary: producer and handler decorators.
//!
//! Outbound, the producer decorator copies accepted attributes into message
//! properties at send time, rewriting keys through the [`KeyEncoder`] because
//! broker property names are restricted to identifier characters. Inbound,
//! the handler decorator seeds the live map from message properties before
//! dispatch and detaches it afterwards so listener threads are never left
//! holding a delivered message's attributes.

use std::collections::BTreeMap;
use std::sync::Arc;

use zonal_core::{ContextCarrier, FilterError, PatternFilter, SeparatorEncoder};

use super::bag::{export_attributes, import_attributes, PropertyBag};
use crate::config::TransportConfig;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A broker message: string properties plus an opaque payload.
///
/// `BTreeMap` keeps property iteration deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Per-message string properties.
    pub properties: BTreeMap<String, String>,
    /// Opaque payload bytes; the boundary never looks inside.
    pub payload: Vec<u8>,
}

impl Message {
    /// A message with the given payload and no properties.
    #[must_use]
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            properties: BTreeMap::new(),
            payload,
        }
    }
}

impl PropertyBag for Message {
    fn set_property(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.properties.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn property(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn property_keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Shared boundary state
// ---------------------------------------------------------------------------

/// Filter/encoder pair for the messaging transport, built once from
/// configuration and shared by the producer and handler decorators.
#[derive(Debug, Clone)]
pub struct MessagingPropagation {
    enabled: bool,
    filter: PatternFilter,
    encoder: SeparatorEncoder,
}

impl MessagingPropagation {
    /// Builds the boundary from the transport's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] for malformed include/exclude patterns.
    pub fn from_config(config: &TransportConfig) -> Result<Self, FilterError> {
        Ok(Self {
            enabled: config.enabled,
            filter: PatternFilter::new(&config.include_patterns, &config.exclude_patterns)?,
            encoder: SeparatorEncoder::default(),
        })
    }

    /// Copies accepted attributes into the message's properties.
    pub fn export(&self, message: &mut Message) {
        if self.enabled {
            export_attributes(message, &self.filter, Some(&self.encoder));
        }
    }

    /// Seeds the live map from the message's properties.
    pub fn import(&self, message: &Message) {
        if self.enabled {
            import_attributes(message, &self.filter, Some(&self.encoder));
        }
    }
}

// ---------------------------------------------------------------------------
// Producer decorator
// ---------------------------------------------------------------------------

/// Sends messages toward the broker. Implemented by the host's messaging
/// integration.
pub trait MessageProducer: Send + Sync {
    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Transport failures, unchanged by the decorator.
    fn send(&self, message: Message) -> anyhow::Result<()>;

    /// Re-wrapping guard: `true` when sent messages already carry attributes.
    fn propagates_context(&self) -> bool {
        false
    }
}

/// Producer decorator: exports attributes into each message before the
/// delegate sends it. A per-key copy failure never fails the send.
pub struct PropagatingProducer<P> {
    delegate: P,
    propagation: MessagingPropagation,
}

impl<P: MessageProducer> PropagatingProducer<P> {
    /// Wraps `delegate`. Use [`wrap_producer`] when the delegate might
    /// already propagate.
    pub fn new(delegate: P, propagation: MessagingPropagation) -> Self {
        Self {
            delegate,
            propagation,
        }
    }
}

impl<P: MessageProducer> MessageProducer for PropagatingProducer<P> {
    fn send(&self, mut message: Message) -> anyhow::Result<()> {
        self.propagation.export(&mut message);
        self.delegate.send(message)
    }

    fn propagates_context(&self) -> bool {
        true
    }
}

impl<P: MessageProducer + ?Sized> MessageProducer for Arc<P> {
    fn send(&self, message: Message) -> anyhow::Result<()> {
        (**self).send(message)
    }

    fn propagates_context(&self) -> bool {
        (**self).propagates_context()
    }
}

/// Wraps a producer unless it already propagates context.
pub fn wrap_producer(
    delegate: Arc<dyn MessageProducer>,
    propagation: MessagingPropagation,
) -> Arc<dyn MessageProducer> {
    if delegate.propagates_context() {
        delegate
    } else {
        Arc::new(PropagatingProducer::new(delegate, propagation))
    }
}

// ---------------------------------------------------------------------------
// Handler decorator
// ---------------------------------------------------------------------------

/// Handles delivered messages. Implemented by the host's listener code.
pub trait MessageHandler: Send + Sync {
    /// Handles one delivered message.
    fn on_message(&self, message: &Message);

    /// Re-wrapping guard, as on [`MessageProducer`].
    fn propagates_context(&self) -> bool {
        false
    }
}

/// Handler decorator: imports message properties into the live map, runs the
/// delegate, then detaches the live map from the listener thread.
pub struct PropagatingHandler<H> {
    delegate: H,
    propagation: MessagingPropagation,
}

impl<H: MessageHandler> PropagatingHandler<H> {
    /// Wraps `delegate`. Use [`wrap_handler`] when the delegate might
    /// already propagate.
    pub fn new(delegate: H, propagation: MessagingPropagation) -> Self {
        Self {
            delegate,
            propagation,
        }
    }
}

impl<H: MessageHandler> MessageHandler for PropagatingHandler<H> {
    fn on_message(&self, message: &Message) {
        self.propagation.import(message);
        self.delegate.on_message(message);
        // Listener threads are pooled: detach before the next delivery.
        ContextCarrier::remove();
    }

    fn propagates_context(&self) -> bool {
        true
    }
}

impl<H: MessageHandler + ?Sized> MessageHandler for Arc<H> {
    fn on_message(&self, message: &Message) {
        (**self).on_message(message);
    }

    fn propagates_context(&self) -> bool {
        (**self).propagates_context()
    }
}

/// Wraps a handler unless it already propagates context.
pub fn wrap_handler(
    delegate: Arc<dyn MessageHandler>,
    propagation: MessagingPropagation,
) -> Arc<dyn MessageHandler> {
    if delegate.propagates_context() {
        delegate
    } else {
        Arc::new(PropagatingHandler::new(delegate, propagation))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
