//! Streaming/session transport boundary (publish-subscribe frames).
//!
//! Same bidirectional copy as the messaging boundary, applied to a frame's
//! header map. Frame header names are unrestricted, so no key encoder is
//! involved on this boundary — only the configured include/exclude filter.

use std::collections::BTreeMap;
use std::sync::Arc;

use zonal_core::{ContextCarrier, FilterError, PatternFilter};

use super::bag::{export_attributes, import_attributes, PropertyBag};
use crate::config::TransportConfig;

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One frame of a publish-subscribe session: command, headers, body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Frame command (`SEND`, `MESSAGE`, ...). Opaque to the boundary.
    pub command: String,
    /// Frame headers; `BTreeMap` keeps iteration deterministic.
    pub headers: BTreeMap<String, String>,
    /// Opaque body bytes.
    pub body: Vec<u8>,
}

impl Frame {
    /// A frame with the given command and no headers or body.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }
}

impl PropertyBag for Frame {
    fn set_property(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.headers.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn property(&self, key: &str) -> Option<String> {
        self.headers.get(key).cloned()
    }

    fn property_keys(&self) -> Vec<String> {
        self.headers.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Boundary state
// ---------------------------------------------------------------------------

/// Filter for the frame transport, built once from configuration.
#[derive(Debug, Clone)]
pub struct FramePropagation {
    enabled: bool,
    filter: PatternFilter,
}

impl FramePropagation {
    /// Builds the boundary from the transport's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] for malformed include/exclude patterns.
    pub fn from_config(config: &TransportConfig) -> Result<Self, FilterError> {
        Ok(Self {
            enabled: config.enabled,
            filter: PatternFilter::new(&config.include_patterns, &config.exclude_patterns)?,
        })
    }

    /// Copies accepted attributes into the frame's headers.
    pub fn export(&self, frame: &mut Frame) {
        if self.enabled {
            export_attributes(frame, &self.filter, None);
        }
    }

    /// Seeds the live map from the frame's headers.
    pub fn import(&self, frame: &Frame) {
        if self.enabled {
            import_attributes(frame, &self.filter, None);
        }
    }
}

// ---------------------------------------------------------------------------
// Session decorator (outbound)
// ---------------------------------------------------------------------------

/// Sends frames on an established session. Implemented by the host's
/// transport integration.
pub trait FrameSession: Send + Sync {
    /// Sends one frame.
    ///
    /// # Errors
    ///
    /// Transport failures, unchanged by the decorator.
    fn send_frame(&self, frame: Frame) -> anyhow::Result<()>;

    /// Re-wrapping guard: `true` when sent frames already carry attributes.
    fn propagates_context(&self) -> bool {
        false
    }
}

/// Session decorator: exports attributes into each outgoing frame's headers.
pub struct PropagatingSession<S> {
    delegate: S,
    propagation: FramePropagation,
}

impl<S: FrameSession> PropagatingSession<S> {
    /// Wraps `delegate`. Use [`wrap_session`] when the delegate might
    /// already propagate.
    pub fn new(delegate: S, propagation: FramePropagation) -> Self {
        Self {
            delegate,
            propagation,
        }
    }
}

impl<S: FrameSession> FrameSession for PropagatingSession<S> {
    fn send_frame(&self, mut frame: Frame) -> anyhow::Result<()> {
        self.propagation.export(&mut frame);
        self.delegate.send_frame(frame)
    }

    fn propagates_context(&self) -> bool {
        true
    }
}

impl<S: FrameSession + ?Sized> FrameSession for Arc<S> {
    fn send_frame(&self, frame: Frame) -> anyhow::Result<()> {
        (**self).send_frame(frame)
    }

    fn propagates_context(&self) -> bool {
        (**self).propagates_context()
    }
}

/// Wraps a session unless it already propagates context.
pub fn wrap_session(
    delegate: Arc<dyn FrameSession>,
    propagation: FramePropagation,
) -> Arc<dyn FrameSession> {
    if delegate.propagates_context() {
        delegate
    } else {
        Arc::new(PropagatingSession::new(delegate, propagation))
    }
}

// ---------------------------------------------------------------------------
// Inbound dispatch
// ---------------------------------------------------------------------------

/// Runs `handler` for an incoming frame with the frame's accepted headers in
/// the live map, then detaches the map from the dispatching thread.
pub fn handle_frame_with_context<R>(
    propagation: &FramePropagation,
    frame: &Frame,
    handler: impl FnOnce(&Frame) -> R,
) -> R {
    propagation.import(frame);
    let result = handler(frame);
    ContextCarrier::remove();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
