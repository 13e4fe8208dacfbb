//! Generic key/value property-bag copy, shared by the messaging and frame
//! boundaries.
//!
//! Transports expose their per-message metadata (broker properties, frame
//! headers) through [`PropertyBag`]; the copy helpers move accepted attribute
//! entries in and out of the calling thread's live map. Both directions are
//! best-effort per key: one key failing to encode or store is logged and
//! skipped, and the remaining keys — and the send/receive being decorated —
//! still proceed.

use zonal_core::{ContextCarrier, KeyEncoder, KeyFilter};

/// Generic accessor over a transport's per-message key/value metadata.
pub trait PropertyBag {
    /// Stores a property, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Transports may reject a property (illegal name, value too large);
    /// the copy helpers treat that as a per-key failure.
    fn set_property(&mut self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Reads a property value.
    fn property(&self, key: &str) -> Option<String>;

    /// All property keys currently in the bag.
    fn property_keys(&self) -> Vec<String>;
}

/// Copies accepted live-map entries into the bag.
///
/// The filter sees attribute keys as stored in the map, before encoding.
/// When an encoder is given (transports with restricted identifier
/// alphabets), keys are rewritten through it on the way out.
pub fn export_attributes(
    bag: &mut dyn PropertyBag,
    filter: &dyn KeyFilter,
    encoder: Option<&dyn KeyEncoder>,
) {
    let snapshot = ContextCarrier::copy();
    for (key, value) in snapshot.iter() {
        if !filter.accept(key) {
            continue;
        }
        let Some(value) = value else {
            tracing::debug!(%key, "skipping explicit-null attribute on outbound copy");
            continue;
        };
        let stored_key = match encoder {
            Some(encoder) => match encoder.encode(key) {
                Ok(encoded) => encoded,
                Err(error) => {
                    tracing::warn!(%key, %error, "skipping attribute key that cannot be encoded");
                    continue;
                }
            },
            None => key.to_string(),
        };
        if let Err(error) = bag.set_property(&stored_key, value) {
            tracing::warn!(%key, %error, "transport rejected attribute property");
        }
    }
}

/// Copies accepted bag properties into the calling thread's live map.
///
/// Keys are decoded first (when an encoder is given); the filter sees the
/// decoded attribute key. Properties whose keys fail to decode are logged and
/// skipped — they were not written by a propagation boundary.
pub fn import_attributes(
    bag: &dyn PropertyBag,
    filter: &dyn KeyFilter,
    encoder: Option<&dyn KeyEncoder>,
) {
    for stored_key in bag.property_keys() {
        let key = match encoder {
            Some(encoder) => match encoder.decode(&stored_key) {
                Ok(decoded) => decoded,
                Err(error) => {
                    tracing::warn!(key = %stored_key, %error, "skipping property key that cannot be decoded");
                    continue;
                }
            },
            None => stored_key.clone(),
        };
        if !filter.accept(&key) {
            continue;
        }
        if let Some(value) = bag.property(&stored_key) {
            ContextCarrier::put(key, Some(value));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
