//! HTTP request boundary: header-to-attribute and attribute-to-header copy.
//!
//! Inbound, a configured subset of request headers seeds the live map at the
//! start of request handling; [`HttpPropagation::end_of_request`] detaches the
//! map when handling finishes so the (reused) worker thread starts the next
//! request clean. Outbound, the live map's accepted entries become request
//! headers on client calls, optionally adding this instance's own zone as an
//! upstream-zone hint.
//!
//! Every copy is best-effort per key: a value that cannot be represented as a
//! header (or vice versa) is logged and skipped, and never fails the request.

use http::header::{HeaderMap, HeaderName, HeaderValue};
use zonal_core::{ContextCarrier, FilterError, KeyFilter, PatternFilter, SetFilter};

use crate::config::PropagationConfig;

/// Bidirectional HTTP header propagation, built once from configuration.
pub struct HttpPropagation {
    enabled: bool,
    /// Configured attribute keys, in order, used for the inbound copy.
    keys: Vec<String>,
    /// Keys must be in the allow-list.
    allow_list: SetFilter,
    /// And pass the transport's include/exclude patterns.
    patterns: PatternFilter,
    /// Static `(key, zone)` entry appended to outbound headers.
    upstream_zone: Option<(String, String)>,
}

impl HttpPropagation {
    /// Builds the boundary from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] when an include/exclude pattern is malformed —
    /// a setup mistake surfaced immediately, not at copy time.
    pub fn from_config(config: &PropagationConfig) -> Result<Self, FilterError> {
        let upstream_zone = (config.add_upstream_zone && !config.local_zone.is_empty())
            .then(|| (config.upstream_zone_key.clone(), config.local_zone.clone()));

        Ok(Self {
            enabled: config.http.enabled,
            keys: config.keys.clone(),
            allow_list: SetFilter::from_keys(config.keys.iter().cloned()),
            patterns: PatternFilter::new(
                &config.http.include_patterns,
                &config.http.exclude_patterns,
            )?,
            upstream_zone,
        })
    }

    fn accepts(&self, key: &str) -> bool {
        self.allow_list.accept(key) && self.patterns.accept(key)
    }

    /// Inbound copy: seeds the calling thread's live map from request headers.
    ///
    /// Call at the start of request handling, on the handling thread.
    pub fn import(&self, headers: &HeaderMap) {
        if !self.enabled {
            return;
        }
        for key in &self.keys {
            if !self.accepts(key) {
                continue;
            }
            let Some(value) = headers.get(key.as_str()) else {
                continue;
            };
            match value.to_str() {
                Ok(value) => ContextCarrier::put(key.clone(), Some(value.to_string())),
                Err(error) => {
                    tracing::warn!(%key, %error, "skipping non-UTF-8 inbound header");
                }
            }
        }
    }

    /// Outbound copy: writes the live map's accepted entries into `headers`,
    /// then the upstream-zone entry when configured.
    ///
    /// Explicit-null entries have no header representation and are skipped.
    pub fn export(&self, headers: &mut HeaderMap) {
        if !self.enabled {
            return;
        }
        let snapshot = ContextCarrier::copy();
        for (key, value) in snapshot.iter() {
            if !self.accepts(key) {
                continue;
            }
            let Some(value) = value else {
                tracing::debug!(%key, "skipping explicit-null attribute on outbound copy");
                continue;
            };
            put_header(headers, key, value);
        }
        if let Some((key, zone)) = &self.upstream_zone {
            put_header(headers, key, zone);
        }
    }

    /// Detaches the live map at the natural end of request handling.
    pub fn end_of_request() {
        ContextCarrier::remove();
    }
}

/// Single-key header write; failures are logged and skipped so the rest of
/// the copy (and the request itself) proceeds.
fn put_header(headers: &mut HeaderMap, key: &str, value: &str) {
    let name = match HeaderName::from_bytes(key.as_bytes()) {
        Ok(name) => name,
        Err(error) => {
            tracing::warn!(%key, %error, "attribute key is not a legal header name");
            return;
        }
    };
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(error) => {
            tracing::warn!(%key, %error, "attribute value is not a legal header value");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_keys(keys: &[&str]) -> PropagationConfig {
        PropagationConfig {
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
            ..PropagationConfig::default()
        }
    }

    fn on_fresh_thread(f: impl FnOnce() + Send + 'static) {
        std::thread::spawn(f).join().expect("test thread panicked");
    }

    // -- import --

    #[test]
    fn import_copies_configured_headers_only() {
        on_fresh_thread(|| {
            let boundary =
                HttpPropagation::from_config(&config_with_keys(&["favorite-zone"])).unwrap();

            let mut headers = HeaderMap::new();
            headers.insert("favorite-zone", HeaderValue::from_static("zone2"));
            headers.insert("x-unrelated", HeaderValue::from_static("nope"));
            boundary.import(&headers);

            assert_eq!(
                ContextCarrier::get("favorite-zone"),
                Some("zone2".to_string())
            );
            assert_eq!(ContextCarrier::get("x-unrelated"), None);
        });
    }

    #[test]
    fn import_skips_header_rejected_by_patterns() {
        on_fresh_thread(|| {
            let mut config = config_with_keys(&["favorite-zone", "upstream-zone"]);
            config.http.exclude_patterns = vec!["upstream".to_string()];
            let boundary = HttpPropagation::from_config(&config).unwrap();

            let mut headers = HeaderMap::new();
            headers.insert("favorite-zone", HeaderValue::from_static("zone2"));
            headers.insert("upstream-zone", HeaderValue::from_static("zone1"));
            boundary.import(&headers);

            assert_eq!(
                ContextCarrier::get("favorite-zone"),
                Some("zone2".to_string())
            );
            assert_eq!(ContextCarrier::get("upstream-zone"), None);
        });
    }

    #[test]
    fn import_skips_non_utf8_value_but_copies_the_rest() {
        on_fresh_thread(|| {
            let boundary =
                HttpPropagation::from_config(&config_with_keys(&["bad-key", "good-key"])).unwrap();

            let mut headers = HeaderMap::new();
            headers.insert(
                "bad-key",
                HeaderValue::from_bytes(&[0xff, 0xfe]).expect("opaque bytes are a legal value"),
            );
            headers.insert("good-key", HeaderValue::from_static("ok"));
            boundary.import(&headers);

            assert_eq!(ContextCarrier::get("bad-key"), None);
            assert_eq!(ContextCarrier::get("good-key"), Some("ok".to_string()));
        });
    }

    #[test]
    fn disabled_transport_imports_nothing() {
        on_fresh_thread(|| {
            let mut config = config_with_keys(&["favorite-zone"]);
            config.http.enabled = false;
            let boundary = HttpPropagation::from_config(&config).unwrap();

            let mut headers = HeaderMap::new();
            headers.insert("favorite-zone", HeaderValue::from_static("zone2"));
            boundary.import(&headers);

            assert!(!ContextCarrier::is_attached());
        });
    }

    // -- export --

    #[test]
    fn export_writes_accepted_attributes() {
        on_fresh_thread(|| {
            let boundary =
                HttpPropagation::from_config(&config_with_keys(&["favorite-zone"])).unwrap();

            ContextCarrier::put("favorite-zone", Some("zone2".to_string()));
            ContextCarrier::put("not-configured", Some("x".to_string()));

            let mut headers = HeaderMap::new();
            boundary.export(&mut headers);

            assert_eq!(headers.get("favorite-zone").unwrap(), "zone2");
            assert!(headers.get("not-configured").is_none());
        });
    }

    #[test]
    fn export_skips_null_and_illegal_values() {
        on_fresh_thread(|| {
            let boundary = HttpPropagation::from_config(&config_with_keys(&[
                "null-key",
                "bad-value",
                "good-key",
            ]))
            .unwrap();

            ContextCarrier::put("null-key", None);
            ContextCarrier::put("bad-value", Some("line\nbreak".to_string()));
            ContextCarrier::put("good-key", Some("fine".to_string()));

            let mut headers = HeaderMap::new();
            boundary.export(&mut headers);

            // Per-key failures never abort the remaining keys.
            assert!(headers.get("null-key").is_none());
            assert!(headers.get("bad-value").is_none());
            assert_eq!(headers.get("good-key").unwrap(), "fine");
        });
    }

    #[test]
    fn export_adds_upstream_zone_when_configured() {
        on_fresh_thread(|| {
            let mut config = config_with_keys(&["favorite-zone"]);
            config.add_upstream_zone = true;
            config.local_zone = "zone1".to_string();
            let boundary = HttpPropagation::from_config(&config).unwrap();

            let mut headers = HeaderMap::new();
            boundary.export(&mut headers);

            assert_eq!(headers.get("upstream-zone").unwrap(), "zone1");
        });
    }

    // -- end_of_request --

    #[test]
    fn end_of_request_detaches_live_map() {
        on_fresh_thread(|| {
            ContextCarrier::put("favorite-zone", Some("zone2".to_string()));
            HttpPropagation::end_of_request();
            assert!(!ContextCarrier::is_attached());
        });
    }
}
