//! Configuration surface for propagation adapters and zone rules.
//!
//! Plain value structs with defaults; the host's configuration system binds
//! them however it likes (`serde::Deserialize` derives are provided).

use serde::Deserialize;

/// Well-known attribute key for the zone a caller would prefer to reach.
pub const FAVORITE_ZONE_KEY: &str = "favorite-zone";

/// Well-known attribute key carrying the caller's own zone downstream.
pub const UPSTREAM_ZONE_KEY: &str = "upstream-zone";

/// Per-transport propagation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Master switch. A disabled transport copies nothing but still delegates
    /// to the wrapped send/receive unchanged.
    pub enabled: bool,
    /// Include patterns for the key filter (substring regex match).
    /// Defaults to a single match-everything pattern.
    pub include_patterns: Vec<String>,
    /// Exclude patterns for the key filter. Defaults to empty.
    pub exclude_patterns: Vec<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_patterns: vec![".*".to_string()],
            exclude_patterns: Vec::new(),
        }
    }
}

/// Top-level propagation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Ordered allow-list of attribute keys copied at the HTTP boundary.
    pub keys: Vec<String>,
    /// Attribute key holding the requested target zone.
    pub favorite_zone_key: String,
    /// Attribute key under which this instance advertises its own zone to
    /// downstream services.
    pub upstream_zone_key: String,
    /// When set, outbound HTTP propagation writes the local instance's zone
    /// under `upstream_zone_key` even if the live map has no such entry.
    pub add_upstream_zone: bool,
    /// This instance's own zone, used for zone affinity and as the
    /// upstream-zone value.
    pub local_zone: String,
    /// HTTP header propagation settings.
    pub http: TransportConfig,
    /// Message-property propagation settings.
    pub messaging: TransportConfig,
    /// Frame-header propagation settings.
    pub frames: TransportConfig,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            keys: vec![
                FAVORITE_ZONE_KEY.to_string(),
                UPSTREAM_ZONE_KEY.to_string(),
            ],
            favorite_zone_key: FAVORITE_ZONE_KEY.to_string(),
            upstream_zone_key: UPSTREAM_ZONE_KEY.to_string(),
            add_upstream_zone: false,
            local_zone: String::new(),
            http: TransportConfig::default(),
            messaging: TransportConfig::default(),
            frames: TransportConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
