//! Server candidates and the discovery seam that produces them.
//!
//! Candidates are owned by an external discovery collaborator that refreshes
//! its list on its own schedule; this crate only reads them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One server instance eligible for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCandidate {
    /// Stable identifier for the instance.
    pub id: String,
    /// Hostname or address.
    pub host: String,
    /// Service port.
    pub port: u16,
    /// Deployment-topology label used for locality matching.
    pub zone: String,
    /// Free-form instance metadata published by the discovery source.
    pub metadata: HashMap<String, String>,
}

impl ServerCandidate {
    /// Convenience constructor for an instance with no metadata.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
            zone: zone.into(),
            metadata: HashMap::new(),
        }
    }

    /// Returns the metadata value under `key`, if present.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Source of the current candidate pool.
///
/// Implemented by the host's discovery/server-list collaborator. The rule
/// layer calls this once per selection and never mutates the result beyond
/// filtering its own copy.
pub trait CandidateSource: Send + Sync {
    /// The current candidate pool. May be empty.
    fn candidates(&self) -> Vec<ServerCandidate>;
}

/// Fixed candidate pool, for tests and statically configured deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticCandidateSource {
    pool: Vec<ServerCandidate>,
}

impl StaticCandidateSource {
    /// Builds a source over a fixed pool.
    #[must_use]
    pub fn new(pool: Vec<ServerCandidate>) -> Self {
        Self { pool }
    }
}

impl CandidateSource for StaticCandidateSource {
    fn candidates(&self) -> Vec<ServerCandidate> {
        self.pool.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_lookup() {
        let mut candidate = ServerCandidate::new("s1", "10.0.0.1", 8080, "zone1");
        candidate
            .metadata
            .insert("instance-type".to_string(), "large".to_string());

        assert_eq!(candidate.metadata_value("instance-type"), Some("large"));
        assert_eq!(candidate.metadata_value("missing"), None);
    }

    #[test]
    fn static_source_returns_pool() {
        let pool = vec![
            ServerCandidate::new("s1", "10.0.0.1", 8080, "zone1"),
            ServerCandidate::new("s2", "10.0.0.2", 8080, "zone2"),
        ];
        let source = StaticCandidateSource::new(pool.clone());
        assert_eq!(source.candidates(), pool);
    }
}
