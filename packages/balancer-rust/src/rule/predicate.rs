//! Per-candidate boolean rules over the current attribute map.
//!
//! Each predicate answers one yes/no question about a candidate. Null
//! handling is deliberately rule-specific, not unified: some rules treat
//! "expected and actual both absent" as a match and others as a non-match.
//! Each rule documents its own behavior; the tests pin them independently.

use zonal_core::ContextCarrier;

use crate::candidate::ServerCandidate;

/// Stateless boolean test of one candidate against one rule.
///
/// Predicates close over their configuration and read the current attribute
/// map through the carrier; they hold no mutable state and are safe to share
/// across threads.
pub trait ServerPredicate: Send + Sync {
    /// Returns `true` when the candidate satisfies this rule.
    fn apply(&self, candidate: &ServerCandidate) -> bool;

    /// Human-readable description for chain observability.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// ZoneAffinityPredicate
// ---------------------------------------------------------------------------

/// Candidate zone equals a fixed local zone (case-insensitive).
///
/// Null handling: an empty configured zone rejects every candidate — an
/// instance that does not know its own zone has no affinity to assert.
#[derive(Debug, Clone)]
pub struct ZoneAffinityPredicate {
    zone: String,
}

impl ZoneAffinityPredicate {
    /// Affinity to `zone`, usually the local instance's own zone.
    #[must_use]
    pub fn new(zone: impl Into<String>) -> Self {
        Self { zone: zone.into() }
    }
}

impl ServerPredicate for ZoneAffinityPredicate {
    fn apply(&self, candidate: &ServerCandidate) -> bool {
        !self.zone.is_empty() && candidate.zone.eq_ignore_ascii_case(&self.zone)
    }

    fn describe(&self) -> String {
        format!("zone-affinity({})", self.zone)
    }
}

// ---------------------------------------------------------------------------
// FavoriteZonePredicate
// ---------------------------------------------------------------------------

/// Candidate zone equals the attribute stored under the favorite-zone key.
///
/// Null handling: a missing or explicit-null attribute **rejects** — with no
/// requested zone there is nothing to match, and the chain is expected to
/// fall through to an affinity or catch-all stage.
#[derive(Debug, Clone)]
pub struct FavoriteZonePredicate {
    key: String,
}

impl FavoriteZonePredicate {
    /// Reads the requested zone from the attribute under `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl ServerPredicate for FavoriteZonePredicate {
    fn apply(&self, candidate: &ServerCandidate) -> bool {
        ContextCarrier::get(&self.key)
            .is_some_and(|favorite| candidate.zone.eq_ignore_ascii_case(&favorite))
    }

    fn describe(&self) -> String {
        format!("favorite-zone({})", self.key)
    }
}

// ---------------------------------------------------------------------------
// MetadataMatchPredicate
// ---------------------------------------------------------------------------

/// Candidate metadata entry under a key equals a static expected value.
///
/// Null handling: `expected = None` **accepts** candidates that also lack
/// the key (both absent match); a present-but-different value rejects.
#[derive(Debug, Clone)]
pub struct MetadataMatchPredicate {
    key: String,
    expected: Option<String>,
}

impl MetadataMatchPredicate {
    /// Requires `metadata[key] == expected`.
    #[must_use]
    pub fn new(key: impl Into<String>, expected: Option<String>) -> Self {
        Self {
            key: key.into(),
            expected,
        }
    }
}

impl ServerPredicate for MetadataMatchPredicate {
    fn apply(&self, candidate: &ServerCandidate) -> bool {
        candidate.metadata_value(&self.key) == self.expected.as_deref()
    }

    fn describe(&self) -> String {
        format!(
            "metadata({}=={})",
            self.key,
            self.expected.as_deref().unwrap_or("<null>")
        )
    }
}

// ---------------------------------------------------------------------------
// DynamicMetadataPredicate
// ---------------------------------------------------------------------------

/// Candidate metadata entry equals a context-sourced expected value.
///
/// The expected value is read from the current attribute map under
/// `context_key`, falling back to a static default when absent. Null
/// handling: like [`MetadataMatchPredicate`], both absent **accepts**.
#[derive(Debug, Clone)]
pub struct DynamicMetadataPredicate {
    metadata_key: String,
    context_key: String,
    default: Option<String>,
}

impl DynamicMetadataPredicate {
    /// Requires `metadata[metadata_key] == attributes[context_key]`, with
    /// `default` standing in for a missing attribute.
    #[must_use]
    pub fn new(
        metadata_key: impl Into<String>,
        context_key: impl Into<String>,
        default: Option<String>,
    ) -> Self {
        Self {
            metadata_key: metadata_key.into(),
            context_key: context_key.into(),
            default,
        }
    }
}

impl ServerPredicate for DynamicMetadataPredicate {
    fn apply(&self, candidate: &ServerCandidate) -> bool {
        let expected = ContextCarrier::get(&self.context_key).or_else(|| self.default.clone());
        candidate.metadata_value(&self.metadata_key) == expected.as_deref()
    }

    fn describe(&self) -> String {
        format!(
            "dynamic-metadata({}==ctx[{}]|{})",
            self.metadata_key,
            self.context_key,
            self.default.as_deref().unwrap_or("<null>")
        )
    }
}

// ---------------------------------------------------------------------------
// ContextSupersetPredicate
// ---------------------------------------------------------------------------

/// Candidate metadata contains every entry of the current attribute map.
///
/// Null handling: an explicit-null attribute matches a candidate that lacks
/// the key entirely (absent == null), so null entries do not disqualify
/// candidates that never publish the key. An empty attribute map accepts
/// every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextSupersetPredicate;

impl ServerPredicate for ContextSupersetPredicate {
    fn apply(&self, candidate: &ServerCandidate) -> bool {
        let attributes = ContextCarrier::copy();
        let matches = attributes
            .iter()
            .all(|(key, value)| candidate.metadata_value(key) == value);
        matches
    }

    fn describe(&self) -> String {
        "metadata-superset-of-context".to_string()
    }
}

// ---------------------------------------------------------------------------
// AlwaysTruePredicate
// ---------------------------------------------------------------------------

/// The conventional catch-all terminating a fallback chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysTruePredicate;

impl ServerPredicate for AlwaysTruePredicate {
    fn apply(&self, _candidate: &ServerCandidate) -> bool {
        true
    }

    fn describe(&self) -> String {
        "always-true".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_in(zone: &str) -> ServerCandidate {
        ServerCandidate::new("s", "10.0.0.1", 8080, zone)
    }

    fn candidate_with_metadata(entries: &[(&str, &str)]) -> ServerCandidate {
        let mut candidate = candidate_in("zone1");
        for (k, v) in entries {
            candidate
                .metadata
                .insert((*k).to_string(), (*v).to_string());
        }
        candidate
    }

    fn on_fresh_thread(f: impl FnOnce() + Send + 'static) {
        std::thread::spawn(f).join().expect("test thread panicked");
    }

    // -- ZoneAffinityPredicate --

    #[test]
    fn zone_affinity_matches_case_insensitively() {
        let predicate = ZoneAffinityPredicate::new("Zone1");
        assert!(predicate.apply(&candidate_in("zone1")));
        assert!(!predicate.apply(&candidate_in("zone2")));
    }

    #[test]
    fn zone_affinity_with_empty_zone_rejects_all() {
        let predicate = ZoneAffinityPredicate::new("");
        assert!(!predicate.apply(&candidate_in("")));
        assert!(!predicate.apply(&candidate_in("zone1")));
    }

    // -- FavoriteZonePredicate --

    #[test]
    fn favorite_zone_reads_the_attribute() {
        on_fresh_thread(|| {
            let predicate = FavoriteZonePredicate::new("favorite-zone");
            ContextCarrier::put("favorite-zone", Some("zone2".to_string()));

            assert!(predicate.apply(&candidate_in("zone2")));
            assert!(!predicate.apply(&candidate_in("zone1")));
        });
    }

    #[test]
    fn favorite_zone_rejects_when_attribute_missing_or_null() {
        on_fresh_thread(|| {
            let predicate = FavoriteZonePredicate::new("favorite-zone");
            // Missing entirely.
            assert!(!predicate.apply(&candidate_in("zone1")));

            // Present with explicit null: still no requested zone.
            ContextCarrier::put("favorite-zone", None);
            assert!(!predicate.apply(&candidate_in("zone1")));
        });
    }

    // -- MetadataMatchPredicate --

    #[test]
    fn metadata_match_compares_static_value() {
        let predicate = MetadataMatchPredicate::new("instance-type", Some("large".to_string()));
        assert!(predicate.apply(&candidate_with_metadata(&[("instance-type", "large")])));
        assert!(!predicate.apply(&candidate_with_metadata(&[("instance-type", "small")])));
        assert!(!predicate.apply(&candidate_with_metadata(&[])));
    }

    #[test]
    fn metadata_match_both_absent_accepts() {
        let predicate = MetadataMatchPredicate::new("instance-type", None);
        assert!(predicate.apply(&candidate_with_metadata(&[])));
        assert!(!predicate.apply(&candidate_with_metadata(&[("instance-type", "large")])));
    }

    // -- DynamicMetadataPredicate --

    #[test]
    fn dynamic_metadata_reads_expected_from_context() {
        on_fresh_thread(|| {
            let predicate = DynamicMetadataPredicate::new("tier", "wanted-tier", None);
            ContextCarrier::put("wanted-tier", Some("gold".to_string()));

            assert!(predicate.apply(&candidate_with_metadata(&[("tier", "gold")])));
            assert!(!predicate.apply(&candidate_with_metadata(&[("tier", "bronze")])));
        });
    }

    #[test]
    fn dynamic_metadata_falls_back_to_default() {
        on_fresh_thread(|| {
            let predicate =
                DynamicMetadataPredicate::new("tier", "wanted-tier", Some("silver".to_string()));
            assert!(predicate.apply(&candidate_with_metadata(&[("tier", "silver")])));
            assert!(!predicate.apply(&candidate_with_metadata(&[("tier", "gold")])));
        });
    }

    #[test]
    fn dynamic_metadata_both_absent_accepts() {
        on_fresh_thread(|| {
            let predicate = DynamicMetadataPredicate::new("tier", "wanted-tier", None);
            assert!(predicate.apply(&candidate_with_metadata(&[])));
        });
    }

    // -- ContextSupersetPredicate --

    #[test]
    fn superset_requires_every_context_entry() {
        on_fresh_thread(|| {
            ContextCarrier::put("1", Some("1".to_string()));
            ContextCarrier::put("2", Some("2".to_string()));

            let predicate = ContextSupersetPredicate;
            // Superset accepts.
            assert!(predicate.apply(&candidate_with_metadata(&[
                ("1", "1"),
                ("2", "2"),
                ("3", "3"),
            ])));
            // Missing key rejects.
            assert!(!predicate.apply(&candidate_with_metadata(&[("1", "1"), ("3", "3")])));
            // Differing value rejects.
            assert!(!predicate.apply(&candidate_with_metadata(&[("1", "1"), ("2", "3")])));
        });
    }

    #[test]
    fn superset_null_entry_matches_absent_metadata_key() {
        on_fresh_thread(|| {
            ContextCarrier::put("optional", None);

            let predicate = ContextSupersetPredicate;
            assert!(predicate.apply(&candidate_with_metadata(&[])));
            assert!(!predicate.apply(&candidate_with_metadata(&[("optional", "present")])));
        });
    }

    #[test]
    fn superset_with_empty_context_accepts_everything() {
        on_fresh_thread(|| {
            let predicate = ContextSupersetPredicate;
            assert!(predicate.apply(&candidate_with_metadata(&[])));
        });
    }

    // -- describe --

    #[test]
    fn descriptions_name_their_configuration() {
        assert_eq!(
            ZoneAffinityPredicate::new("zone1").describe(),
            "zone-affinity(zone1)"
        );
        assert_eq!(
            FavoriteZonePredicate::new("favorite-zone").describe(),
            "favorite-zone(favorite-zone)"
        );
        assert_eq!(
            MetadataMatchPredicate::new("tier", None).describe(),
            "metadata(tier==<null>)"
        );
        assert_eq!(AlwaysTruePredicate.describe(), "always-true");
    }
}
