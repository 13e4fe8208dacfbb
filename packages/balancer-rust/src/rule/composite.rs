//! Ordered fallback chain of server predicates.
//!
//! Each stage is an independent, from-scratch filter of the whole candidate
//! pool: when a stage leaves nothing, the next stage widens back to the
//! **original** list instead of refining the empty intersection. Chains
//! conventionally end in an always-true catch-all, which guarantees a
//! non-empty result whenever the input pool is non-empty.

use std::sync::Arc;

use super::predicate::ServerPredicate;
use crate::candidate::ServerCandidate;

/// Ordered chain `[primary, fallback-1, fallback-2, ...]`.
#[derive(Clone)]
pub struct CompositePredicate {
    stages: Vec<Arc<dyn ServerPredicate>>,
}

impl CompositePredicate {
    /// Chain with only a primary stage.
    #[must_use]
    pub fn new(primary: Arc<dyn ServerPredicate>) -> Self {
        Self {
            stages: vec![primary],
        }
    }

    /// Appends a fallback stage, tried only when every earlier stage left
    /// the pool empty.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn ServerPredicate>) -> Self {
        self.stages.push(fallback);
        self
    }

    /// Number of stages in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` when the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Filters `candidates` through the chain.
    ///
    /// Returns the first stage's non-empty result; empty when the input is
    /// empty or no stage (including any catch-all) accepted anything.
    #[must_use]
    pub fn filter(&self, candidates: &[ServerCandidate]) -> Vec<ServerCandidate> {
        for stage in &self.stages {
            // Always filter the original pool, never the previous stage's
            // (possibly empty) output.
            let survivors: Vec<ServerCandidate> = candidates
                .iter()
                .filter(|c| stage.apply(c))
                .cloned()
                .collect();
            if !survivors.is_empty() {
                return survivors;
            }
        }
        Vec::new()
    }

    /// Ordered description of the active chain: the primary stage, then each
    /// fallback in brackets.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut stages = self.stages.iter();
        let Some(primary) = stages.next() else {
            return String::from("<empty chain>");
        };
        let mut out = primary.describe();
        for fallback in stages {
            out.push_str(" [");
            out.push_str(&fallback.describe());
            out.push(']');
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use zonal_core::ContextCarrier;

    use super::super::predicate::{
        AlwaysTruePredicate, FavoriteZonePredicate, ZoneAffinityPredicate,
    };
    use super::*;

    fn pool() -> Vec<ServerCandidate> {
        vec![
            ServerCandidate::new("a", "10.0.0.1", 8080, "zone1"),
            ServerCandidate::new("b", "10.0.0.2", 8080, "zone2"),
        ]
    }

    fn zone_chain() -> CompositePredicate {
        CompositePredicate::new(Arc::new(ZoneAffinityPredicate::new("zone1")))
            .with_fallback(Arc::new(ZoneAffinityPredicate::new("zone2")))
            .with_fallback(Arc::new(AlwaysTruePredicate))
    }

    fn ids(candidates: &[ServerCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    // -- filter --

    #[test]
    fn primary_stage_wins_when_non_empty() {
        assert_eq!(ids(&zone_chain().filter(&pool())), vec!["a"]);
    }

    #[test]
    fn fallback_refilters_the_original_pool() {
        let chain = CompositePredicate::new(Arc::new(ZoneAffinityPredicate::new("zone9")))
            .with_fallback(Arc::new(ZoneAffinityPredicate::new("zone2")))
            .with_fallback(Arc::new(AlwaysTruePredicate));

        // Primary matched nothing; the fallback sees both candidates again.
        assert_eq!(ids(&chain.filter(&pool())), vec!["b"]);
    }

    #[test]
    fn catch_all_returns_the_whole_pool() {
        let chain = CompositePredicate::new(Arc::new(ZoneAffinityPredicate::new("zone9")))
            .with_fallback(Arc::new(ZoneAffinityPredicate::new("zone8")))
            .with_fallback(Arc::new(AlwaysTruePredicate));

        assert_eq!(ids(&chain.filter(&pool())), vec!["a", "b"]);
    }

    #[test]
    fn favorite_zone_widening_end_to_end() {
        std::thread::spawn(|| {
            let chain = CompositePredicate::new(Arc::new(FavoriteZonePredicate::new(
                "favorite-zone",
            )))
            .with_fallback(Arc::new(ZoneAffinityPredicate::new("zone1")))
            .with_fallback(Arc::new(AlwaysTruePredicate));

            // Requested zone present in the pool.
            ContextCarrier::put("favorite-zone", Some("zone2".to_string()));
            assert_eq!(ids(&chain.filter(&pool())), vec!["b"]);

            // Requested zone with no match: affinity fallback takes over.
            ContextCarrier::put("favorite-zone", Some("zone9".to_string()));
            assert_eq!(ids(&chain.filter(&pool())), vec!["a"]);

            // No request at all and no affinity match either: catch-all.
            ContextCarrier::remove();
            let unzoned = vec![ServerCandidate::new("c", "10.0.0.3", 8080, "zone3")];
            assert_eq!(ids(&chain.filter(&unzoned)), vec!["c"]);
        })
        .join()
        .expect("test thread panicked");
    }

    #[test]
    fn empty_pool_yields_empty() {
        assert!(zone_chain().filter(&[]).is_empty());
    }

    #[test]
    fn chain_without_catch_all_can_yield_empty() {
        let chain = CompositePredicate::new(Arc::new(ZoneAffinityPredicate::new("zone9")));
        assert!(chain.filter(&pool()).is_empty());
    }

    // -- describe --

    #[test]
    fn describe_marks_fallbacks_with_brackets() {
        assert_eq!(
            zone_chain().describe(),
            "zone-affinity(zone1) [zone-affinity(zone2)] [always-true]"
        );
    }
}
