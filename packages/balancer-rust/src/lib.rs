//! `Zonal` Balancer — context-propagating boundary adapters and
//! predicate-based server selection for client-side load balancing.

pub mod candidate;
pub mod config;
pub mod propagation;
pub mod rule;

pub use candidate::{CandidateSource, ServerCandidate, StaticCandidateSource};
pub use config::{PropagationConfig, TransportConfig, FAVORITE_ZONE_KEY, UPSTREAM_ZONE_KEY};
pub use rule::{favorite_zone_chain, CompositePredicate, PredicateBasedRule};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
