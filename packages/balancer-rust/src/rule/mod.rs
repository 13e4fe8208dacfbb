//! Predicate-based server selection.
//!
//! 1. **Predicates** (`predicate`): one yes/no rule per candidate, reading
//!    the current attribute map through the carrier.
//! 2. **Composite chain** (`composite`): ordered fallback filtering with
//!    widen-back-to-original semantics.
//! 3. **Rule** (`choose`): chain + selection strategy = one chosen server.

pub mod choose;
pub mod composite;
pub mod predicate;

use std::sync::Arc;

pub use choose::{
    NoAvailableServer, PredicateBasedRule, RandomStrategy, RoundRobinStrategy, SelectionStrategy,
};
pub use composite::CompositePredicate;
pub use predicate::{
    AlwaysTruePredicate, ContextSupersetPredicate, DynamicMetadataPredicate,
    FavoriteZonePredicate, MetadataMatchPredicate, ServerPredicate, ZoneAffinityPredicate,
};

/// The standard zone-routing chain: honor the caller's requested zone first,
/// stay in the local zone otherwise, and never return empty for a non-empty
/// pool.
#[must_use]
pub fn favorite_zone_chain(
    favorite_zone_key: impl Into<String>,
    local_zone: impl Into<String>,
) -> CompositePredicate {
    CompositePredicate::new(Arc::new(FavoriteZonePredicate::new(favorite_zone_key)))
        .with_fallback(Arc::new(ZoneAffinityPredicate::new(local_zone)))
        .with_fallback(Arc::new(AlwaysTruePredicate))
}
