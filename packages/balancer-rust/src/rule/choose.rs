//! Final server selection over the filtered candidate list.
//!
//! The rule pairs a [`CompositePredicate`] with a selection strategy: the
//! chain narrows the pool, the strategy picks one survivor.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use super::composite::CompositePredicate;
use crate::candidate::ServerCandidate;

/// Picks one candidate from a non-empty filtered pool.
pub trait SelectionStrategy: Send + Sync {
    /// Returns the chosen candidate, or `None` for an empty pool.
    fn choose<'a>(&self, pool: &'a [ServerCandidate]) -> Option<&'a ServerCandidate>;
}

/// Rotates through the pool in submission order.
#[derive(Debug, Default)]
pub struct RoundRobinStrategy {
    next: AtomicUsize,
}

impl SelectionStrategy for RoundRobinStrategy {
    fn choose<'a>(&self, pool: &'a [ServerCandidate]) -> Option<&'a ServerCandidate> {
        if pool.is_empty() {
            return None;
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % pool.len();
        pool.get(index)
    }
}

/// Uniform random pick.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

impl SelectionStrategy for RandomStrategy {
    fn choose<'a>(&self, pool: &'a [ServerCandidate]) -> Option<&'a ServerCandidate> {
        if pool.is_empty() {
            return None;
        }
        pool.get(rand::rng().random_range(0..pool.len()))
    }
}

// ---------------------------------------------------------------------------
// PredicateBasedRule
// ---------------------------------------------------------------------------

/// No candidate survived the predicate chain.
///
/// Possible only with a misconfigured chain lacking a catch-all stage (or an
/// empty input pool); callers surface it as "no available server".
#[derive(Debug, thiserror::Error)]
#[error("no available server matched the predicate chain `{chain}`")]
pub struct NoAvailableServer {
    /// Description of the chain that rejected everything.
    pub chain: String,
}

/// Filters candidates through a fallback chain, then selects one.
pub struct PredicateBasedRule {
    predicate: CompositePredicate,
    strategy: Box<dyn SelectionStrategy>,
}

impl PredicateBasedRule {
    /// Rule with an explicit selection strategy.
    #[must_use]
    pub fn new(predicate: CompositePredicate, strategy: Box<dyn SelectionStrategy>) -> Self {
        Self {
            predicate,
            strategy,
        }
    }

    /// Rule with round-robin selection, the common default.
    #[must_use]
    pub fn round_robin(predicate: CompositePredicate) -> Self {
        Self::new(predicate, Box::new(RoundRobinStrategy::default()))
    }

    /// Chooses one server from `candidates`.
    ///
    /// # Errors
    ///
    /// [`NoAvailableServer`] when the chain leaves the pool empty.
    pub fn choose(&self, candidates: &[ServerCandidate]) -> Result<ServerCandidate, NoAvailableServer> {
        let filtered = self.predicate.filter(candidates);
        self.strategy
            .choose(&filtered)
            .cloned()
            .ok_or_else(|| NoAvailableServer {
                chain: self.predicate.describe(),
            })
    }

    /// Human-readable description of the active fallback chain.
    #[must_use]
    pub fn describe(&self) -> String {
        self.predicate.describe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
