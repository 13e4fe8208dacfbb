//! Key filters: predicates over attribute-key strings.
//!
//! Boundary adapters run every candidate key through a filter before copying
//! it across a transport, so operators can scope which attributes travel.

use std::collections::HashSet;

use regex::Regex;

/// Pure predicate over attribute keys.
pub trait KeyFilter: Send + Sync {
    /// Returns `true` when `key` should be copied across the boundary.
    fn accept(&self, key: &str) -> bool;
}

/// Errors from building a filter out of configuration values.
///
/// Malformed patterns are a setup mistake and surface immediately at
/// construction time rather than being skipped.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// An include/exclude pattern failed to compile.
    #[error("invalid filter pattern `{pattern}`")]
    InvalidPattern {
        /// The pattern as configured.
        pattern: String,
        /// Compile error from the regex engine.
        #[source]
        source: regex::Error,
    },
}

// ---------------------------------------------------------------------------
// SetFilter
// ---------------------------------------------------------------------------

/// Accepts exactly the keys in a fixed set.
#[derive(Debug, Clone, Default)]
pub struct SetFilter {
    keys: HashSet<String>,
}

impl SetFilter {
    /// Builds the filter from a list of allowed keys (e.g. the configured
    /// attribute key allow-list).
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl KeyFilter for SetFilter {
    fn accept(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

// ---------------------------------------------------------------------------
// PatternFilter
// ---------------------------------------------------------------------------

/// Include/exclude regex filter.
///
/// A key is accepted iff at least one include pattern matches it (substring
/// match, standard regex `find` semantics) and no exclude pattern matches.
/// An empty include list therefore accepts nothing: with no pattern present,
/// no match is ever found. An empty exclude list excludes nothing.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl PatternFilter {
    /// Compiles the configured pattern lists.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidPattern`] for the first pattern that
    /// fails to compile.
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self, FilterError> {
        Ok(Self {
            includes: compile_all(includes)?,
            excludes: compile_all(excludes)?,
        })
    }

    /// The default filter: one include pattern matching everything, no
    /// excludes.
    #[must_use]
    pub fn match_all() -> Self {
        Self {
            includes: vec![Regex::new(".*").expect("constant pattern compiles")],
            excludes: Vec::new(),
        }
    }
}

impl KeyFilter for PatternFilter {
    fn accept(&self, key: &str) -> bool {
        self.includes.iter().any(|re| re.is_match(key))
            && !self.excludes.iter().any(|re| re.is_match(key))
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, FilterError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| FilterError::InvalidPattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
