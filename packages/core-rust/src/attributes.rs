//! Ordered string-to-string attribute map with explicit null values.
//!
//! `AttributeMap` is the value type carried across thread and transport
//! boundaries. The same type serves as the thread-scoped live map and as
//! point-in-time snapshots: a snapshot is just a deep `Clone`, so mutating
//! the live map never changes snapshots already taken from it, and vice versa.

use serde::{Deserialize, Serialize};

/// Ordered mapping of attribute keys to optional values.
///
/// Keys are unique. Insertion order is preserved for iteration (deterministic
/// test output); overwriting an existing key keeps its original position.
/// A value of `None` represents an explicit null ("known but empty"), which
/// is distinct from the key being absent entirely.
///
/// Maps are expected to hold a handful of entries (zone names, routing hints),
/// so lookup is a linear scan over the entry list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMap {
    entries: Vec<(String, Option<String>)>,
}

impl AttributeMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, counting explicit-null entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` when the key is present, even with an explicit null value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Returns the non-null value stored under `key`.
    ///
    /// Absent keys and explicit-null entries both yield `None`; callers that
    /// need to tell them apart use [`AttributeMap::entry`].
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).flatten()
    }

    /// Full lookup: outer `None` means the key is absent, `Some(None)` means
    /// the key is present with an explicit null value.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    /// Inserts or overwrites an entry, returning the previous value slot.
    ///
    /// New keys are appended; an overwritten key keeps its position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: Option<String>,
    ) -> Option<Option<String>> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Removes an entry, returning its value slot if the key was present.
    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, Option<String>)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
